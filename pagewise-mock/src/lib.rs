//! pagewise-mock
//!
//! A scripted [`PageFetcher`](pagewise_core::PageFetcher) for tests and
//! examples. Each endpoint is given a list of page behaviors; the mock links
//! them with opaque continuation tokens, records every call, and tracks how
//! many fetches are in flight at once.

mod fixtures;
mod scripted;

pub use fixtures::{MockTrade, sized_pages, trade_pages};
pub use scripted::{FetchCall, MockPageFetcher, MockPageFetcherBuilder, PageBehavior};
