//! pagewise-http
//!
//! [`HttpPageFetcher`] implements [`PageFetcher`](pagewise_core::PageFetcher)
//! over `reqwest` for APIs that return JSON pages linked by continuation
//! tokens:
//!
//! ```text
//! GET {base}/{endpoint}?page_token=<token>
//! X-Security-Id: <security id>
//!
//! { "items": [ ... ], "next_page_token": "..." }
//! ```
//!
//! The items field, token query parameter and credential header are
//! configurable through [`HttpPageFetcherBuilder`]. A `null`, absent or empty
//! `next_page_token` marks the last page. Requests are never retried.
#![warn(missing_docs)]

mod builder;
mod envelope;
mod fetcher;

pub use builder::HttpPageFetcherBuilder;
pub use fetcher::HttpPageFetcher;

/// Default name of the JSON field holding a page's items.
pub const DEFAULT_ITEMS_FIELD: &str = "items";
/// Default name of the JSON field holding the next continuation token.
pub const DEFAULT_NEXT_TOKEN_FIELD: &str = "next_page_token";
/// Default query parameter carrying the continuation token.
pub const DEFAULT_TOKEN_PARAM: &str = "page_token";
/// Default header carrying the security identifier.
pub const DEFAULT_SECURITY_HEADER: &str = "X-Security-Id";
