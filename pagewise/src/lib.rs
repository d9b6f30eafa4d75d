//! Pagewise walks cursor-linked paginated APIs lazily, under one shared
//! throttle per client.
//!
//! Overview
//! - A [`Client`] validates its configuration once, at build time, and owns
//!   a single [`Throttler`] bounding both concurrency and request rate.
//! - Every page request goes through a [`PageCursor`], which follows
//!   continuation tokens one page at a time and never holds more than one page.
//! - Result shapes (see [`aggregate`]) adapt cursors into flat item streams,
//!   page batches, or per-symbol mappings of independent streams.
//!
//! Key behaviors and trade-offs
//! - Laziness: no request is issued until a consumer pulls. Per-symbol shapes
//!   fetch a symbol's next page only once its current page is drained and the
//!   consumer pulls again.
//! - Failures: a fetch error is terminal for its cursor and is yielded once by
//!   the stream built on it. In per-symbol shapes the failure stays with its
//!   symbol; other symbols drain normally.
//! - Cancellation: dropping a stream (or a [`SymbolStream`]) abandons any
//!   in-flight fetch, returns its throttle permit and issues nothing further.
//! - Throttling: concurrency slots are freed as soon as a request completes;
//!   rate budget is consumed until the grant ages out of the window.
//!
//! Examples
//! Building a client and draining a flat list:
//! ```rust,ignore
//! use futures::StreamExt;
//!
//! let client = pagewise::Client::builder()
//!     .security_id("AK...")
//!     .api_endpoint("https://data.example.com/v2/")
//!     .default_throttle()
//!     .build()?;
//!
//! let mut trades = client.list(fetcher.clone(), "stocks/AAPL/trades");
//! while let Some(trade) = trades.next().await {
//!     let trade = trade?;
//!     // ...
//! }
//! ```
//!
//! One stream per symbol:
//! ```rust,ignore
//! let symbols = ["AAPL", "MSFT"].map(|s| pagewise::Symbol::new(s).unwrap());
//! let mut by_symbol = client.dictionary_of_lists(fetcher, symbols, |s| format!("stocks/{s}/trades"));
//! let totals = pagewise::util::count_dictionary(&mut by_symbol).await;
//! ```
//!
//! See `pagewise/examples/` for runnable demonstrations against the mock fetcher.
#![warn(missing_docs)]

mod client;

/// Result shapes built on top of page cursors.
pub mod aggregate;
/// Drain helpers for computing totals over aggregate results.
pub mod util;

pub use aggregate::{SymbolPageStream, SymbolStream};
pub use client::{Client, ClientBuilder};

pub use pagewise_core::{
    CursorState, PageCursor, PageFetcher, StopHandle, StopSignal, ThrottlePermit, Throttler,
    WorkerHandle, stop_pair,
};
pub use pagewise_types::{
    ClientConfiguration, ConfigError, ContinuationToken, Page, PagewiseError, Symbol,
    ThrottleParameters,
};
