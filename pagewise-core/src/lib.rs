//! pagewise-core
//!
//! Core contracts and machinery shared across the pagewise crates.
//!
//! - `fetcher`: the `PageFetcher` trait implemented by transports.
//! - `validate`: one-shot validation of a `ClientConfiguration`.
//! - `throttle`: the client-wide concurrency and rate gate.
//! - `cursor`: the `PageCursor` state machine that walks continuation tokens.
//! - `stream`: stop signals and worker handles used for cooperative shutdown.
//!
//! Async runtime (Tokio)
//! ---------------------
//! This crate assumes Tokio 1.x. The throttler sleeps on `tokio::time`, waits
//! on `tokio::sync` primitives, and worker handles wrap
//! `tokio::task::JoinHandle<()>`.
#![warn(missing_docs)]

/// Cursor-driven pagination over a `PageFetcher`.
pub mod cursor;
/// The `PageFetcher` contract consumed by the pagination core.
pub mod fetcher;
/// Stop signals and worker handle drop logic.
pub mod stream;
/// Client-wide request throttling.
pub mod throttle;
/// Client configuration validation.
pub mod validate;

pub use cursor::{CursorState, PageCursor};
pub use fetcher::PageFetcher;
pub use stream::{StopHandle, StopSignal, WorkerHandle, stop_pair};
pub use throttle::{ThrottlePermit, Throttler};
pub use validate::{ValidatedConfig, parse_endpoint, validate, validate_config, validate_throttle};

pub use pagewise_types::{
    ClientConfiguration, ConfigError, ContinuationToken, Page, PagewiseError, Symbol,
    ThrottleParameters,
};
