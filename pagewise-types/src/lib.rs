//! Shared configuration, page, and error types for the pagewise workspace.
#![warn(missing_docs)]

mod config;
mod error;
mod page;
mod symbol;

pub use config::{ClientConfiguration, ThrottleParameters};
pub use error::{ConfigError, PagewiseError};
pub use page::{ContinuationToken, Page};
pub use symbol::Symbol;
