//! Result shapes built on top of [`PageCursor`](pagewise_core::PageCursor).
//!
//! | Shape | Method | Laziness |
//! |-------|--------|----------|
//! | flat list | [`Client::list`](crate::Client::list) | item level |
//! | list of lists | [`Client::list_of_lists`](crate::Client::list_of_lists) | page level |
//! | symbol to list | [`Client::dictionary_of_lists`](crate::Client::dictionary_of_lists) | per symbol, item level |
//! | symbol to list of lists | [`Client::dictionary_of_lists_of_lists`](crate::Client::dictionary_of_lists_of_lists) | per symbol, page level |
//! | list of symbol-to-list | [`Client::list_of_dictionaries_of_lists`](crate::Client::list_of_dictionaries_of_lists) | page level |

pub mod dictionary;
pub mod list;

pub use dictionary::{SymbolPageStream, SymbolStream};
