//! Single-sequence shapes: one cursor, consumed lazily by one caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use pagewise_core::{PageCursor, PageFetcher};
use pagewise_types::{PagewiseError, Symbol};

use crate::Client;

/// Item-level stream over a cursor. Ends after the first error.
pub(crate) fn items<T: Send + 'static>(
    cursor: PageCursor<T>,
) -> BoxStream<'static, Result<T, PagewiseError>> {
    stream::unfold(Some(cursor), |state| async move {
        let mut cursor = state?;
        match cursor.next_item().await? {
            Ok(item) => Some((Ok(item), Some(cursor))),
            Err(e) => Some((Err(e), None)),
        }
    })
    .fuse()
    .boxed()
}

/// Page-level stream over a cursor. Ends after the first error.
pub(crate) fn pages<T: Send + 'static>(
    cursor: PageCursor<T>,
) -> BoxStream<'static, Result<Vec<T>, PagewiseError>> {
    stream::unfold(Some(cursor), |state| async move {
        let mut cursor = state?;
        match cursor.next_page().await? {
            Ok(batch) => Some((Ok(batch), Some(cursor))),
            Err(e) => Some((Err(e), None)),
        }
    })
    .fuse()
    .boxed()
}

/// Split one page into per-symbol lists, preserving in-page order per symbol.
pub(crate) fn group_by_symbol<T, K>(batch: Vec<T>, key: &K) -> BTreeMap<Symbol, Vec<T>>
where
    K: Fn(&T) -> Symbol,
{
    let mut out: BTreeMap<Symbol, Vec<T>> = BTreeMap::new();
    for item in batch {
        out.entry(key(&item)).or_default().push(item);
    }
    out
}

impl Client {
    /// Stream every item of a paginated endpoint.
    ///
    /// Behavior and trade-offs:
    /// - Items arrive in page order, then in-page order; the total is the sum
    ///   of all page sizes.
    /// - Pages are fetched on demand, one at a time, each through the client's
    ///   throttler. At most one page is held.
    /// - A fetch error is yielded once and ends the stream. Dropping the stream
    ///   cancels any in-flight fetch and releases its permit.
    pub fn list<T: Send + 'static>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        endpoint: impl Into<String>,
    ) -> BoxStream<'static, Result<T, PagewiseError>> {
        items(self.cursor(fetcher, endpoint))
    }

    /// Stream a paginated endpoint one page at a time.
    ///
    /// Each page is yielded as one batch, empty pages included, so the number
    /// of batches equals the number of pages fetched.
    pub fn list_of_lists<T: Send + 'static>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        endpoint: impl Into<String>,
    ) -> BoxStream<'static, Result<Vec<T>, PagewiseError>> {
        pages(self.cursor(fetcher, endpoint))
    }

    /// Stream a multi-symbol endpoint one page at a time, grouping each page
    /// by symbol.
    ///
    /// `key` extracts the symbol an item belongs to. Symbols absent from a
    /// page are absent from that page's mapping.
    pub fn list_of_dictionaries_of_lists<T, K>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        endpoint: impl Into<String>,
        key: K,
    ) -> BoxStream<'static, Result<BTreeMap<Symbol, Vec<T>>, PagewiseError>>
    where
        T: Send + 'static,
        K: Fn(&T) -> Symbol + Send + 'static,
    {
        pages(self.cursor(fetcher, endpoint))
            .map(move |res| res.map(|batch| group_by_symbol(batch, &key)))
            .boxed()
    }
}
