//! Per-symbol shapes: one independent stream per requested symbol.
//!
//! Each symbol is driven by its own worker task and cursor. A worker fetches
//! a page only when its consumer asks for one, so building the mapping issues
//! no request and an abandoned stream never fetches past the page it stopped in.

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use pagewise_core::{PageCursor, PageFetcher, WorkerHandle, stop_pair};
use pagewise_types::{PagewiseError, Symbol};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::Client;

/// Page batches for one symbol, produced by a dedicated worker task.
///
/// Polling the stream asks the worker for the next page; nothing is fetched
/// until then. Dropping the stream stops the worker and aborts any in-flight
/// fetch.
pub struct SymbolPageStream<T> {
    symbol: Symbol,
    demand: mpsc::Sender<()>,
    // Set while a page has been asked for and not yet received.
    requested: bool,
    rx: mpsc::Receiver<Result<Vec<T>, PagewiseError>>,
    worker: WorkerHandle,
}

/// Items for one symbol, flattened from its [`SymbolPageStream`].
///
/// The next page is requested only once the current one is fully drained.
pub struct SymbolStream<T> {
    pages: SymbolPageStream<T>,
    current: VecDeque<T>,
}

impl<T> SymbolPageStream<T> {
    /// Symbol this stream belongs to.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns `true` once the worker has stopped fetching.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

impl<T> SymbolStream<T> {
    /// Symbol this stream belongs to.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        self.pages.symbol()
    }

    /// Returns `true` once the worker has stopped fetching.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pages.is_finished()
    }
}

impl<T> Stream for SymbolPageStream<T> {
    type Item = Result<Vec<T>, PagewiseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.requested {
            match self.demand.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => self.requested = true,
                // Worker is done; the page channel reports the end.
                Err(TrySendError::Closed(())) => {}
            }
        }
        let polled = self.rx.poll_recv(cx);
        if matches!(polled, Poll::Ready(Some(_))) {
            self.requested = false;
        }
        polled
    }
}

// `current` is only ever moved out of, never pinned.
impl<T> Unpin for SymbolStream<T> {}

impl<T> Stream for SymbolStream<T> {
    type Item = Result<T, PagewiseError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.current.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            match Pin::new(&mut this.pages).poll_next(cx) {
                Poll::Ready(Some(Ok(batch))) => this.current = batch.into(),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Drive one cursor to completion, fetching one page per request.
async fn drive<T: Send + 'static>(
    symbol: Symbol,
    mut cursor: PageCursor<T>,
    mut demand: mpsc::Receiver<()>,
    tx: mpsc::Sender<Result<Vec<T>, PagewiseError>>,
) {
    while demand.recv().await.is_some() {
        match cursor.next_page().await {
            Some(Ok(batch)) => {
                if tx.send(Ok(batch)).await.is_err() {
                    break;
                }
            }
            Some(Err(e)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol = %symbol, error = %e, "symbol stream failed");
                let _ = tx.send(Err(e)).await;
                break;
            }
            None => break,
        }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(symbol = %symbol, pages = cursor.pages_fetched(), "symbol worker finished");
    #[cfg(not(feature = "tracing"))]
    let _ = symbol;
}

fn spawn_symbol<T: Send + 'static>(
    client: &Client,
    fetcher: Arc<dyn PageFetcher<T>>,
    symbol: Symbol,
    endpoint: String,
) -> SymbolPageStream<T> {
    let (stop_tx, stop_rx) = stop_pair();
    let cursor = client.cursor(fetcher, endpoint).with_stop(stop_rx);
    let (demand_tx, demand_rx) = mpsc::channel(1);
    let (tx, rx) = mpsc::channel(1);
    let join = tokio::spawn(drive(symbol.clone(), cursor, demand_rx, tx));
    SymbolPageStream {
        symbol,
        demand: demand_tx,
        requested: false,
        rx,
        worker: WorkerHandle::new(join, stop_tx),
    }
}

impl Client {
    /// Stream the items of a per-symbol paginated endpoint, one independent
    /// stream per symbol.
    ///
    /// Behavior and trade-offs:
    /// - Every requested symbol gets a key, even if it has no data; duplicate
    ///   symbols are collapsed.
    /// - Each symbol is driven by its own worker and cursor. Workers share
    ///   only the client's throttler, so streams can be drained concurrently
    ///   and complete in any order.
    /// - A failure is confined to its symbol: the failing stream yields the
    ///   error once and ends, the others are unaffected.
    /// - Nothing is fetched until a stream is polled, and a stream asks for its
    ///   next page only after the current one is drained.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn dictionary_of_lists<T, I, F>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        symbols: I,
        endpoint_for: F,
    ) -> HashMap<Symbol, SymbolStream<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Symbol>,
        F: Fn(&Symbol) -> String,
    {
        self.dictionary_of_lists_of_lists(fetcher, symbols, endpoint_for)
            .into_iter()
            .map(|(symbol, pages)| {
                (
                    symbol,
                    SymbolStream {
                        pages,
                        current: VecDeque::new(),
                    },
                )
            })
            .collect()
    }

    /// Stream the pages of a per-symbol paginated endpoint, one independent
    /// stream of page batches per symbol.
    ///
    /// Same isolation and laziness rules as
    /// [`dictionary_of_lists`](Self::dictionary_of_lists), with each page
    /// kept as one batch.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn dictionary_of_lists_of_lists<T, I, F>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        symbols: I,
        endpoint_for: F,
    ) -> HashMap<Symbol, SymbolPageStream<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Symbol>,
        F: Fn(&Symbol) -> String,
    {
        let mut out = HashMap::new();
        for symbol in symbols {
            if out.contains_key(&symbol) {
                continue;
            }
            let endpoint = endpoint_for(&symbol);
            let stream = spawn_symbol(self, Arc::clone(&fetcher), symbol.clone(), endpoint);
            out.insert(symbol, stream);
        }
        out
    }
}
