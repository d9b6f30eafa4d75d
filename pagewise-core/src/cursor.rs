//! Pull-based walk over a cursor-linked sequence of pages.
//!
//! A [`PageCursor`] is an explicit state machine:
//!
//! ```text
//! Start ──pull──▶ FetchingPage ──ok──▶ HasPage ──consumed, token──▶ FetchingPage
//!                      │                  └──consumed, no token──▶ Exhausted
//!                      └──err──▶ Failed (terminal, re-raised on every pull)
//! ```
//!
//! Every fetch acquires a permit from the shared [`Throttler`] first and
//! releases it as soon as the fetch completes. At most one page of items is
//! held at any time.

use std::collections::VecDeque;
use std::sync::Arc;

use pagewise_types::{ContinuationToken, Page, PagewiseError};

use crate::fetcher::PageFetcher;
use crate::stream::StopSignal;
use crate::throttle::Throttler;

/// Observable state of a [`PageCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing fetched yet.
    Start,
    /// A fetch is due or was interrupted; the next pull (re)issues it.
    FetchingPage,
    /// A page is held for consumption.
    HasPage,
    /// The last page has been fully consumed.
    Exhausted,
    /// A fetch failed or was cancelled; the error is terminal.
    Failed,
}

enum Phase<T> {
    Start,
    Fetching(Option<ContinuationToken>),
    Holding {
        items: VecDeque<T>,
        next: Option<ContinuationToken>,
        // Set until the page is handed out, so empty pages still count as a batch.
        fresh: bool,
    },
    Exhausted,
    Failed(PagewiseError),
}

/// Lazily walks the pages of one endpoint.
pub struct PageCursor<T: Send> {
    fetcher: Arc<dyn PageFetcher<T>>,
    throttler: Arc<Throttler>,
    endpoint: String,
    stop: Option<StopSignal>,
    phase: Phase<T>,
    pages_fetched: usize,
}

impl<T: Send> PageCursor<T> {
    /// Create a cursor positioned before the first page of `endpoint`.
    pub fn new(
        fetcher: Arc<dyn PageFetcher<T>>,
        throttler: Arc<Throttler>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            throttler,
            endpoint: endpoint.into(),
            stop: None,
            phase: Phase::Start,
            pages_fetched: 0,
        }
    }

    /// Attach a stop signal observed at every suspension point.
    #[must_use]
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Endpoint this cursor walks.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current state of the machine.
    #[must_use]
    pub fn state(&self) -> CursorState {
        match self.phase {
            Phase::Start => CursorState::Start,
            Phase::Fetching(_) => CursorState::FetchingPage,
            Phase::Holding { .. } => CursorState::HasPage,
            Phase::Exhausted => CursorState::Exhausted,
            Phase::Failed(_) => CursorState::Failed,
        }
    }

    /// Number of pages successfully fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Pull the next batch: the unconsumed remainder of the held page, or the
    /// next page from the server.
    ///
    /// Each fetched page is yielded exactly once, including empty pages.
    /// Returns `None` once exhausted; after a failure every call returns the
    /// same error.
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>, PagewiseError>> {
        loop {
            if let Phase::Holding { items, fresh, .. } = &mut self.phase
                && (*fresh || !items.is_empty())
            {
                *fresh = false;
                return Some(Ok(items.drain(..).collect()));
            }
            match self.advance().await {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Pull the next single item, fetching further pages as needed.
    ///
    /// Empty pages are skipped transparently.
    pub async fn next_item(&mut self) -> Option<Result<T, PagewiseError>> {
        loop {
            if let Phase::Holding { items, fresh, .. } = &mut self.phase
                && let Some(item) = items.pop_front()
            {
                *fresh = false;
                return Some(Ok(item));
            }
            match self.advance().await {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Move past the held page. `Ok(true)` means a new page is now held.
    async fn advance(&mut self) -> Result<bool, PagewiseError> {
        let token = match std::mem::replace(&mut self.phase, Phase::Exhausted) {
            Phase::Start => None,
            Phase::Fetching(token) => token,
            Phase::Holding {
                next: Some(token), ..
            } => Some(token),
            Phase::Holding { next: None, .. } | Phase::Exhausted => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    fetcher = self.fetcher.name(),
                    endpoint = %self.endpoint,
                    pages = self.pages_fetched,
                    "cursor exhausted"
                );
                return Ok(false);
            }
            Phase::Failed(e) => {
                self.phase = Phase::Failed(e.clone());
                return Err(e);
            }
        };

        // Left in place if this future is dropped mid-fetch, so the same page
        // is requested again on the next pull.
        self.phase = Phase::Fetching(token.clone());

        let res = fetch_page(
            self.fetcher.as_ref(),
            &self.throttler,
            &self.endpoint,
            token.as_ref(),
            self.stop.as_ref(),
        )
        .await;

        match res {
            Ok(page) => {
                self.pages_fetched += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    fetcher = self.fetcher.name(),
                    endpoint = %self.endpoint,
                    page = self.pages_fetched,
                    items = page.items.len(),
                    last = page.is_last(),
                    "page fetched"
                );
                self.phase = Phase::Holding {
                    items: page.items.into(),
                    next: page.next,
                    fresh: true,
                };
                Ok(true)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    fetcher = self.fetcher.name(),
                    endpoint = %self.endpoint,
                    error = %e,
                    "page fetch failed"
                );
                self.phase = Phase::Failed(e.clone());
                Err(e)
            }
        }
    }
}

async fn fetch_page<T: Send>(
    fetcher: &dyn PageFetcher<T>,
    throttler: &Throttler,
    endpoint: &str,
    token: Option<&ContinuationToken>,
    stop: Option<&StopSignal>,
) -> Result<Page<T>, PagewiseError> {
    let work = async {
        let permit = throttler.acquire().await?;
        let page = fetcher.fetch(endpoint, token).await;
        permit.release();
        page
    };
    match stop {
        Some(stop) => {
            let mut stop = stop.clone();
            tokio::select! {
                biased;
                () = stop.stopped() => Err(PagewiseError::Cancelled),
                res = work => res,
            }
        }
        None => work.await,
    }
}
