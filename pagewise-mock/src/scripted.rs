use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pagewise_core::{ContinuationToken, Page, PageFetcher, PagewiseError};
use tokio::time::Instant;

/// Instruction for how one page request should behave.
#[derive(Debug, Clone)]
pub enum PageBehavior<T> {
    /// Return these items.
    Items(Vec<T>),
    /// Fail with the provided error.
    Fail(PagewiseError),
    /// Never complete (simulate a stalled connection).
    Hang,
}

/// One recorded call to [`MockPageFetcher::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    /// Endpoint requested.
    pub endpoint: String,
    /// Continuation token sent, if any.
    pub token: Option<String>,
    /// When the call started (Tokio clock, so paused-time tests are exact).
    pub at: Instant,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<FetchCall>,
    in_flight: usize,
    peak_in_flight: usize,
    // (endpoint, token) -> index of the page the token points at
    issued: HashMap<(String, String), usize>,
    next_token: u64,
}

/// Scripted fetcher serving pre-defined pages per endpoint.
///
/// Endpoints without a script answer with a single empty last page.
pub struct MockPageFetcher<T> {
    name: &'static str,
    routes: HashMap<String, Vec<PageBehavior<T>>>,
    latency: Duration,
    recorder: Mutex<Recorder>,
}

/// Builder for [`MockPageFetcher`].
pub struct MockPageFetcherBuilder<T> {
    name: &'static str,
    routes: HashMap<String, Vec<PageBehavior<T>>>,
    latency: Duration,
}

impl<T> Default for MockPageFetcherBuilder<T> {
    fn default() -> Self {
        Self {
            name: "pagewise-mock",
            routes: HashMap::new(),
            latency: Duration::ZERO,
        }
    }
}

impl<T> MockPageFetcherBuilder<T> {
    /// Name reported by [`PageFetcher::name`].
    #[must_use]
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Simulated network latency applied to every successful or failing call.
    #[must_use]
    pub const fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Serve `pages` in order for `endpoint`.
    #[must_use]
    pub fn pages(mut self, endpoint: impl Into<String>, pages: Vec<Vec<T>>) -> Self {
        self.routes.insert(
            endpoint.into(),
            pages.into_iter().map(PageBehavior::Items).collect(),
        );
        self
    }

    /// Serve an explicit behavior per page for `endpoint`.
    #[must_use]
    pub fn behaviors(mut self, endpoint: impl Into<String>, pages: Vec<PageBehavior<T>>) -> Self {
        self.routes.insert(endpoint.into(), pages);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Arc<MockPageFetcher<T>> {
        Arc::new(MockPageFetcher {
            name: self.name,
            routes: self.routes,
            latency: self.latency,
            recorder: Mutex::new(Recorder::default()),
        })
    }
}

impl<T> MockPageFetcher<T> {
    /// Start building a scripted fetcher.
    #[must_use]
    pub fn builder() -> MockPageFetcherBuilder<T> {
        MockPageFetcherBuilder::default()
    }

    fn recorder(&self) -> std::sync::MutexGuard<'_, Recorder> {
        self.recorder.lock().expect("mutex poisoned")
    }

    /// Every call made so far, in start order.
    #[must_use]
    pub fn calls(&self) -> Vec<FetchCall> {
        self.recorder().calls.clone()
    }

    /// Calls made against one endpoint.
    #[must_use]
    pub fn calls_for(&self, endpoint: &str) -> Vec<FetchCall> {
        self.recorder()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Total number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorder().calls.len()
    }

    /// Calls currently in progress.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.recorder().in_flight
    }

    /// Highest number of simultaneous calls observed.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.recorder().peak_in_flight
    }

    /// Resolve the page index a request refers to and record the call.
    fn begin(
        &self,
        endpoint: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<usize, PagewiseError> {
        let mut rec = self.recorder();
        rec.calls.push(FetchCall {
            endpoint: endpoint.to_string(),
            token: token.map(|t| t.as_str().to_string()),
            at: Instant::now(),
        });
        let index = match token {
            None => 0,
            Some(t) => *rec
                .issued
                .get(&(endpoint.to_string(), t.as_str().to_string()))
                .ok_or_else(|| {
                    PagewiseError::malformed(format!("unknown continuation token {t}"))
                })?,
        };
        rec.in_flight += 1;
        rec.peak_in_flight = rec.peak_in_flight.max(rec.in_flight);
        Ok(index)
    }

    fn issue_token(&self, endpoint: &str, index: usize) -> String {
        let mut rec = self.recorder();
        rec.next_token += 1;
        // Opaque to callers: nothing about the value reveals the page index.
        let token = format!("{:016x}", rec.next_token.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        rec.issued
            .insert((endpoint.to_string(), token.clone()), index);
        token
    }
}

/// Decrements the in-flight gauge when a call ends, including when it is dropped.
struct InFlight<'a>(&'a Mutex<Recorder>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut rec) = self.0.lock() {
            rec.in_flight = rec.in_flight.saturating_sub(1);
        }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageFetcher<T> for MockPageFetcher<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(
        &self,
        endpoint: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, PagewiseError> {
        let index = self.begin(endpoint, token)?;
        let _gauge = InFlight(&self.recorder);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let Some(script) = self.routes.get(endpoint) else {
            return Ok(Page::last(Vec::new()));
        };
        let behavior = script.get(index).cloned().ok_or_else(|| {
            PagewiseError::malformed(format!("{endpoint}: no page at index {index}"))
        })?;

        match behavior {
            PageBehavior::Items(items) => {
                if index + 1 < script.len() {
                    let token = self.issue_token(endpoint, index + 1);
                    Ok(Page::new(items, Some(token)))
                } else {
                    Ok(Page::last(items))
                }
            }
            PageBehavior::Fail(e) => Err(e),
            PageBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
