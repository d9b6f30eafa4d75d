//! Client-wide request throttle.
//!
//! A [`Throttler`] bounds two things independently:
//!
//! - concurrency: at most `max_concurrent` permits are outstanding at once;
//!   a slot is returned as soon as its permit is released or dropped.
//! - rate: at most `max_per_interval` permits are granted within any trailing
//!   `interval` (sliding window log). A grant keeps counting against the
//!   window until it ages out, regardless of how quickly the request finished.
//!
//! Admission is FIFO. The concurrency slot is claimed before the rate slot so
//! a grant is always recorded in the window in which the request starts.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagewise_types::{ConfigError, PagewiseError, ThrottleParameters};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tokio::time::Instant;

use crate::validate::{ValidatedConfig, validate_throttle};

/// Shared gate enforcing concurrency and rate limits for one client.
#[derive(Debug)]
pub struct Throttler {
    params: ThrottleParameters,
    slots: Arc<Semaphore>,
    // Serializes waiters on the rate window so admission stays FIFO.
    admission: tokio::sync::Mutex<()>,
    window: Mutex<RateWindow>,
    closed: watch::Sender<bool>,
}

#[derive(Debug)]
struct RateWindow {
    limit: usize,
    interval: Duration,
    grants: VecDeque<Instant>,
}

impl RateWindow {
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.grants.front() {
            if now.duration_since(oldest) < self.interval {
                break;
            }
            self.grants.pop_front();
        }
    }

    /// Record a grant at `now`, or return how long until one becomes possible.
    fn try_grant(&mut self, now: Instant) -> Result<(), Duration> {
        self.prune(now);
        if self.grants.len() < self.limit {
            self.grants.push_back(now);
            return Ok(());
        }
        let oldest = self.grants.front().copied().unwrap_or(now);
        Err(self
            .interval
            .saturating_sub(now.duration_since(oldest))
            .max(Duration::from_millis(1)))
    }
}

/// Capacity unit allowing one in-flight request.
///
/// The concurrency slot is returned when the permit is released or dropped,
/// whichever happens first; a permit can only be released once.
#[derive(Debug)]
#[must_use = "dropping a permit immediately frees its concurrency slot"]
pub struct ThrottlePermit {
    _slot: OwnedSemaphorePermit,
}

impl ThrottlePermit {
    /// Return the concurrency slot. Rate accounting is unaffected.
    pub fn release(self) {
        drop(self);
    }
}

impl Throttler {
    /// Create a throttler for the given limits.
    ///
    /// # Errors
    /// Returns `MissingThrottleParameters` if any limit is zero.
    pub fn new(params: ThrottleParameters) -> Result<Self, ConfigError> {
        validate_throttle(Some(&params))?;
        Ok(Self::with_checked(params))
    }

    /// Create a throttler for the limits of an already validated configuration.
    #[must_use]
    pub fn for_config(config: &ValidatedConfig) -> Self {
        Self::with_checked(*config.throttle())
    }

    fn with_checked(params: ThrottleParameters) -> Self {
        let concurrency = usize::try_from(params.max_concurrent)
            .unwrap_or(usize::MAX)
            .min(Semaphore::MAX_PERMITS);
        let (closed, _) = watch::channel(false);
        Self {
            params,
            slots: Arc::new(Semaphore::new(concurrency)),
            admission: tokio::sync::Mutex::new(()),
            window: Mutex::new(RateWindow {
                limit: usize::try_from(params.max_per_interval).unwrap_or(usize::MAX),
                interval: params.interval,
                grants: VecDeque::new(),
            }),
            closed,
        }
    }

    /// The limits this throttler enforces.
    #[must_use]
    pub const fn parameters(&self) -> &ThrottleParameters {
        &self.params
    }

    /// Wait until both the concurrency and the rate budget admit one request.
    ///
    /// Dropping the returned future before it resolves abandons the request
    /// without consuming either budget.
    ///
    /// # Errors
    /// Returns `PagewiseError::Cancelled` if the throttler is closed before or
    /// while waiting.
    ///
    /// # Panics
    /// Panics if the internal rate window mutex is poisoned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pagewise::throttle::acquire",
            skip(self),
            level = "trace",
            fields(in_flight = self.in_flight()),
        )
    )]
    pub async fn acquire(&self) -> Result<ThrottlePermit, PagewiseError> {
        let slot = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| PagewiseError::Cancelled)?;

        let mut closed = self.closed.subscribe();
        let _turn = tokio::select! {
            biased;
            () = wait_closed(&mut closed) => return Err(PagewiseError::Cancelled),
            turn = self.admission.lock() => turn,
        };

        loop {
            if *closed.borrow() {
                return Err(PagewiseError::Cancelled);
            }
            let wait = {
                let mut window = self.window.lock().expect("mutex poisoned");
                match window.try_grant(Instant::now()) {
                    Ok(()) => break,
                    Err(wait) => wait,
                }
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                limit = self.params.max_per_interval,
                "rate window full; waiting"
            );
            tokio::select! {
                biased;
                () = wait_closed(&mut closed) => return Err(PagewiseError::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }

        Ok(ThrottlePermit { _slot: slot })
    }

    /// Number of permits currently outstanding.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        usize::try_from(self.params.max_concurrent)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.slots.available_permits())
    }

    /// Number of grants still counted in the trailing interval.
    ///
    /// # Panics
    /// Panics if the internal rate window mutex is poisoned.
    #[must_use]
    pub fn granted_in_window(&self) -> usize {
        let mut window = self.window.lock().expect("mutex poisoned");
        window.prune(Instant::now());
        window.grants.len()
    }

    /// Reject all pending and future acquisitions with `Cancelled`.
    ///
    /// Permits already granted stay valid until released.
    pub fn close(&self) {
        self.slots.close();
        self.closed.send_replace(true);
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let sender_gone = closed.wait_for(|c| *c).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}
