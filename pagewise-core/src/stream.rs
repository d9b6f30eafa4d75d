use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Abstraction over a handle that can be queried for completion and aborted.
pub trait Abortable {
    /// Abort the underlying task if it is still running.
    fn abort(&mut self);
    /// Return `true` if the underlying task has completed.
    fn is_finished(&self) -> bool;
}

impl Abortable for JoinHandle<()> {
    fn abort(&mut self) {
        // JoinHandle::abort takes &self
        Self::abort(self);
    }

    fn is_finished(&self) -> bool {
        Self::is_finished(self)
    }
}

/// Abstraction over a one-shot stop request.
pub trait Stoppable {
    /// Send a best-effort stop signal to request graceful shutdown.
    fn send(self);
}

impl Stoppable for StopHandle {
    fn send(self) {
        self.stop();
    }
}

/// Drop-time logic for worker handles:
/// - send a best-effort stop signal if present
/// - abort the task if it hasn't finished yet
pub fn drop_impl<H, S>(inner: &mut Option<H>, stop_tx: &mut Option<S>)
where
    H: Abortable,
    S: Stoppable,
{
    if let Some(tx) = stop_tx.take() {
        tx.send();
    }
    if let Some(mut h) = inner.take()
        && !h.is_finished()
    {
        h.abort();
    }
}

/// Sending half of a cooperative stop flag.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Receiving half of a cooperative stop flag.
///
/// Cloning yields another observer of the same flag.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

/// Create a linked stop handle and signal.
#[must_use]
pub fn stop_pair() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    /// Raise the stop flag. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once `stop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Create another signal observing this handle.
    #[must_use]
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl StopSignal {
    /// Returns `true` once the linked handle has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the flag is raised.
    ///
    /// If the handle is dropped without stopping, this never resolves.
    pub async fn stopped(&mut self) {
        let sender_gone = self.rx.wait_for(|stopped| *stopped).await.is_err();
        if sender_gone {
            std::future::pending::<()>().await;
        }
    }
}

/// Owner of a background worker task.
///
/// Dropping the handle raises the worker's stop flag and aborts the task if it
/// is still running, so any throttle permit it holds is released.
#[derive(Debug)]
pub struct WorkerHandle {
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<StopHandle>,
}

impl WorkerHandle {
    /// Wrap a spawned task together with its stop flag.
    #[must_use]
    pub const fn new(inner: JoinHandle<()>, stop_tx: StopHandle) -> Self {
        Self {
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Returns `true` if the worker task has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Request a graceful stop and wait for the task to end.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            tx.send();
        }
        if let Some(inner) = self.inner.take() {
            let _ = inner.await;
        }
    }

    /// Abort the worker immediately.
    pub fn abort(mut self) {
        drop_impl(&mut self.inner, &mut self.stop_tx);
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        drop_impl(&mut self.inner, &mut self.stop_tx);
    }
}
