//! Background executor consumed by the dispatcher.
//!
//! Units of work run as tasks on a tokio runtime; timeouts are tokio timers on the same runtime.
//! Cancellation is cooperative: a [`WorkHandle`] only flips a flag that the unit checks.
use std::{
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU8, AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::runtime::Handle;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::trace;

use crate::error::CoreError;

/// Global monotonically increasing sequence for request identifiers.
static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

const RUNNING: u8 = 0;
/// The unit finished or committed to publishing.
const SETTLED: u8 = 1;
/// The timeout claimed the unit first.
const EXPIRED: u8 = 2;

/// Process-local identifier of one submitted unit of work.
///
/// Rendered as `{kind}-{seq:x}` in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    seq: u64,
    label: Arc<str>,
}

impl RequestId {
    /// Allocate the next id for units tagged with `label`.
    pub fn next(label: &str) -> Self {
        let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            seq,
            label: Arc::from(format!("{label}-{seq:x}")),
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// The running unit's view of its own lifecycle.
///
/// Settling and expiring are mutually exclusive: whichever of the unit and its timeout
/// claims first wins, so a unit never publishes after its timeout fired and a timeout
/// never fires for a unit that already published.
#[derive(Clone, Debug, Default)]
pub struct UnitToken {
    cancel: CancellationToken,
    state: Arc<AtomicU8>,
}

impl UnitToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Request cancellation from inside the unit.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Claim the right to publish.
    ///
    /// Fails once cancellation was requested or the timeout expired the unit.
    pub fn try_settle(&self) -> bool {
        !self.cancel.is_cancelled() && claim(&self.state, SETTLED)
    }
}

fn claim(state: &AtomicU8, to: u8) -> bool {
    state
        .compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

/// Handle to a submitted unit of work.
///
/// Cloning shares the same flags. Dropping the handle neither cancels nor detaches anything:
/// the unit keeps running until it finishes or observes cancellation.
#[derive(Clone)]
pub struct WorkHandle {
    id: RequestId,
    token: UnitToken,
    /// Cancelled when the unit's future returns.
    done: CancellationToken,
}

impl WorkHandle {
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Request best-effort cancellation.
    ///
    /// A unit blocked in a call that cannot be interrupted only sees the flag after the call returns.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            trace!(request = %self.id, "cancellation requested");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `true` once the unit's future has returned.
    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }

    /// `true` once the unit finished or committed to publishing.
    pub fn is_settled(&self) -> bool {
        self.token.state.load(Ordering::Acquire) == SETTLED
    }

    /// Claim the unit for its timeout.
    ///
    /// Returns `false` when the unit already settled or another caller expired it.
    /// After a successful claim the unit cannot publish anything.
    pub fn try_expire(&self) -> bool {
        claim(&self.token.state, EXPIRED)
    }
}

impl fmt::Debug for WorkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkHandle")
            .field("id", &self.id.as_str())
            .field("cancelled", &self.is_cancelled())
            .field("settled", &self.is_settled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Handle to a callback registered with [`Executor::schedule_after`].
#[derive(Debug, Clone)]
pub struct ScheduledHandle {
    disarm: CancellationToken,
}

impl ScheduledHandle {
    /// Prevent the callback from running if it has not fired yet.
    pub fn disarm(&self) {
        self.disarm.cancel();
    }

    pub fn is_disarmed(&self) -> bool {
        self.disarm.is_cancelled()
    }
}

/// Runs units of work and delayed callbacks off the calling thread.
#[derive(Clone, Debug)]
pub struct Executor {
    handle: Handle,
}

impl Executor {
    /// Use the tokio runtime the caller is running in.
    pub fn current() -> Result<Self, CoreError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|_| CoreError::NoRuntime)
    }

    /// Use an explicit runtime handle.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawn `work` with a fresh [`UnitToken`] and return its handle.
    ///
    /// The token passed to `work` is the one flipped by [`WorkHandle::cancel`].
    /// The unit settles when `work` returns, if it has not settled or expired before.
    pub fn submit<W, Fut>(&self, id: RequestId, work: W) -> WorkHandle
    where
        W: FnOnce(UnitToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = UnitToken::new();
        let done = CancellationToken::new();

        let fut = work(token.clone());
        let state = Arc::clone(&token.state);
        let finished = done.clone();
        trace!(request = %id, "submitting unit of work");
        self.handle.spawn(async move {
            fut.await;
            claim(&state, SETTLED);
            finished.cancel();
        });

        WorkHandle { id, token, done }
    }

    /// Run `callback` once after `delay`, unless `unit` finishes or the handle is disarmed first.
    pub fn schedule_after<F>(
        &self,
        unit: &WorkHandle,
        delay: Duration,
        callback: F,
    ) -> ScheduledHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let disarm = unit.done.child_token();
        let token = disarm.clone();
        let id = unit.id.clone();
        self.handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => trace!(request = %id, "timer disarmed"),
                _ = tokio::time::sleep(delay) => callback(),
            }
        });
        ScheduledHandle { disarm }
    }
}
