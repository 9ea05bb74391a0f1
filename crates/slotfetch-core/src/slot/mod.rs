//! Per-kind holder of the currently referenced unit of work.
use parking_lot::Mutex;
use slotfetch_model::QueryKind;
use tracing::{debug, trace};

use crate::executor::{RequestId, WorkHandle};

/// Holds at most one [`WorkHandle`] for a query kind.
///
/// Replacing the handle drops the old reference without cancelling it: a superseded unit
/// keeps running and can still publish unless it was cancelled beforehand.
pub(crate) struct RequestSlot {
    kind: QueryKind,
    active: Mutex<Option<WorkHandle>>,
}

impl RequestSlot {
    pub(crate) fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            active: Mutex::new(None),
        }
    }

    /// Submit a new unit through `submit` and make it the referenced one.
    ///
    /// The slot stays locked while submitting so a concurrent [`RequestSlot::cancel`]
    /// reaches either the old unit or the new one, never neither.
    pub(crate) fn replace_with(&self, submit: impl FnOnce() -> WorkHandle) -> WorkHandle {
        let mut active = self.active.lock();
        let handle = submit();
        if let Some(prev) = active.replace(handle.clone()) {
            trace!(
                kind = %self.kind,
                previous = %prev.id(),
                current = %handle.id(),
                "slot reference replaced; previous unit left running"
            );
        }
        handle
    }

    /// Cancel the referenced unit, if any. Returns `true` when a handle was referenced.
    pub(crate) fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(handle) => {
                debug!(kind = %self.kind, request = %handle.id(), "cancelling referenced unit");
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// `true` while `id` is the referenced unit.
    pub(crate) fn is_current(&self, id: &RequestId) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|handle| handle.id() == id)
    }

    pub(crate) fn current(&self) -> Option<WorkHandle> {
        self.active.lock().clone()
    }
}
