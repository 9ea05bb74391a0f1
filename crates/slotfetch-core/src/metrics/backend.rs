use std::sync::Arc;

use slotfetch_model::QueryKind;

/// How a single unit of work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A result was written into the cell.
    Published,
    /// Transport fault or non-success status; the cell was cleared.
    Failed,
    /// The cancellation flag was observed; no cell was touched.
    Cancelled,
}

impl RequestOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestOutcome::Published => "published",
            RequestOutcome::Failed => "failed",
            RequestOutcome::Cancelled => "cancelled",
        }
    }
}

/// Backend metrics collection interface.
///
/// Every unit of work reports exactly one `started` and one `completed` event.
/// Timeouts are reported separately because a timed-out unit usually completes later as `Cancelled`.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a unit of work being submitted.
    fn record_request_started(&self, kind: QueryKind);
    /// Record unit completion with outcome and wall time.
    ///
    /// # Arguments
    /// - `kind`: query kind of the unit
    /// - `outcome`: how the unit terminated
    /// - `duration_ms`: time between start of the remote call and termination
    fn record_request_completed(&self, kind: QueryKind, outcome: RequestOutcome, duration_ms: u64);
    /// Record a timeout firing for a unit that was still running.
    fn record_timeout(&self, kind: QueryKind);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
