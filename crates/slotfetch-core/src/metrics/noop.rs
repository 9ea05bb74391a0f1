use slotfetch_model::QueryKind;

use crate::metrics::backend::{MetricsBackend, RequestOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_request_started(&self, _: QueryKind) {}

    #[inline(always)]
    fn record_request_completed(&self, _: QueryKind, _: RequestOutcome, _: u64) {}

    #[inline(always)]
    fn record_timeout(&self, _: QueryKind) {}
}
