use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use slotfetch_core::{MetricsBackend, RequestOutcome};
use slotfetch_model::QueryKind;

/// Remote calls are bounded by the dispatcher timeout (3s by default).
const DURATION_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0];

/// Prometheus implementation of [`MetricsBackend`].
///
/// Labels are bounded: `kind` is `search` or `fetch-by-id`, `outcome` is
/// `published`, `failed` or `cancelled`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    requests_started: CounterVec,
    requests_completed: CounterVec,
    request_duration: HistogramVec,
    timeouts: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register the collectors in `registry`.
    ///
    /// Fails if the registry already holds collectors with the same names.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let requests_started = CounterVec::new(
            Opts::new(
                "slotfetch_requests_started_total",
                "Units of work submitted to the executor",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(requests_started.clone()))?;

        let requests_completed = CounterVec::new(
            Opts::new(
                "slotfetch_requests_completed_total",
                "Units of work that terminated, by outcome",
            ),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(requests_completed.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "slotfetch_request_duration_seconds",
                "Time from remote call start to unit termination",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["kind"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let timeouts = CounterVec::new(
            Opts::new(
                "slotfetch_timeouts_total",
                "Timeouts that fired while the unit was still running",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(timeouts.clone()))?;

        Ok(Self {
            requests_started,
            requests_completed,
            request_duration,
            timeouts,
            registry,
        })
    }

    /// Register the collectors in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Snapshot of every collector in the registry, ready for a [`prometheus::TextEncoder`].
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_request_started(&self, kind: QueryKind) {
        self.requests_started
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    fn record_request_completed(&self, kind: QueryKind, outcome: RequestOutcome, duration_ms: u64) {
        self.requests_completed
            .with_label_values(&[kind.as_str(), outcome.as_label()])
            .inc();
        self.request_duration
            .with_label_values(&[kind.as_str()])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_timeout(&self, kind: QueryKind) {
        self.timeouts.with_label_values(&[kind.as_str()]).inc();
    }
}
