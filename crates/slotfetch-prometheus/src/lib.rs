//! Prometheus backend for dispatcher metrics.
//!
//! [`PrometheusMetrics`] implements [`slotfetch_core::MetricsBackend`] and keeps its
//! collectors in a [`Registry`] that the application exposes however it likes.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use slotfetch_model::QueryKind;
//! use slotfetch_core::MetricsBackend;
//! use slotfetch_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: slotfetch_core::MetricsHandle = Arc::new(metrics.clone());
//! handle.record_request_started(QueryKind::Search);
//!
//! let mut buffer = Vec::new();
//! TextEncoder::new().encode(&metrics.gather(), &mut buffer)?;
//! assert!(String::from_utf8(buffer)?.contains("slotfetch_requests_started_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `slotfetch_requests_started_total{kind}` - Counter
//! - `slotfetch_requests_completed_total{kind, outcome}` - Counter
//! - `slotfetch_request_duration_seconds{kind}` - Histogram
//! - `slotfetch_timeouts_total{kind}` - Counter
//!
//! No HTTP endpoint is provided; serve [`PrometheusMetrics::gather`] from the host application.
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
