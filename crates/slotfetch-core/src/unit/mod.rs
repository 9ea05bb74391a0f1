//! Single-run, cancellable units of work.
//!
//! Both query kinds share one state machine: call the remote, interpret the reply,
//! check the cancellation flag, publish. The kind-specific parts live behind [`Flow`].
mod error;
pub(crate) use error::UnitError;

mod fetch;
pub(crate) use fetch::FetchFlow;

mod search;
pub(crate) use search::SearchFlow;

use std::time::Instant;

use async_trait::async_trait;
use slotfetch_model::{QueryKind, RemoteResponse};
use tracing::{debug, instrument, trace, warn};

use crate::{
    executor::{RequestId, UnitToken},
    metrics::{MetricsHandle, RequestOutcome},
    remote::TransportError,
};

/// Kind-specific half of a unit of work.
#[async_trait]
pub(crate) trait Flow: Send + Sync + 'static {
    /// Successful payload type.
    type Payload: Send + 'static;

    fn kind(&self) -> QueryKind;

    /// Perform the remote call.
    async fn call(&self) -> Result<RemoteResponse<Self::Payload>, TransportError>;

    /// Write a successful payload into the target cell.
    fn publish(&self, payload: Self::Payload);

    /// Clear the target cell after a failed call.
    fn publish_failure(&self);
}

/// Execute `flow` once.
///
/// The remote call is raced against cancellation. A call that returns anyway must settle
/// the unit before anything is written, which fails once the unit was cancelled or its
/// timeout claimed it. Every error is absorbed here.
#[instrument(level = "debug", skip_all, fields(request = %id, kind = %flow.kind()))]
pub(crate) async fn run<F: Flow>(
    flow: F,
    id: RequestId,
    token: UnitToken,
    metrics: MetricsHandle,
) -> RequestOutcome {
    let kind = flow.kind();
    let started = Instant::now();
    metrics.record_request_started(kind);

    let outcome = execute(&flow, &token).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    metrics.record_request_completed(kind, outcome, elapsed_ms);
    trace!(outcome = outcome.as_label(), elapsed_ms, "unit of work finished");
    outcome
}

async fn execute<F: Flow>(flow: &F, token: &UnitToken) -> RequestOutcome {
    let reply = tokio::select! {
        reply = flow.call() => reply,
        _ = token.cancelled() => {
            debug!("cancellation requested; abandoning remote call");
            return RequestOutcome::Cancelled;
        }
    };

    if !token.try_settle() {
        debug!("cancelled or timed out before publishing; discarding reply");
        return RequestOutcome::Cancelled;
    }

    match interpret(reply) {
        Ok(payload) => {
            flow.publish(payload);
            RequestOutcome::Published
        }
        Err(e) => {
            match &e {
                UnitError::Transport(err) => warn!(error = %err, "remote call failed"),
                UnitError::Remote { status, body } => {
                    warn!(status = status.as_u16(), body = %body, "remote returned error")
                }
            }
            flow.publish_failure();
            RequestOutcome::Failed
        }
    }
}

fn interpret<P>(reply: Result<RemoteResponse<P>, TransportError>) -> Result<P, UnitError> {
    reply?
        .into_result()
        .map_err(|(status, body)| UnitError::Remote { status, body })
}
