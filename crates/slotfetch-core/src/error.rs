use slotfetch_model::ModelError;
use thiserror::Error;

/// Failures raised while building a dispatcher or accepting a request.
///
/// Failures of the remote call itself never surface here: they are folded
/// into the observable cells at the unit-of-work boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    Model(#[from] ModelError),

    #[error("no tokio runtime available; build the executor from an explicit handle")]
    NoRuntime,
}
