use slotfetch_model::StatusCode;
use thiserror::Error;

use crate::remote::TransportError;

/// Why a unit of work could not produce a result.
///
/// Never leaves the unit: both variants collapse to an empty cell.
#[derive(Debug, Error)]
pub(crate) enum UnitError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("remote returned status {status}: {body}")]
    Remote { status: StatusCode, body: String },
}
