//! Common model-level constants.

/// Default wall-clock budget for one remote request, in milliseconds.
///
/// When it elapses the request is asked to cancel; fetch-by-id additionally
/// reports the timeout through its dedicated flag.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// The only status code treated as a successful remote reply.
pub const STATUS_OK: u16 = 200;
