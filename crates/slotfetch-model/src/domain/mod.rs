mod constants;
pub use constants::{DEFAULT_TIMEOUT_MS, STATUS_OK};

mod page;
pub use page::Page;

mod status;
pub use status::StatusCode;

mod api_key;
pub use api_key::ApiKey;

/// Timeout value in milliseconds.
///
/// A single process-wide value bounds every remote request.
pub type TimeoutMs = u64;
