mod domain;
pub use domain::{ApiKey, DEFAULT_TIMEOUT_MS, Page, STATUS_OK, StatusCode, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod query;
pub use query::{FetchQuery, QueryKind, SearchQuery};

mod response;
pub use response::{ItemPayload, RemoteResponse, ResponseBody, SearchPayload};
