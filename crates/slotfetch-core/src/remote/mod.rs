//! Call surface of the remote service the dispatcher fetches from.
//!
//! The transport (HTTP client, endpoint layout, payload decoding) lives outside this crate
//! and plugs in by implementing [`RemoteService`].
mod error;
pub use error::TransportError;

use async_trait::async_trait;
use slotfetch_model::{ItemPayload, RemoteResponse, SearchPayload};

/// Remote service with a paginated search and a lookup by identifier.
///
/// Implementations return `Ok` for every reply that reached the caller, whatever its status,
/// and `Err` only when no reply could be obtained or decoded.
#[async_trait]
pub trait RemoteService: Send + Sync + 'static {
    /// Resource type returned by both operations.
    type Item: Clone + Send + Sync + 'static;

    /// Service name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "remote"
    }

    /// Search `query`; `page` is the decimal page number.
    async fn search(
        &self,
        api_key: &str,
        query: &str,
        page: &str,
    ) -> Result<RemoteResponse<SearchPayload<Self::Item>>, TransportError>;

    /// Fetch a single resource by `id`.
    async fn fetch_by_id(
        &self,
        api_key: &str,
        id: &str,
    ) -> Result<RemoteResponse<ItemPayload<Self::Item>>, TransportError>;
}
