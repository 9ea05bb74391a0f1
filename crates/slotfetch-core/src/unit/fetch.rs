use std::sync::Arc;

use async_trait::async_trait;
use slotfetch_model::{ApiKey, FetchQuery, ItemPayload, QueryKind, RemoteResponse};
use tracing::trace;

use crate::{
    cell::Observable,
    remote::{RemoteService, TransportError},
    unit::Flow,
};

/// Single-item cell shared by every fetch-by-id unit.
pub(crate) type ItemCell<I> = Observable<Option<I>>;

/// Fetch one resource and store it in the item cell.
pub(crate) struct FetchFlow<S: RemoteService> {
    remote: Arc<S>,
    api_key: ApiKey,
    query: FetchQuery,
    item: Arc<ItemCell<S::Item>>,
}

impl<S: RemoteService> FetchFlow<S> {
    pub(crate) fn new(
        remote: Arc<S>,
        api_key: ApiKey,
        query: FetchQuery,
        item: Arc<ItemCell<S::Item>>,
    ) -> Self {
        Self {
            remote,
            api_key,
            query,
            item,
        }
    }
}

#[async_trait]
impl<S: RemoteService> Flow for FetchFlow<S> {
    type Payload = ItemPayload<S::Item>;

    fn kind(&self) -> QueryKind {
        QueryKind::FetchById
    }

    async fn call(&self) -> Result<RemoteResponse<Self::Payload>, TransportError> {
        trace!(remote = self.remote.name(), id = %self.query.id(), "calling remote fetch-by-id");
        self.remote
            .fetch_by_id(self.api_key.as_str(), self.query.id())
            .await
    }

    fn publish(&self, payload: Self::Payload) {
        self.item.set(Some(payload.item));
    }

    fn publish_failure(&self) {
        self.item.set(None);
    }
}
