use std::sync::Arc;

use async_trait::async_trait;
use slotfetch_model::{ApiKey, Page, QueryKind, RemoteResponse, SearchPayload, SearchQuery};
use tracing::trace;

use crate::{
    cell::Observable,
    remote::{RemoteService, TransportError},
    unit::Flow,
};

/// List cell shared by every search unit.
pub(crate) type ListCell<I> = Observable<Option<Vec<I>>>;

/// Search for one page and merge it into the list cell.
pub(crate) struct SearchFlow<S: RemoteService> {
    remote: Arc<S>,
    api_key: ApiKey,
    query: SearchQuery,
    results: Arc<ListCell<S::Item>>,
}

impl<S: RemoteService> SearchFlow<S> {
    pub(crate) fn new(
        remote: Arc<S>,
        api_key: ApiKey,
        query: SearchQuery,
        results: Arc<ListCell<S::Item>>,
    ) -> Self {
        Self {
            remote,
            api_key,
            query,
            results,
        }
    }
}

#[async_trait]
impl<S: RemoteService> Flow for SearchFlow<S> {
    type Payload = SearchPayload<S::Item>;

    fn kind(&self) -> QueryKind {
        QueryKind::Search
    }

    async fn call(&self) -> Result<RemoteResponse<Self::Payload>, TransportError> {
        trace!(
            remote = self.remote.name(),
            query = %self.query.text,
            page = self.query.page.get(),
            "calling remote search"
        );
        self.remote
            .search(
                self.api_key.as_str(),
                &self.query.text,
                &self.query.page.to_string(),
            )
            .await
    }

    fn publish(&self, payload: Self::Payload) {
        let page = self.query.page;
        let fetched = payload.items.len();
        self.results
            .update(move |current| merge_page(current, page, payload.items));
        trace!(page = page.get(), fetched, "search results published");
    }

    fn publish_failure(&self) {
        self.results.set(None);
    }
}

/// Merge one fetched page into the list.
///
/// Page `1` replaces the list. Later pages are appended in arrival order;
/// an empty (`None`) list counts as empty, so the page becomes the whole list.
pub(crate) fn merge_page<I>(current: &mut Option<Vec<I>>, page: Page, items: Vec<I>) {
    match current {
        Some(list) if !page.is_first() => list.extend(items),
        _ => *current = Some(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u32) -> Page {
        Page::new(n).unwrap()
    }

    #[test]
    fn first_page_replaces_existing_list() {
        let mut cur = Some(vec!["x", "y", "z"]);
        merge_page(&mut cur, Page::FIRST, vec!["a", "b"]);
        assert_eq!(cur, Some(vec!["a", "b"]));
    }

    #[test]
    fn first_page_replaces_empty_cell() {
        let mut cur: Option<Vec<&str>> = None;
        merge_page(&mut cur, Page::FIRST, vec!["a"]);
        assert_eq!(cur, Some(vec!["a"]));
    }

    #[test]
    fn later_page_appends_in_order() {
        let mut cur = Some(vec!["a", "b"]);
        merge_page(&mut cur, page(2), vec!["c", "d"]);
        merge_page(&mut cur, page(3), vec!["e"]);
        assert_eq!(cur, Some(vec!["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn later_page_after_failure_starts_new_list() {
        let mut cur: Option<Vec<&str>> = None;
        merge_page(&mut cur, page(2), vec!["c", "d"]);
        assert_eq!(cur, Some(vec!["c", "d"]));
    }

    #[test]
    fn empty_later_page_keeps_list() {
        let mut cur = Some(vec!["a"]);
        merge_page(&mut cur, page(4), Vec::new());
        assert_eq!(cur, Some(vec!["a"]));
    }
}
