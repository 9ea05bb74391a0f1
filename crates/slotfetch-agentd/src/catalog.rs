use std::time::Duration;

use async_trait::async_trait;
use slotfetch_core::{RemoteService, TransportError};
use slotfetch_model::{ItemPayload, RemoteResponse, SearchPayload, StatusCode};
use tracing::trace;

const PAGE_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: String,
    pub title: String,
}

/// In-memory recipe catalog with a fixed per-call latency.
///
/// Ids starting with `slow-` never answer within any reasonable timeout.
pub struct RecipeCatalog {
    api_key: String,
    latency: Duration,
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new(api_key: impl Into<String>, latency: Duration) -> Self {
        let recipes = [
            ("r-001", "Tomato soup"),
            ("r-002", "Tomato and basil salad"),
            ("r-003", "Roasted tomato pasta"),
            ("r-004", "Green tomato chutney"),
            ("r-005", "Lentil curry"),
        ]
        .into_iter()
        .map(|(id, title)| Recipe {
            id: id.to_string(),
            title: title.to_string(),
        })
        .collect();

        Self {
            api_key: api_key.into(),
            latency,
            recipes,
        }
    }

    fn authorized(&self, api_key: &str) -> bool {
        api_key == self.api_key
    }
}

#[async_trait]
impl RemoteService for RecipeCatalog {
    type Item = Recipe;

    fn name(&self) -> &'static str {
        "recipe-catalog"
    }

    async fn search(
        &self,
        api_key: &str,
        query: &str,
        page: &str,
    ) -> Result<RemoteResponse<SearchPayload<Recipe>>, TransportError> {
        tokio::time::sleep(self.latency).await;
        if !self.authorized(api_key) {
            return Ok(RemoteResponse::error(401, "invalid api key"));
        }
        let page: usize = page
            .parse()
            .map_err(|_| TransportError::Decode(format!("bad page {page:?}")))?;

        let needle = query.to_ascii_lowercase();
        let matches: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|r| r.title.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = matches.len() as u32;
        let items: Vec<Recipe> = matches
            .into_iter()
            .skip(page.saturating_sub(1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();
        trace!(query, page, returned = items.len(), "catalog search");

        Ok(RemoteResponse::ok(SearchPayload {
            count: total,
            items,
        }))
    }

    async fn fetch_by_id(
        &self,
        api_key: &str,
        id: &str,
    ) -> Result<RemoteResponse<ItemPayload<Recipe>>, TransportError> {
        if id.starts_with("slow-") {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.latency).await;
        if !self.authorized(api_key) {
            return Ok(RemoteResponse::error(401, "invalid api key"));
        }

        Ok(match self.recipes.iter().find(|r| r.id == id) {
            Some(recipe) => RemoteResponse::ok(ItemPayload::new(recipe.clone())),
            None => RemoteResponse::error(StatusCode::NOT_FOUND.as_u16(), format!("no recipe {id}")),
        })
    }
}
