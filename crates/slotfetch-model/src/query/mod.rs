use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Page,
    error::{ModelError, ModelResult},
};

/// Discriminator between the paginated search flow and the fetch-by-id flow.
///
/// Each kind owns exactly one request slot and one result cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    /// Paginated search returning a list of items.
    Search,
    /// Single resource lookup by identifier.
    FetchById,
}

impl QueryKind {
    /// All kinds, in slot order.
    pub const ALL: [QueryKind; 2] = [QueryKind::Search, QueryKind::FetchById];

    /// Returns the kind as a static string, used for log fields and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Search => "search",
            QueryKind::FetchById => "fetch-by-id",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(QueryKind::Search),
            "fetch-by-id" | "fetch" | "by-id" => Ok(QueryKind::FetchById),
            other => Err(ModelError::UnknownQueryKind(other.to_string())),
        }
    }
}

/// Parameters of one search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free-form search text, sent verbatim.
    pub text: String,
    /// Requested page; `1` restarts the result list.
    #[serde(default)]
    pub page: Page,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, page: Page) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }

    /// Query for the first page of `text`.
    pub fn first(text: impl Into<String>) -> Self {
        Self::new(text, Page::FIRST)
    }

    /// Same text, next page.
    pub fn next_page(&self) -> Self {
        Self::new(self.text.clone(), self.page.next())
    }
}

/// Parameters of one fetch-by-id request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    id: String,
}

impl FetchQuery {
    /// Create a query for `id`, rejecting empty or whitespace-only identifiers.
    pub fn new(id: impl Into<String>) -> ModelResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::Invalid("resource id is empty".into()));
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
