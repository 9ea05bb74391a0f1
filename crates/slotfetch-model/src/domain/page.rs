use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// One-based page number of a paginated search.
///
/// Page `1` replaces previously fetched results, any later page is appended to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Page(NonZeroU32);

impl Page {
    /// The first page of a result set.
    pub const FIRST: Page = Page(NonZeroU32::MIN);

    /// Create a page number, rejecting `0`.
    pub fn new(n: u32) -> ModelResult<Self> {
        NonZeroU32::new(n)
            .map(Page)
            .ok_or(ModelError::InvalidPage(n))
    }

    /// Raw page number.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns `true` for page `1`.
    #[inline]
    pub const fn is_first(self) -> bool {
        self.0.get() == 1
    }

    /// The page following this one.
    pub fn next(self) -> Self {
        Page(self.0.saturating_add(1))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for Page {
    type Error = ModelError;
    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Page> for u32 {
    fn from(p: Page) -> Self {
        p.get()
    }
}

impl FromStr for Page {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<u32>()
            .map_err(|e| ModelError::Invalid(format!("page '{s}': {e}")))?;
        Self::new(n)
    }
}

/// Renders the decimal form sent to the remote service.
impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
