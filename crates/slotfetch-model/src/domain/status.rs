use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::STATUS_OK;

/// Status code reported by the remote service alongside every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(STATUS_OK);
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Only an exact `200` counts as success.
    pub const fn is_success(self) -> bool {
        self.0 == STATUS_OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
