//! Capability names granted through a customer's role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission, e.g. `create-limit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub const CREATE_LIMIT: &'static str = "create-limit";
    pub const DELETE_LIMIT: &'static str = "delete-limit";
    pub const GET_LIMIT: &'static str = "get-limit";
    pub const CREATE_TRANSACTION: &'static str = "create-transaction";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
