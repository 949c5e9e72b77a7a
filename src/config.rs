//! Store and scoping configuration.
//!
//! These types are deserialized as part of the server configuration, so
//! every field has a serde default and the enums use snake_case names
//! (`global`, `per_user`, ...).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the store keeps its data.
///
/// ```
/// use fakedetector::StoreLocation;
///
/// // Single file on disk (the deployed form)
/// let location = StoreLocation::file("./database.sqlite");
///
/// // Private in-memory database (for tests)
/// let location = StoreLocation::in_memory();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
    /// A single SQLite file; removed and recreated on reset.
    File(PathBuf),
    /// A private in-memory database; a reset simply opens a fresh one.
    InMemory,
}

impl StoreLocation {
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        StoreLocation::File(path.into())
    }

    pub fn in_memory() -> Self {
        StoreLocation::InMemory
    }
}

/// Whether records are visible globally or only to the identity that
/// created them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// One shared history for every caller.
    #[default]
    Global,
    /// Every data request carries a `user-id` and only sees its own rows.
    PerUser,
}

impl ScopeMode {
    pub fn requires_identity(self) -> bool {
        matches!(self, ScopeMode::PerUser)
    }
}

/// Visibility applied to a single data operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Owner(String),
}

impl Scope {
    pub fn owner(&self) -> Option<&str> {
        match self {
            Scope::All => None,
            Scope::Owner(id) => Some(id.as_str()),
        }
    }
}
