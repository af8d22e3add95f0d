//! Product records exchanged between the remote source and storage.

use crate::ProductId;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identity key, `None` until storage assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    /// Descriptive name, the only field replication overwrites
    pub name: String,
}

impl Product {
    /// Create a product with a known ID.
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Create a product that storage has not assigned an ID to yet.
    pub fn unsaved(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Check if storage has assigned an ID.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Overwrite the mutable fields with those of `fetched`.
    ///
    /// The ID is never touched.
    pub fn apply_changes(&mut self, fetched: &Product) {
        self.name.clone_from(&fetched.name);
    }
}
