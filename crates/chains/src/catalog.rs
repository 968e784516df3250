//! Quest catalog lookup port.
//!
//! The catalog owns the authoritative quest records. The engine only asks
//! whether an id exists before letting it into a chain.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use async_trait::async_trait;
use miette::Diagnostic;
use questgraph_graph::QuestId;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Errors a catalog backend can report.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CatalogError {
    /// The backend could not answer.
    #[error("Catalog unavailable: {message}")]
    #[diagnostic(code(questgraph::catalog::unavailable))]
    Unavailable {
        /// Backend failure description.
        message: String,
    },
}

/// Existence checks against the quest catalog.
///
/// Implementations must be safe to call concurrently; the validator issues
/// all lookups for one chain at once.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Whether a quest with this id exists.
    async fn exists(&self, id: &QuestId) -> Result<bool, CatalogError>;
}

/// Catalog backed by an in-process set of quest ids.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    quests: RwLock<HashSet<QuestId>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog containing the given quests.
    #[must_use]
    pub fn with_quests<I, Q>(quests: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QuestId>,
    {
        Self {
            quests: RwLock::new(quests.into_iter().map(Into::into).collect()),
        }
    }

    /// Register a quest. Returns `false` if it was already present.
    pub fn insert(&self, id: impl Into<QuestId>) -> bool {
        self.quests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into())
    }

    /// Unregister a quest. Returns `false` if it was not present.
    pub fn remove(&self, id: &QuestId) -> bool {
        self.quests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Check if a quest is registered.
    #[must_use]
    pub fn contains(&self, id: &QuestId) -> bool {
        self.quests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Number of registered quests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn exists(&self, id: &QuestId) -> Result<bool, CatalogError> {
        Ok(self.contains(id))
    }
}
