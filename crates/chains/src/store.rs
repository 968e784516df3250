//! Quest store port and the in-memory adapter.
//!
//! The store persists validated chains and hands out immutable snapshots.
//! Writes use optimistic concurrency: a writer names the version it
//! validated against and the store refuses the write if the chain moved on.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::{ChainId, QuestChain, ValidatedChain};
use async_trait::async_trait;
use miette::Diagnostic;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::trace;

/// Errors a store backend can report.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum StoreError {
    /// No chain is stored under the id.
    #[error("Chain '{chain}' not found")]
    #[diagnostic(code(questgraph::store::not_found))]
    NotFound {
        /// The requested chain.
        chain: ChainId,
    },

    /// The stored version differs from the one the writer expected.
    #[error("Chain '{chain}' is at version {actual:?}, expected {expected:?}")]
    #[diagnostic(code(questgraph::store::conflict))]
    Conflict {
        /// The contended chain.
        chain: ChainId,
        /// Version the writer validated against (`None`: chain must not exist).
        expected: Option<u64>,
        /// Version currently stored (`None`: chain does not exist).
        actual: Option<u64>,
    },

    /// The backend could not complete the operation.
    #[error("Store unavailable: {message}")]
    #[diagnostic(code(questgraph::store::unavailable))]
    Unavailable {
        /// Backend failure description.
        message: String,
    },
}

/// Durable home of quest chains.
#[async_trait]
pub trait QuestStore: Send + Sync {
    /// Mint a fresh chain id. The engine never invents ids itself.
    async fn allocate_id(&self) -> Result<ChainId, StoreError>;

    /// Fetch the current snapshot of a chain.
    async fn get(&self, id: &ChainId) -> Result<Arc<QuestChain>, StoreError>;

    /// Atomically write a validated chain.
    ///
    /// `expected = None` requires that no chain exists under `id`;
    /// `expected = Some(v)` requires the stored version to still be `v`.
    /// On success the store assigns the next version and returns the stored
    /// snapshot. A mismatch fails with [`StoreError::Conflict`] and leaves
    /// the stored chain untouched.
    async fn put(
        &self,
        id: &ChainId,
        chain: ValidatedChain,
        expected: Option<u64>,
    ) -> Result<Arc<QuestChain>, StoreError>;
}

/// Store keeping every chain in process memory.
#[derive(Debug, Default)]
pub struct InMemoryQuestStore {
    chains: RwLock<HashMap<ChainId, Arc<QuestChain>>>,
    next_id: AtomicU64,
}

impl InMemoryQuestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a chain without any checks, bumping its version.
    ///
    /// Simulates another process editing storage behind the engine's back.
    pub fn replace_unchecked(&self, chain: QuestChain) -> Arc<QuestChain> {
        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        let version = chains.get(chain.id()).map_or(1, |c| c.version() + 1);
        let stored = Arc::new(QuestChain::from_parts(
            chain.id().clone(),
            version,
            chain.definition().clone(),
        ));
        chains.insert(stored.id().clone(), Arc::clone(&stored));
        stored
    }
}

#[async_trait]
impl QuestStore for InMemoryQuestStore {
    async fn allocate_id(&self) -> Result<ChainId, StoreError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ChainId::new(format!("chain-{n}")))
    }

    async fn get(&self, id: &ChainId) -> Result<Arc<QuestChain>, StoreError> {
        self.chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { chain: id.clone() })
    }

    async fn put(
        &self,
        id: &ChainId,
        chain: ValidatedChain,
        expected: Option<u64>,
    ) -> Result<Arc<QuestChain>, StoreError> {
        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        let actual = chains.get(id).map(|c| c.version());

        if actual != expected {
            return Err(StoreError::Conflict {
                chain: id.clone(),
                expected,
                actual,
            });
        }

        let version = actual.map_or(1, |v| v + 1);
        let stored = Arc::new(chain.into_snapshot(id.clone(), version));
        chains.insert(id.clone(), Arc::clone(&stored));
        trace!(chain = %id, version, "Stored chain snapshot");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChainDefinition;

    fn validated(ids: &[&str]) -> ValidatedChain {
        let def = ids
            .iter()
            .fold(ChainDefinition::new(), |def, id| def.with_quest(*id, *id));
        ValidatedChain::new(def)
    }

    #[tokio::test]
    async fn test_allocate_distinct_ids() {
        let store = InMemoryQuestStore::new();
        let a = store.allocate_id().await.unwrap();
        let b = store.allocate_id().await.unwrap();
        assert_eq!(a.as_str(), "chain-1");
        assert_eq!(b.as_str(), "chain-2");
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryQuestStore::new();
        let id = ChainId::from("c");

        let first = store.put(&id, validated(&["a"]), None).await.unwrap();
        assert_eq!(first.version(), 1);

        let second = store.put(&id, validated(&["a", "b"]), Some(1)).await.unwrap();
        assert_eq!(second.version(), 2);

        let fetched = store.get(&id).await.unwrap();
        assert_eq!(fetched.nodes().len(), 2);
        assert!(Arc::ptr_eq(&fetched, &second));
    }

    #[tokio::test]
    async fn test_stale_put_conflicts_and_keeps_old_snapshot() {
        let store = InMemoryQuestStore::new();
        let id = ChainId::from("c");
        store.put(&id, validated(&["a"]), None).await.unwrap();
        store.put(&id, validated(&["a", "b"]), Some(1)).await.unwrap();

        let err = store
            .put(&id, validated(&["x"]), Some(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: Some(1),
                actual: Some(2),
                ..
            }
        ));
        assert_eq!(store.get(&id).await.unwrap().nodes().len(), 2);
    }

    #[tokio::test]
    async fn test_create_over_existing_conflicts() {
        let store = InMemoryQuestStore::new();
        let id = ChainId::from("c");
        store.put(&id, validated(&["a"]), None).await.unwrap();

        let err = store.put(&id, validated(&["b"]), None).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { actual: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryQuestStore::new();
        let err = store.get(&ChainId::from("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_replace_unchecked_bumps_version() {
        let store = InMemoryQuestStore::new();
        let id = ChainId::from("c");
        store.put(&id, validated(&["a"]), None).await.unwrap();

        let raw = QuestChain::from_parts(id.clone(), 0, ChainDefinition::new());
        let replaced = store.replace_unchecked(raw);
        assert_eq!(replaced.version(), 2);
        assert!(store.get(&id).await.unwrap().nodes().is_empty());
    }
}
