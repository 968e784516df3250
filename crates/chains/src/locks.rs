//! Per-chain exclusive sections for mutations.
//!
//! Two mutations of the same chain must not interleave their
//! read-validate-write sequences. Mutations of different chains never wait
//! on each other: each chain id gets its own async mutex, created on demand
//! and dropped again once nobody holds or waits for it.

use crate::ChainId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<ChainId, Arc<AsyncMutex<()>>>>>;

/// Registry of per-chain locks.
#[derive(Debug, Default)]
pub struct ChainLocks {
    slots: Slots,
}

impl ChainLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `chain`.
    ///
    /// The section lasts until the returned guard is dropped.
    pub async fn acquire(&self, chain: &ChainId) -> ChainGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(chain.clone()).or_default())
        };
        let guard = Arc::clone(&slot).lock_owned().await;

        ChainGuard {
            chain: chain.clone(),
            slots: Arc::clone(&self.slots),
            slot,
            guard: Some(guard),
        }
    }

    /// Number of chains with a live lock entry.
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one chain.
#[derive(Debug)]
pub struct ChainGuard {
    chain: ChainId,
    slots: Slots,
    slot: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ChainGuard {
    /// The locked chain.
    #[must_use]
    pub fn chain(&self) -> &ChainId {
        &self.chain
    }
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        // release before deciding whether the entry is still needed
        drop(self.guard.take());

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the registry plus ours: nobody else is waiting
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.chain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = ChainLocks::new();
        let guard = locks.acquire(&ChainId::from("a")).await;
        assert_eq!(guard.chain().as_str(), "a");
        assert_eq!(locks.active(), 1);

        drop(guard);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_different_chains_do_not_block() {
        let locks = ChainLocks::new();
        let _a = locks.acquire(&ChainId::from("a")).await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&ChainId::from("b")))
            .await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_same_chain_waits_for_release() {
        let locks = Arc::new(ChainLocks::new());
        let id = ChainId::from("a");
        let first = locks.acquire(&id).await;

        let contender = {
            let locks = Arc::clone(&locks);
            let id = id.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());
        // the waiter keeps the entry alive
        assert_eq!(locks.active(), 1);

        drop(first);
        contender.await.unwrap();
        assert_eq!(locks.active(), 0);
    }
}
