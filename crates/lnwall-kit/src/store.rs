//! In-process replay store.
//!
//! Keeps every redeemed payment hash in a shared set. Records live as long as the process,
//! which is enough for a single instance; deployments with several instances behind a load
//! balancer need a shared backend implementing the same trait.

use std::{collections::HashSet, sync::Arc};

use lnwall_core::{errors::StoreError, store::ReplayStore, types::PaymentHash};
use parking_lot::Mutex;

/// A [`ReplayStore`] backed by a mutex-guarded `HashSet`.
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashSet<PaymentHash>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of redeemed payment hashes.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn contains(&self, key: &PaymentHash) -> bool {
        self.inner.lock().contains(key)
    }
}

impl ReplayStore for MemoryStore {
    async fn was_used(&self, key: PaymentHash) -> Result<bool, StoreError> {
        Ok(self.contains(&key))
    }

    async fn mark_used(&self, key: PaymentHash) -> Result<(), StoreError> {
        self.inner.lock().insert(key);
        Ok(())
    }

    async fn try_claim(&self, key: PaymentHash) -> Result<bool, StoreError> {
        // `insert` returns false when the key was already present.
        let newly_claimed = self.inner.lock().insert(key);
        Ok(!newly_claimed)
    }
}
