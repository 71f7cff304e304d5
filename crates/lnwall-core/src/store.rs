//! Replay-prevention capability.

use std::sync::Arc;

use crate::{errors::StoreError, types::PaymentHash};

/// Durable record of which payment hashes were already redeemed.
///
/// `was_used` followed by `mark_used` is **not** atomic: two requests carrying the same
/// preimage can both observe "unused" before either marks it. Anything that needs an
/// at-most-once guarantee must commit with [`try_claim`](ReplayStore::try_claim), which
/// implementations provide as a single insert-if-absent.
///
/// Records never expire.
pub trait ReplayStore: Send + Sync {
    /// Whether the payment hash was already redeemed.
    fn was_used(&self, key: PaymentHash) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Record the payment hash as redeemed. Marking twice is a no-op.
    fn mark_used(&self, key: PaymentHash) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Atomically record the payment hash as redeemed.
    ///
    /// Returns `true` if it had already been claimed, in which case nothing changes.
    fn try_claim(
        &self,
        key: PaymentHash,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

impl<T: ReplayStore> ReplayStore for Arc<T> {
    fn was_used(&self, key: PaymentHash) -> impl Future<Output = Result<bool, StoreError>> + Send {
        T::was_used(self, key)
    }

    fn mark_used(&self, key: PaymentHash) -> impl Future<Output = Result<(), StoreError>> + Send {
        T::mark_used(self, key)
    }

    fn try_claim(
        &self,
        key: PaymentHash,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        T::try_claim(self, key)
    }
}
