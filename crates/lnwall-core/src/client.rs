//! Payment-verification capability.

use std::sync::Arc;

use crate::{
    errors::ClientError,
    types::{Invoice, Sats},
};

/// A connection to a Lightning node that can issue invoices and report their settlement.
///
/// Implementations are shared by every request a paywall handles, so they must be safe to
/// call concurrently.
pub trait InvoiceClient: Send + Sync {
    /// Create a new invoice over `amount` satoshis with the given memo.
    ///
    /// Fails with [`ClientError::InvalidAmount`] when the amount cannot be charged and with
    /// [`ClientError::VerificationUnavailable`] when the node cannot be reached.
    fn create_invoice(
        &self,
        amount: Sats,
        memo: &str,
    ) -> impl Future<Output = Result<Invoice, ClientError>> + Send;

    /// Check whether the invoice paid with the given base64 preimage was settled.
    ///
    /// An existing but unpaid invoice yields `Ok(false)`. Fails with
    /// [`ClientError::ProofMalformed`] when the preimage does not decode,
    /// [`ClientError::ChargeNotFound`] when no invoice matches its hash, and
    /// [`ClientError::VerificationUnavailable`] on transport or credential failures.
    fn is_settled(&self, preimage: &str) -> impl Future<Output = Result<bool, ClientError>> + Send;
}

impl<T: InvoiceClient> InvoiceClient for Arc<T> {
    fn create_invoice(
        &self,
        amount: Sats,
        memo: &str,
    ) -> impl Future<Output = Result<Invoice, ClientError>> + Send {
        T::create_invoice(self, amount, memo)
    }

    fn is_settled(&self, preimage: &str) -> impl Future<Output = Result<bool, ClientError>> + Send {
        T::is_settled(self, preimage)
    }
}
