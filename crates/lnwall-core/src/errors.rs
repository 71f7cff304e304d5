//! Error kinds reported by the paywall capabilities.

use crate::types::{PaymentHash, Sats};

/// Boxed source error of an unavailable collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A preimage could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The preimage is not valid standard base64.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The preimage decoded to the wrong number of bytes.
    #[error("Invalid preimage length {0}; expected 32 bytes")]
    InvalidLength(usize),
}

/// Errors returned by an [`InvoiceClient`](crate::client::InvoiceClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The presented preimage could not be decoded.
    #[error("Malformed preimage: {0}")]
    ProofMalformed(#[from] ProofError),

    /// The node has no invoice for the given payment hash.
    #[error("No invoice found for payment hash {0}")]
    ChargeNotFound(PaymentHash),

    /// The requested invoice amount cannot be charged.
    #[error("Invalid invoice amount {0}")]
    InvalidAmount(Sats),

    /// The node could not be reached, rejected our credentials, or timed out.
    #[error("Invoice verification unavailable: {0}")]
    VerificationUnavailable(BoxError),
}

impl ClientError {
    pub fn unavailable(err: impl Into<BoxError>) -> Self {
        ClientError::VerificationUnavailable(err.into())
    }
}

/// Errors returned by a [`ReplayStore`](crate::store::ReplayStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed or timed out.
    #[error("Replay store unavailable: {0}")]
    StorageUnavailable(BoxError),
}

impl StoreError {
    pub fn unavailable(err: impl Into<BoxError>) -> Self {
        StoreError::StorageUnavailable(err.into())
    }
}
