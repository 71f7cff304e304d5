//! Terminal outcomes of the authorization procedure.

use std::fmt::Display;

use lnwall_core::types::{Invoice, PaymentHash, Sats};
use serde::{Deserialize, Serialize};

/// The decision taken for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The preimage was settled and had not been used; forward the request.
    Authorized(PaymentReceipt),
    /// No preimage was presented; the caller has to pay the enclosed invoice first.
    ChallengeRequired(Challenge),
    /// The caller presented an unusable preimage.
    Rejected(RejectReason),
    /// A collaborator failed. Details were logged; callers only learn that something broke.
    ServiceError(ServiceFault),
}

impl Outcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Outcome::Authorized(_))
    }

    pub fn as_rejected(&self) -> Option<RejectReason> {
        match self {
            Outcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn as_challenge(&self) -> Option<&Challenge> {
        match self {
            Outcome::ChallengeRequired(challenge) => Some(challenge),
            _ => None,
        }
    }
}

/// Attached to the request extensions of every authorized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Hash of the preimage that paid for this request.
    pub payment_hash: PaymentHash,
}

/// A freshly issued invoice the caller has to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub invoice: Invoice,
    pub amount: Sats,
    pub memo: String,
}

/// Why a presented preimage was refused.
///
/// Each reason is a different caller mistake: garbage input, a preimage for an invoice the
/// node never issued, one that is not paid yet, or one that was already spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MalformedProof,
    UnknownCharge,
    AlreadyUsed,
    NotSettled,
}

impl RejectReason {
    /// Stable machine-readable code, as serialized in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MalformedProof => "malformed_proof",
            RejectReason::UnknownCharge => "unknown_charge",
            RejectReason::AlreadyUsed => "already_used",
            RejectReason::NotSettled => "not_settled",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MalformedProof => "The provided preimage is not a valid base64 encoded 32 byte value",
            RejectReason::UnknownCharge => "No invoice was found for the provided preimage",
            RejectReason::AlreadyUsed => "The provided preimage was already used",
            RejectReason::NotSettled => "The invoice for the provided preimage has not been settled",
        }
    }
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFault {
    /// The configured charge cannot be invoiced.
    InvalidAmount,
    /// The Lightning node failed, rejected our credentials or timed out.
    VerificationUnavailable,
    /// The replay store failed or timed out.
    StorageUnavailable,
}

impl Display for ServiceFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceFault::InvalidAmount => write!(f, "invalid amount"),
            ServiceFault::VerificationUnavailable => write!(f, "verification unavailable"),
            ServiceFault::StorageUnavailable => write!(f, "storage unavailable"),
        }
    }
}
