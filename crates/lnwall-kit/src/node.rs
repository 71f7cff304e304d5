//! An in-process Lightning node stand-in.
//!
//! [`MemoryNode`] issues invoices with freshly generated preimages and lets the caller play
//! the payer's role: [`pay`](MemoryNode::pay) settles an invoice and hands back the preimage
//! a real payer would learn. Useful for local development and tests where no lnd is running.

use std::{collections::HashMap, sync::Arc};

use lnwall_core::{
    client::InvoiceClient,
    errors::ClientError,
    types::{Invoice, PaymentHash, Preimage, Sats},
};
use parking_lot::Mutex;

/// Invoice prefix, followed by the amount, a `_` separator and the hex payment hash.
const INVOICE_PREFIX: &str = "lnmem";

#[derive(Debug, Clone)]
struct MemoryInvoice {
    preimage: Preimage,
    amount: Sats,
    memo: String,
    settled: bool,
}

/// Snapshot of an invoice held by a [`MemoryNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceStatus {
    pub hash: PaymentHash,
    pub amount: Sats,
    pub memo: String,
    pub settled: bool,
}

/// An [`InvoiceClient`] keeping its invoices in memory.
///
/// Clones share the same invoices.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    invoices: Arc<Mutex<HashMap<PaymentHash, MemoryInvoice>>>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the payment hash from an invoice issued by a `MemoryNode`.
    pub fn payment_hash(invoice: &Invoice) -> Option<PaymentHash> {
        let rest = invoice.as_str().strip_prefix(INVOICE_PREFIX)?;
        let (_amount, hash) = rest.split_once('_')?;
        PaymentHash::from_hex(hash).ok()
    }

    /// Settle the invoice and return its preimage, as a payer would receive it.
    ///
    /// Returns `None` for invoices this node did not issue.
    pub fn pay(&self, invoice: &Invoice) -> Option<Preimage> {
        let hash = Self::payment_hash(invoice)?;
        let mut invoices = self.invoices.lock();
        let entry = invoices.get_mut(&hash)?;
        entry.settled = true;

        #[cfg(feature = "tracing")]
        tracing::debug!("Settled in-memory invoice {hash}");

        Some(entry.preimage.clone())
    }

    /// Return the preimage of an invoice without settling it.
    pub fn preimage(&self, invoice: &Invoice) -> Option<Preimage> {
        let hash = Self::payment_hash(invoice)?;
        self.invoices.lock().get(&hash).map(|i| i.preimage.clone())
    }

    pub fn status(&self, invoice: &Invoice) -> Option<InvoiceStatus> {
        let hash = Self::payment_hash(invoice)?;
        self.invoices.lock().get(&hash).map(|i| InvoiceStatus {
            hash,
            amount: i.amount,
            memo: i.memo.clone(),
            settled: i.settled,
        })
    }

    /// Number of invoices issued so far.
    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().len()
    }
}

impl InvoiceClient for MemoryNode {
    async fn create_invoice(&self, amount: Sats, memo: &str) -> Result<Invoice, ClientError> {
        if !amount.is_chargeable() {
            return Err(ClientError::InvalidAmount(amount));
        }

        let preimage = Preimage::from_bytes(rand::random());
        let hash = preimage.payment_hash();
        self.invoices.lock().insert(
            hash,
            MemoryInvoice {
                preimage,
                amount,
                memo: memo.to_string(),
                settled: false,
            },
        );

        Ok(Invoice(format!("{INVOICE_PREFIX}{amount}_{hash}")))
    }

    async fn is_settled(&self, preimage: &str) -> Result<bool, ClientError> {
        let hash = preimage.parse::<Preimage>()?.payment_hash();
        self.invoices
            .lock()
            .get(&hash)
            .map(|i| i.settled)
            .ok_or(ClientError::ChargeNotFound(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invoice_lifecycle() {
        let node = MemoryNode::new();
        let invoice = node.create_invoice(Sats(100), "api-call").await.unwrap();
        assert!(invoice.as_str().starts_with("lnmem100_"));

        let preimage = node.preimage(&invoice).unwrap();
        assert!(!node.is_settled(&preimage.to_base64()).await.unwrap());

        let paid = node.pay(&invoice).unwrap();
        assert_eq!(paid, preimage);
        assert!(node.is_settled(&paid.to_base64()).await.unwrap());

        let status = node.status(&invoice).unwrap();
        assert_eq!(status.hash, preimage.payment_hash());
        assert_eq!(status.amount, Sats(100));
        assert_eq!(status.memo, "api-call");
        assert!(status.settled);
    }

    #[tokio::test]
    async fn test_invoices_are_fresh() {
        let node = MemoryNode::new();
        let a = node.create_invoice(Sats(1), "memo").await.unwrap();
        let b = node.create_invoice(Sats(1), "memo").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(node.invoice_count(), 2);
    }

    #[tokio::test]
    async fn test_errors() {
        let node = MemoryNode::new();

        assert!(matches!(
            node.create_invoice(Sats(0), "free").await,
            Err(ClientError::InvalidAmount(_))
        ));
        assert!(matches!(
            node.is_settled("???").await,
            Err(ClientError::ProofMalformed(_))
        ));

        let unknown = Preimage::from_bytes([8u8; 32]);
        match node.is_settled(&unknown.to_base64()).await {
            Err(ClientError::ChargeNotFound(hash)) => assert_eq!(hash, unknown.payment_hash()),
            other => panic!("expected ChargeNotFound, got {other:?}"),
        }

        assert!(node.pay(&Invoice::from("lnbc1xyz")).is_none());
    }
}
