//! HTTP paywall gated by Lightning payments.
//!
//! For details, see the [`PayWall`] struct documentation.

use std::time::Duration;

use bon::Builder;
use http::{HeaderMap, HeaderName, Request, Response};
use lnwall_core::{
    charge::ChargeConfig,
    client::InvoiceClient,
    errors::{ClientError, StoreError},
    store::ReplayStore,
    types::{PaymentHash, Preimage},
};

use crate::{
    errors::ErrorResponse,
    outcome::{Challenge, Outcome, PaymentReceipt, RejectReason, ServiceFault},
};

/// Header carrying the caller's base64 preimage.
pub const PREIMAGE_HEADER: &str = "x-preimage";

/// A HTTP paywall that charges a Lightning invoice per request.
///
/// ## Type Parameters
///
/// - `C`: the [`InvoiceClient`] issuing and checking invoices.
/// - `S`: the [`ReplayStore`] remembering spent preimages.
///
/// Both are shared by every request the paywall handles. Construct them once and pass them
/// in by value; wrap them in an `Arc` to share one instance between several paywalls.
///
/// ## Decision Procedure
///
/// [`authorize`](PayWall::authorize) takes the preimage presented with a request, if any:
///
/// 1. **No preimage**: issue a new invoice for [`charge`](PayWall::charge) and challenge.
/// 2. **Decode**: a preimage that is not base64 of 32 bytes is rejected as malformed.
/// 3. **Replay check**: a preimage already spent is rejected without contacting the node.
/// 4. **Settlement**: ask the node whether the matching invoice was settled.
/// 5. **Claim**: atomically record the payment hash as spent, then authorize. If another
///    request claimed it first, this one is rejected as already used.
///
/// [`handle_payment`](PayWall::handle_payment) wraps this procedure for `http` requests.
#[derive(Builder, Debug, Clone)]
pub struct PayWall<C: InvoiceClient, S: ReplayStore> {
    /// The node client used to create and verify invoices.
    pub client: C,
    /// The store used to prevent preimage reuse.
    pub store: S,
    /// What each request costs.
    #[builder(default)]
    pub charge: ChargeConfig,
    /// Paywall behavior configuration.
    #[builder(default)]
    pub config: PayWallConfig,
}

/// Paywall configuration options.
#[derive(Builder, Debug, Clone)]
pub struct PayWallConfig {
    /// Request header the preimage is read from.
    #[builder(default = HeaderName::from_static(PREIMAGE_HEADER))]
    pub preimage_header: HeaderName,
    /// Upper bound for each individual call to the node or the store.
    ///
    /// An expired call counts as the collaborator being unavailable.
    pub call_timeout: Option<Duration>,
}

impl Default for PayWallConfig {
    fn default() -> Self {
        PayWallConfig::builder().build()
    }
}

impl<C: InvoiceClient, S: ReplayStore> PayWall<C, S> {
    /// Decide what to do with a request presenting `preimage`.
    pub async fn authorize(&self, preimage: Option<&str>) -> Outcome {
        let Some(encoded) = preimage else {
            return self.challenge().await;
        };

        let hash = match encoded.parse::<Preimage>() {
            Ok(preimage) => preimage.payment_hash(),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Rejecting malformed preimage: {err}");
                #[cfg(not(feature = "tracing"))]
                let _ = err;

                return Outcome::Rejected(RejectReason::MalformedProof);
            }
        };

        match self.store_call(self.store.was_used(hash)).await {
            Ok(false) => {}
            Ok(true) => return self.reject(hash, RejectReason::AlreadyUsed),
            Err(err) => return self.store_fault(hash, err),
        }

        match self.client_call(self.client.is_settled(encoded)).await {
            Ok(true) => {}
            Ok(false) => return self.reject(hash, RejectReason::NotSettled),
            Err(ClientError::ProofMalformed(_)) => {
                return self.reject(hash, RejectReason::MalformedProof);
            }
            Err(ClientError::ChargeNotFound(_)) => {
                return self.reject(hash, RejectReason::UnknownCharge);
            }
            Err(err) => return self.client_fault(err),
        }

        // Claim atomically: a concurrent request with the same preimage may have passed the
        // replay check above as well.
        match self.store_call(self.store.try_claim(hash)).await {
            Ok(false) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Payment verified and claimed: payment_hash='{hash}'");

                Outcome::Authorized(PaymentReceipt { payment_hash: hash })
            }
            Ok(true) => self.reject(hash, RejectReason::AlreadyUsed),
            Err(err) => self.store_fault(hash, err),
        }
    }

    /// Issue a fresh invoice for the configured charge.
    pub async fn challenge(&self) -> Outcome {
        let created = self
            .client_call(
                self.client
                    .create_invoice(self.charge.amount, &self.charge.memo),
            )
            .await;

        match created {
            Ok(invoice) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Issued invoice for amount={}", self.charge.amount);

                Outcome::ChallengeRequired(Challenge {
                    invoice,
                    amount: self.charge.amount,
                    memo: self.charge.memo.clone(),
                })
            }
            Err(err) => self.client_fault(err),
        }
    }

    /// Standard payment handling flow.
    ///
    /// Reads the preimage header, runs [`authorize`](PayWall::authorize) and, if the request is
    /// authorized, runs `handler` with a [`PaymentReceipt`] inserted into the request
    /// extensions. Any other outcome becomes an [`ErrorResponse`].
    pub async fn handle_payment<Fun, Fut, Req, Res>(
        &self,
        mut request: Request<Req>,
        handler: Fun,
    ) -> Result<Response<Res>, ErrorResponse>
    where
        Fun: FnOnce(Request<Req>) -> Fut,
        Fut: Future<Output = Response<Res>>,
    {
        let outcome = match self.extract_preimage(request.headers()) {
            Ok(preimage) => self.authorize(preimage.as_deref()).await,
            Err(reason) => Outcome::Rejected(reason),
        };

        let receipt = outcome_to_result(outcome)?;
        request.extensions_mut().insert(receipt);

        Ok(handler(request).await)
    }

    /// Read the preimage header. A blank header counts as absent.
    pub fn extract_preimage(&self, headers: &HeaderMap) -> Result<Option<String>, RejectReason> {
        let Some(value) = headers.get(&self.config.preimage_header) else {
            return Ok(None);
        };

        let value = value
            .to_str()
            .map_err(|_| RejectReason::MalformedProof)?
            .trim();

        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }

    async fn client_call<T>(
        &self,
        call: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|elapsed| Err(ClientError::unavailable(elapsed))),
            None => call.await,
        }
    }

    async fn store_call<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|elapsed| Err(StoreError::unavailable(elapsed))),
            None => call.await,
        }
    }

    fn reject(&self, hash: PaymentHash, reason: RejectReason) -> Outcome {
        #[cfg(feature = "tracing")]
        tracing::debug!("Rejecting payment: payment_hash='{hash}', reason='{reason}'");
        #[cfg(not(feature = "tracing"))]
        let _ = hash;

        Outcome::Rejected(reason)
    }

    fn client_fault(&self, err: ClientError) -> Outcome {
        #[cfg(feature = "tracing")]
        tracing::error!("Invoice client failed: {err}");

        match err {
            ClientError::InvalidAmount(_) => Outcome::ServiceError(ServiceFault::InvalidAmount),
            _ => Outcome::ServiceError(ServiceFault::VerificationUnavailable),
        }
    }

    fn store_fault(&self, hash: PaymentHash, err: StoreError) -> Outcome {
        #[cfg(feature = "tracing")]
        tracing::error!("Replay store failed: payment_hash='{hash}': {err}");
        #[cfg(not(feature = "tracing"))]
        let _ = (hash, err);

        Outcome::ServiceError(ServiceFault::StorageUnavailable)
    }
}

/// Map an [`Outcome`] to the receipt of an authorized request or the response to send instead.
pub fn outcome_to_result(outcome: Outcome) -> Result<PaymentReceipt, ErrorResponse> {
    match outcome {
        Outcome::Authorized(receipt) => Ok(receipt),
        Outcome::ChallengeRequired(challenge) => Err(ErrorResponse::payment_required(challenge)),
        Outcome::Rejected(reason) => Err(ErrorResponse::rejected(reason)),
        Outcome::ServiceError(fault) => Err(ErrorResponse::server_error(fault)),
    }
}
