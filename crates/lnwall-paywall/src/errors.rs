use bytes::Bytes;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use lnwall_core::types::{Invoice, Sats};
use serde::{Deserialize, Serialize};

use crate::outcome::{Challenge, RejectReason, ServiceFault};

/// Header carrying the invoice of a `402 Payment Required` response.
pub const PAYMENT_REQUEST_HEADER: &str = "x-payment-request";

/// Message returned with every `500 Internal Server Error`.
pub const SERVER_ERROR_MESSAGE: &str = "An internal error occurred while processing the payment";

/// Represents an error response from the paywall.
///
/// Every caller-fault rejection shares `400 Bad Request`; the `reason` field of the body
/// tells them apart.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub header: Option<ErrorResponseHeader>,
    pub body: ErrorBody,
}

/// JSON body of a paywall error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
    /// Machine-readable rejection code, only set for `400` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    /// Invoice to pay, only set for `402` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<Invoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Sats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Represents the type of error header to include in a paywall error response.
#[derive(Debug, Clone)]
pub enum ErrorResponseHeader {
    PaymentRequest(Invoice),
}

impl ErrorResponseHeader {
    /// Get the header value to include in the response.
    ///
    /// Returns `None` if the header value could not be created.
    pub fn header_value(self) -> Option<(HeaderName, HeaderValue)> {
        match self {
            ErrorResponseHeader::PaymentRequest(Invoice(s)) => HeaderValue::from_str(&s)
                .ok()
                .map(|v| (HeaderName::from_static(PAYMENT_REQUEST_HEADER), v)),
        }
    }
}

impl ErrorResponse {
    /// `402 Payment Required` carrying a fresh invoice.
    pub fn payment_required(challenge: Challenge) -> Self {
        ErrorResponse {
            status: StatusCode::PAYMENT_REQUIRED,
            header: Some(ErrorResponseHeader::PaymentRequest(challenge.invoice.clone())),
            body: ErrorBody {
                error: "Payment required".to_string(),
                reason: None,
                payment_request: Some(challenge.invoice),
                amount: Some(challenge.amount),
                memo: Some(challenge.memo),
            },
        }
    }

    /// `400 Bad Request` for an unusable preimage.
    pub fn rejected(reason: RejectReason) -> Self {
        ErrorResponse {
            status: StatusCode::BAD_REQUEST,
            header: None,
            body: ErrorBody {
                error: reason.message().to_string(),
                reason: Some(reason),
                payment_request: None,
                amount: None,
                memo: None,
            },
        }
    }

    /// `500 Internal Server Error`. The fault kind is deliberately not exposed.
    pub fn server_error(_fault: ServiceFault) -> Self {
        ErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            header: None,
            body: ErrorBody {
                error: SERVER_ERROR_MESSAGE.to_string(),
                reason: None,
                payment_request: None,
                amount: None,
                memo: None,
            },
        }
    }
}

impl From<ErrorResponse> for Response<Full<Bytes>> {
    fn from(value: ErrorResponse) -> Self {
        let body = match serde_json::to_vec(&value.body) {
            Ok(b) => b,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to serialize ErrorResponse body to JSON bytes: {err}");
                #[cfg(not(feature = "tracing"))]
                let _ = err;

                let mut response = Response::new(Full::new(Bytes::from_static(
                    b"Failed to serialize ErrorResponse body to JSON bytes",
                )));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

                return response;
            }
        };

        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = value.status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some((name, val)) = value.header.and_then(ErrorResponseHeader::header_value) {
            response.headers_mut().insert(name, val);
        }
        response
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status, axum::extract::Json(self.body)).into_response();
        if let Some((name, val)) = self.header.and_then(ErrorResponseHeader::header_value) {
            response.headers_mut().insert(name, val);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejection_body() {
        let response = ErrorResponse::rejected(RejectReason::AlreadyUsed);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&response.body).unwrap(),
            json!({
                "error": "The provided preimage was already used",
                "reason": "already_used"
            })
        );
    }

    #[test]
    fn test_server_error_hides_fault() {
        let storage = ErrorResponse::server_error(ServiceFault::StorageUnavailable);
        let node = ErrorResponse::server_error(ServiceFault::VerificationUnavailable);
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.body, node.body);
        assert_eq!(
            serde_json::to_value(&storage.body).unwrap(),
            json!({ "error": SERVER_ERROR_MESSAGE })
        );
    }

    #[tokio::test]
    async fn test_into_http_response() {
        let response: Response<Full<Bytes>> = ErrorResponse::payment_required(Challenge {
            invoice: Invoice::from("lnbc100n1example"),
            amount: Sats(100),
            memo: "api-call".to_string(),
        })
        .into();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            response.headers().get(PAYMENT_REQUEST_HEADER).unwrap(),
            "lnbc100n1example"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "error": "Payment required",
                "paymentRequest": "lnbc100n1example",
                "amount": "100",
                "memo": "api-call"
            })
        );
    }
}
