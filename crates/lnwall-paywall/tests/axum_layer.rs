#![cfg(feature = "axum")]

use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
    routing::get,
};
use lnwall_core::{charge::ChargeConfig, types::Preimage};
use lnwall_kit::{node::MemoryNode, store::MemoryStore};
use lnwall_paywall::{
    errors::{PAYMENT_REQUEST_HEADER, SERVER_ERROR_MESSAGE},
    outcome::PaymentReceipt,
    paywall::{PREIMAGE_HEADER, PayWall},
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn resource(Extension(receipt): Extension<PaymentReceipt>) -> String {
    receipt.payment_hash.to_hex()
}

fn app(node: MemoryNode, amount: u64) -> Router {
    let paywall = PayWall::builder()
        .client(node)
        .store(MemoryStore::new())
        .charge(ChargeConfig::builder().amount(amount).memo("api-call").build())
        .build();

    Router::new()
        .route("/resource", get(resource))
        .layer(paywall)
}

async fn send(app: &Router, preimage: Option<&str>) -> Response {
    let mut request = Request::builder().uri("/resource");
    if let Some(preimage) = preimage {
        request = request.header(PREIMAGE_HEADER, preimage);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_pay_then_access() {
    let node = MemoryNode::new();
    let app = app(node.clone(), 100);

    let response = send(&app, None).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let header = response
        .headers()
        .get(PAYMENT_REQUEST_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = json_body(response).await;
    assert_eq!(body["paymentRequest"], json!(header));
    assert_eq!(body["amount"], json!("100"));
    assert_eq!(body["memo"], json!("api-call"));

    let preimage = node.pay(&header.as_str().into()).unwrap();
    let proof = preimage.to_base64();

    let response = send(&app, Some(&proof)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], preimage.payment_hash().to_hex().as_bytes());

    let response = send(&app, Some(&proof)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], json!("already_used"));
}

#[tokio::test]
async fn test_rejections() {
    let app = app(MemoryNode::new(), 100);

    let response = send(&app, Some("definitely not a preimage")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], json!("malformed_proof"));

    let stranger = Preimage::from_bytes([3u8; 32]).to_base64();
    let response = send(&app, Some(&stranger)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["reason"], json!("unknown_charge"));
}

#[tokio::test]
async fn test_misconfigured_charge() {
    let app = app(MemoryNode::new(), 0);

    let response = send(&app, None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": SERVER_ERROR_MESSAGE })
    );
}
