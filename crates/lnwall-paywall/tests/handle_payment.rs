use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use lnwall_core::{charge::ChargeConfig, types::Preimage};
use lnwall_kit::{node::MemoryNode, store::MemoryStore};
use lnwall_paywall::{
    errors::PAYMENT_REQUEST_HEADER,
    outcome::{PaymentReceipt, RejectReason},
    paywall::{PREIMAGE_HEADER, PayWall, PayWallConfig},
};

fn setup() -> (MemoryNode, PayWall<MemoryNode, MemoryStore>) {
    let node = MemoryNode::new();
    let paywall = PayWall::builder()
        .client(node.clone())
        .store(MemoryStore::new())
        .charge(ChargeConfig::builder().amount(100u64).memo("api-call").build())
        .build();
    (node, paywall)
}

fn request(preimage: Option<&str>) -> Request<()> {
    let mut builder = Request::builder().uri("/resource");
    if let Some(preimage) = preimage {
        builder = builder.header(PREIMAGE_HEADER, preimage);
    }
    builder.body(()).unwrap()
}

async fn echo_receipt(request: Request<()>) -> Response<String> {
    let receipt = request
        .extensions()
        .get::<PaymentReceipt>()
        .expect("authorized requests carry a receipt");
    Response::new(receipt.payment_hash.to_hex())
}

#[tokio::test]
async fn test_handle_payment_flow() {
    let (node, paywall) = setup();

    let err = paywall
        .handle_payment(request(None), echo_receipt)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
    let invoice = err.body.payment_request.clone().unwrap();

    let response: Response<http_body_util::Full<bytes::Bytes>> = err.into();
    assert_eq!(
        response.headers().get(PAYMENT_REQUEST_HEADER).unwrap(),
        invoice.as_str()
    );

    let preimage = node.pay(&invoice).unwrap();
    let proof = preimage.to_base64();

    let response = paywall
        .handle_payment(request(Some(&proof)), echo_receipt)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), &preimage.payment_hash().to_hex());

    let err = paywall
        .handle_payment(request(Some(&proof)), echo_receipt)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.body.reason, Some(RejectReason::AlreadyUsed));
}

#[tokio::test]
async fn test_handler_not_run_without_payment() {
    let (_, paywall) = setup();
    let mut ran = false;

    let result = paywall
        .handle_payment(request(Some("garbage")), |_| {
            ran = true;
            async { Response::new(String::new()) }
        })
        .await;

    assert_eq!(result.unwrap_err().body.reason, Some(RejectReason::MalformedProof));
    assert!(!ran);
}

#[test]
fn test_extract_preimage() {
    let (_, paywall) = setup();
    let mut headers = HeaderMap::new();
    assert_eq!(paywall.extract_preimage(&headers), Ok(None));

    headers.insert(PREIMAGE_HEADER, HeaderValue::from_static("   "));
    assert_eq!(paywall.extract_preimage(&headers), Ok(None));

    headers.insert(PREIMAGE_HEADER, HeaderValue::from_static(" AAAA "));
    assert_eq!(paywall.extract_preimage(&headers), Ok(Some("AAAA".to_string())));

    headers.insert(PREIMAGE_HEADER, HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());
    assert_eq!(
        paywall.extract_preimage(&headers),
        Err(RejectReason::MalformedProof)
    );
}

#[tokio::test]
async fn test_custom_preimage_header() {
    let node = MemoryNode::new();
    let paywall = PayWall::builder()
        .client(node.clone())
        .store(MemoryStore::new())
        .config(
            PayWallConfig::builder()
                .preimage_header(http::HeaderName::from_static("x-proof"))
                .build(),
        )
        .build();

    let invoice = paywall.challenge().await.as_challenge().unwrap().invoice.clone();
    let proof = node.pay(&invoice).unwrap().to_base64();

    // The default header is ignored once another one is configured.
    let err = paywall
        .handle_payment(request(Some(&proof)), echo_receipt)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);

    let request = Request::builder()
        .header("x-proof", proof.as_str())
        .body(())
        .unwrap();
    let response = paywall.handle_payment(request, echo_receipt).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_all_rejections_share_bad_request() {
    let (node, paywall) = setup();

    let unpaid = paywall.challenge().await.as_challenge().unwrap().invoice.clone();
    let unpaid = node.preimage(&unpaid).unwrap().to_base64();
    let stranger = Preimage::from_bytes([9u8; 32]).to_base64();

    let cases = [
        ("garbage", RejectReason::MalformedProof),
        (stranger.as_str(), RejectReason::UnknownCharge),
        (unpaid.as_str(), RejectReason::NotSettled),
    ];
    for (proof, reason) in cases {
        let err = paywall
            .handle_payment(request(Some(proof)), echo_receipt)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST, "{reason}");
        assert_eq!(err.body.reason, Some(reason));
        assert!(err.header.is_none());
    }
}
