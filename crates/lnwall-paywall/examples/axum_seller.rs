use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::get,
};
use lnwall_core::charge::ChargeConfig;
use lnwall_kit::{
    lnd::{LndClient, LndOptions},
    store::MemoryStore,
};
use lnwall_paywall::{outcome::PaymentReceipt, paywall::PayWall};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct PayWallState {
    client: LndClient,
    store: MemoryStore,
}

// Per-route pricing through a middleware function.
async fn premium_paywall(State(state): State<PayWallState>, req: Request, next: Next) -> Response {
    PayWall::builder()
        .client(state.client)
        .store(state.store)
        .charge(ChargeConfig::builder().amount(1000u64).memo("premium").build())
        .build()
        .handle_payment(req, |req| next.run(req))
        .await
        .unwrap_or_else(|err| err.into_response())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let options = LndOptions::builder()
        .address(std::env::var("LND_ADDRESS").unwrap_or_else(|_| "localhost:8080".to_string()))
        .cert_file(std::env::var("LND_CERT").unwrap_or_else(|_| "tls.cert".to_string()))
        .macaroon_file(
            std::env::var("LND_MACAROON").unwrap_or_else(|_| "invoice.macaroon".to_string()),
        )
        .timeout_secs(10)
        .build();
    tracing::info!("Using lnd at {}", options.address);

    let client = LndClient::new(options).expect("Failed to load lnd credentials");
    let store = MemoryStore::new();

    let paywall = PayWall::builder()
        .client(client.clone())
        .store(store.clone())
        .charge(ChargeConfig::builder().amount(100u64).memo("api-call").build())
        .build();
    let state = PayWallState { client, store };

    let app = Router::new()
        .route("/resource", get(example_handler).layer(paywall))
        .route(
            "/premium",
            get(example_handler).layer(from_fn_with_state(state, premium_paywall)),
        )
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid u16 integer");
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server failed");
}

async fn example_handler(Extension(receipt): Extension<PaymentReceipt>) -> Json<Value> {
    Json(json!({
        "message": "You have accessed a protected resource!",
        "paymentHash": receipt.payment_hash.to_hex(),
    }))
}
