//! # lnwall paywall
//!
//! A framework-agnostic HTTP paywall charging a Lightning invoice per request.
//!
//! A caller without proof of payment receives a `402 Payment Required` carrying a fresh
//! invoice. After paying it, the caller learns the invoice's preimage and repeats the request
//! with the base64 preimage in the `X-Preimage` header. The paywall checks with the node that
//! the matching invoice was settled, records the preimage as spent and forwards the request.
//! Each preimage is accepted exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use lnwall_core::charge::ChargeConfig;
//! use lnwall_kit::{node::MemoryNode, store::MemoryStore};
//! use lnwall_paywall::paywall::PayWall;
//!
//! let paywall = PayWall::builder()
//!     .client(MemoryNode::new())
//!     .store(MemoryStore::new())
//!     .charge(ChargeConfig::builder().amount(100u64).memo("api-call").build())
//!     .build();
//! ```
//!
//! With a real node, use [`LndClient`](https://docs.rs/lnwall-kit) instead of `MemoryNode`.
//!
//! ## Modules
//!
//! - [`paywall`]: The main [`PayWall`](paywall::PayWall) struct and the decision procedure.
//! - [`outcome`]: The [`Outcome`](outcome::Outcome) of authorizing a request.
//! - [`errors`]: HTTP error responses.
//!
//! ## Framework Integration
//!
//! [`PayWall::handle_payment`](paywall::PayWall::handle_payment) works with any framework built
//! on the `http` crate. With the `axum` feature, a `PayWall` is also a `tower::Layer`:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(paywall);
//! ```
//!
//! Frameworks with their own request types can call
//! [`PayWall::authorize`](paywall::PayWall::authorize) directly and map the outcome themselves.
//!
//! ## Error Handling
//!
//! [`ErrorResponse`](errors::ErrorResponse) implements `IntoResponse` for Axum and converts into
//! `http::Response<Full<Bytes>>`. It returns:
//!
//! - `402 Payment Required`: No preimage provided; the body carries the invoice.
//! - `400 Bad Request`: Malformed, unknown, unsettled or already used preimage. The `reason`
//!   field of the body tells them apart.
//! - `500 Internal Server Error`: The node or the replay store failed.

#[cfg(feature = "axum")]
pub mod axum;
pub mod errors;
pub mod outcome;
pub mod paywall;
