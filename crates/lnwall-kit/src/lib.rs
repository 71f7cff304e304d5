//! # lnwall kit
//!
//! Ready-made collaborators for an lnwall paywall:
//!
//! - **[`lnd`]**: an [`InvoiceClient`](lnwall_core::client::InvoiceClient) talking to an lnd
//!   node over its REST interface (feature `lnd-client`).
//! - **[`store`]**: an in-process [`ReplayStore`](lnwall_core::store::ReplayStore).
//! - **[`node`]**: an in-process stand-in for a Lightning node, for local development and tests.

#[cfg(feature = "lnd-client")]
pub mod lnd;
pub mod node;
pub mod store;
