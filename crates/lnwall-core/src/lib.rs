//! Lightning paywall core library.
//!
//! This library provides the data model shared by every paywall component and the two
//! capabilities a paywall is built on:
//!
//! - [`client::InvoiceClient`]: creates invoices and checks whether they were settled.
//! - [`store::ReplayStore`]: remembers which preimages were already spent.
//!
//! Concrete implementations live in `lnwall-kit`; the decision procedure that ties them
//! together lives in `lnwall-paywall`.

pub mod charge;
pub mod client;
pub mod errors;
pub mod store;
pub mod types;
