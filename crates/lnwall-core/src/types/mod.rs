//! Core types used across the paywall crates.

mod amount;
mod invoice;
mod preimage;

pub use amount::*;
pub use invoice::*;
pub use preimage::*;
