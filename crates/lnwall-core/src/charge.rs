use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::types::Sats;

/// Amount charged when none is configured.
pub const DEFAULT_AMOUNT: Sats = Sats(1);

/// Memo used when none is configured.
pub const DEFAULT_MEMO: &str = "API call";

/// What a protected resource costs.
///
/// Every invoice issued for the resource carries this amount and memo.
///
/// ```
/// use lnwall_core::{charge::ChargeConfig, types::Sats};
///
/// let charge = ChargeConfig::builder().amount(100u64).memo("api-call").build();
/// assert_eq!(charge.amount, Sats(100));
///
/// let defaults = ChargeConfig::default();
/// assert_eq!(defaults.amount, Sats(1));
/// assert_eq!(defaults.memo, "API call");
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeConfig {
    /// Invoice amount in satoshis.
    #[builder(into, default = DEFAULT_AMOUNT)]
    #[serde(default = "default_amount")]
    pub amount: Sats,
    /// Human-readable invoice memo.
    #[builder(into, default = DEFAULT_MEMO.to_string())]
    #[serde(default = "default_memo")]
    pub memo: String,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        ChargeConfig::builder().build()
    }
}

fn default_amount() -> Sats {
    DEFAULT_AMOUNT
}

fn default_memo() -> String {
    DEFAULT_MEMO.to_string()
}
