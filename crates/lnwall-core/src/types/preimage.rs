//! Preimages and the payment hashes derived from them.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use base64::{Engine, prelude::BASE64_STANDARD};
use sha2::{Digest, Sha256};

use crate::errors::ProofError;

/// Length of a Lightning payment preimage in bytes.
pub const PREIMAGE_LEN: usize = 32;

/// The secret revealed to the payer once an invoice is settled.
///
/// Callers present it as a standard base64 string. Parsing validates both the encoding and
/// the decoded length, so a `Preimage` value is always well formed.
///
/// ```
/// use lnwall_core::types::Preimage;
///
/// let preimage: Preimage = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".parse().unwrap();
/// assert_eq!(preimage.as_bytes(), &[0u8; 32]);
///
/// assert!("not base64!".parse::<Preimage>().is_err());
/// assert!("AAAA".parse::<Preimage>().is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Preimage([u8; PREIMAGE_LEN]);

impl Preimage {
    pub fn from_bytes(bytes: [u8; PREIMAGE_LEN]) -> Self {
        Preimage(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PREIMAGE_LEN] {
        &self.0
    }

    /// Derive the payment hash, i.e. the SHA-256 digest of the preimage bytes.
    pub fn payment_hash(&self) -> PaymentHash {
        PaymentHash(Sha256::digest(self.0).into())
    }

    /// Encode the preimage the way callers are expected to present it.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }
}

impl FromStr for Preimage {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = BASE64_STANDARD.decode(s)?;
        let bytes: [u8; PREIMAGE_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| ProofError::InvalidLength(decoded.len()))?;
        Ok(Preimage(bytes))
    }
}

// Never print the secret itself.
impl Debug for Preimage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preimage({})", self.payment_hash())
    }
}

/// SHA-256 digest of a [`Preimage`].
///
/// Identifies an invoice on the node and doubles as the replay-prevention key.
/// Displayed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentHash(pub [u8; 32]);

impl PaymentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(PaymentHash(bytes))
    }
}

impl Display for PaymentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<&Preimage> for PaymentHash {
    fn from(preimage: &Preimage) -> Self {
        preimage.payment_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_hash_is_sha256_of_bytes() {
        let preimage = Preimage::from_bytes([0u8; 32]);
        // sha256 of 32 zero bytes
        assert_eq!(
            preimage.payment_hash().to_hex(),
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
    }

    #[test]
    fn test_payment_hash_from_preimage() {
        let preimage = Preimage::from_bytes([4u8; 32]);
        let hash = PaymentHash::from(&preimage);
        assert_eq!(hash, preimage.payment_hash());

        let digest: [u8; 32] = Sha256::digest(preimage.as_bytes()).into();
        assert_eq!(hash.as_bytes(), &digest);
    }

    #[test]
    fn test_parse_roundtrip_keeps_hash() {
        let preimage = Preimage::from_bytes([7u8; 32]);
        let parsed: Preimage = preimage.to_base64().parse().unwrap();
        assert_eq!(parsed, preimage);
        assert_eq!(parsed.payment_hash(), preimage.payment_hash());
    }

    #[test]
    fn test_distinct_preimages_distinct_hashes() {
        let a = Preimage::from_bytes([1u8; 32]).payment_hash();
        let b = Preimage::from_bytes([2u8; 32]).payment_hash();
        assert_ne!(a, b);
    }

    #[test]
    fn test_reject_bad_encoding_and_length() {
        assert!(matches!(
            "%%%".parse::<Preimage>(),
            Err(ProofError::Base64(_))
        ));
        assert!(matches!(
            BASE64_STANDARD.encode([1u8; 16]).parse::<Preimage>(),
            Err(ProofError::InvalidLength(16))
        ));
        assert!(matches!(
            "".parse::<Preimage>(),
            Err(ProofError::InvalidLength(0))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let preimage = Preimage::from_bytes([9u8; 32]);
        let debug = format!("{preimage:?}");
        assert!(!debug.contains(&hex::encode([9u8; 32])));
        assert!(debug.contains(&preimage.payment_hash().to_hex()));
    }

    #[test]
    fn test_payment_hash_hex_roundtrip() {
        let hash = Preimage::from_bytes([3u8; 32]).payment_hash();
        assert_eq!(PaymentHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(PaymentHash::from_hex("abcd").is_err());
    }
}
