//! [`Sats`] represents an invoice amount in satoshis.
//!
//! This module holds its type definition and implementations.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An amount of satoshis.
///
/// Serialized as a decimal string, the way lnd encodes 64-bit integers in JSON.
/// Deserialization accepts both strings and plain numbers so amounts can be written
/// naturally in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sats(pub u64);

impl Sats {
    /// Whether this amount can be charged.
    ///
    /// Zero is not a valid invoice amount, and neither is anything beyond what lnd's
    /// signed 64-bit `value` field can carry.
    pub fn is_chargeable(&self) -> bool {
        self.0 > 0 && i64::try_from(self.0).is_ok()
    }
}

impl From<u8> for Sats {
    fn from(value: u8) -> Self {
        Sats(value as u64)
    }
}

impl From<u16> for Sats {
    fn from(value: u16) -> Self {
        Sats(value as u64)
    }
}

impl From<u32> for Sats {
    fn from(value: u32) -> Self {
        Sats(value as u64)
    }
}

impl From<u64> for Sats {
    fn from(value: u64) -> Self {
        Sats(value)
    }
}

impl Display for Sats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Sats {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Sats {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Sats(n)),
            Repr::Text(s) => s.parse::<u64>().map(Sats).map_err(serde::de::Error::custom),
        }
    }
}
