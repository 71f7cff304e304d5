use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An encoded payment request (e.g. a BOLT-11 string) returned by the node.
///
/// The paywall never looks inside it; it is handed to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invoice(pub String);

impl Invoice {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Invoice {
    fn from(value: String) -> Self {
        Invoice(value)
    }
}

impl From<&str> for Invoice {
    fn from(value: &str) -> Self {
        Invoice(value.to_string())
    }
}

impl Serialize for Invoice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Invoice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Invoice(s))
    }
}

impl Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
