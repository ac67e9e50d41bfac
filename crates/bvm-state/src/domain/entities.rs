//! # World State Entities

use crate::errors::StateError;
use bvm_core::vm::Storage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CONTRACT ADDRESS
// =============================================================================

/// Maximum address length in bytes.
pub const MAX_ADDRESS_LEN: usize = 128;

/// Identifier of a contract account.
///
/// Addresses are opaque strings of ASCII letters, digits, `_`, `-` and `.`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Validate and wrap an address string.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidAddress` for empty, overlong or
    /// non-ASCII-identifier input.
    pub fn new(address: impl Into<String>) -> Result<Self, StateError> {
        let address = address.into();
        let valid = !address.is_empty()
            && address.len() <= MAX_ADDRESS_LEN
            && address
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));

        if valid {
            Ok(Self(address))
        } else {
            Err(StateError::InvalidAddress(address))
        }
    }

    /// Fresh random address (`0x` followed by 32 hex digits).
    #[must_use]
    pub fn random() -> Self {
        Self(format!("0x{}", Uuid::new_v4().simple()))
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContractAddress {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContractAddress {
    type Error = StateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractAddress> for String {
    fn from(address: ContractAddress) -> Self {
        address.0
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// A deployed contract: its bytecode and its persistent storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Contract bytecode (hex-encoded when serialized).
    #[serde(with = "hex_code")]
    pub code: Vec<u8>,
    /// Persistent storage.
    #[serde(default)]
    pub storage: Storage,
}

impl Account {
    /// New account with empty storage.
    #[must_use]
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            code,
            storage: Storage::new(),
        }
    }

    /// Code size in bytes.
    #[must_use]
    pub fn code_size(&self) -> usize {
        self.code.len()
    }
}

mod hex_code {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(code: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(code))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
