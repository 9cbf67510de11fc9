//! Common value types shared across the recipe engine
//!
//! Identities, token references and result values are fixed-width byte
//! newtypes so they can flow through the output buffer and the parameter
//! resolver without loss.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription identifier
pub type SubId = u64;

/// Index of the strategy variant a subscription was registered under
pub type StrategyIndex = u64;

/// Token amount in base units (wei-style integer)
pub type TokenAmount = u128;

/// Execution identity or token reference (20 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Self = Self([0_u8; 20]);

    /// Parse from a hex string, with or without a `0x` prefix
    ///
    /// # Errors
    ///
    /// Returns error if the string is not 40 hex characters
    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 40 {
            return Err(AddressParseError::Length { got: s.len() });
        }
        let raw = hex::decode(s).map_err(|_| AddressParseError::InvalidHex)?;
        let mut bytes = [0_u8; 20];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Format as a `0x`-prefixed hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Check for the zero address
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0_u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Address parse failures
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddressParseError {
    /// Wrong input length
    #[error("address must be 40 hex characters, got {got}")]
    Length {
        /// Character count of the input
        got: usize,
    },

    /// Non-hex characters in the input
    #[error("address contains invalid hex")]
    InvalidHex,
}

/// Single 32-byte result value
///
/// Every action returns exactly one `Word`; the output buffer is a
/// sequence of these and the parameter resolver copies them into slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word(pub [u8; 32]);

impl Word {
    /// All-zero word
    pub const ZERO: Self = Self([0_u8; 32]);

    /// Encode an amount into the low 16 bytes, big-endian
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0_u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Decode an amount from the low 16 bytes
    ///
    /// Returns `None` when the high 16 bytes are non-zero, which means
    /// the word does not hold a plain amount.
    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        let (high, low) = self.0.split_at(16);
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        let mut raw = [0_u8; 16];
        raw.copy_from_slice(low);
        Some(u128::from_be_bytes(raw))
    }

    /// Encode an address into the low 20 bytes
    #[must_use]
    pub fn from_address(addr: Address) -> Self {
        let mut bytes = [0_u8; 32];
        bytes[12..].copy_from_slice(&addr.0);
        Self(bytes)
    }

    /// Decode an address from the low 20 bytes
    ///
    /// Returns `None` when the high 12 bytes are non-zero.
    #[must_use]
    pub fn to_address(&self) -> Option<Address> {
        let (high, low) = self.0.split_at(12);
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        let mut raw = [0_u8; 20];
        raw.copy_from_slice(low);
        Some(Address(raw))
    }
}

/// Registry key identifying an action implementation (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub [u8; 4]);

impl ActionId {
    /// Build an id from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
