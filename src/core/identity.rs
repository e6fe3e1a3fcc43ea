//! Layer 1: Identity atoms
//!
//! ProductId: natural key of a product record (e.g. an IMEI string).
//! AccountId: opaque comparable identity of a manufacturer or owner.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::InvalidId;

/// Product identifiers are surrounding-text from labels and scanners; cap
/// them so a hostile caller cannot grow records without bound.
pub const MAX_PRODUCT_ID_BYTES: usize = 256;

/// Account identifiers are addresses or comparable opaque tokens.
pub const MAX_ACCOUNT_ID_BYTES: usize = 128;

/// Product identifier - non-empty after trimming.
///
/// Whitespace is trimmed at parse; the stored form is the trimmed form, so
/// `" IMEI-1 "` and `"IMEI-1"` are the same key. No charset restriction
/// beyond rejecting control characters.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidId::Product {
                raw: s.to_string(),
                reason: "empty".into(),
            });
        }
        if trimmed.len() > MAX_PRODUCT_ID_BYTES {
            return Err(InvalidId::Product {
                raw: s.to_string(),
                reason: format!("longer than {MAX_PRODUCT_ID_BYTES} bytes"),
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidId::Product {
                raw: s.to_string(),
                reason: "contains control characters".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProductId({:?})", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identity - an opaque comparable value (e.g. a public address).
///
/// The registry never interprets it beyond equality, except for the
/// distinguished zero identity which is not a valid transfer recipient.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidId::Account {
                raw: s.to_string(),
                reason: "empty".into(),
            });
        }
        if trimmed.len() > MAX_ACCOUNT_ID_BYTES {
            return Err(InvalidId::Account {
                raw: s.to_string(),
                reason: format!("longer than {MAX_ACCOUNT_ID_BYTES} bytes"),
            });
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidId::Account {
                raw: s.to_string(),
                reason: "contains whitespace or control characters".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The zero identity: all-zero digits after an optional `0x` prefix
    /// (`0x0000…`, `0`, `000`). Parseable so foreign data round-trips, but
    /// rejected as a sale recipient.
    pub fn is_zero(&self) -> bool {
        let digits = self
            .0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .unwrap_or(&self.0);
        !digits.is_empty() && digits.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({:?})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
