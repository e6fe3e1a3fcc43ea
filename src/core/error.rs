//! Core registry errors (validation, authorization, lookup).
//!
//! These are bounded and stable: they represent domain/refusal states, not
//! library implementation details. Every variant leaves the aggregate
//! untouched; the registry has no partially-applied failure mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::{AccountId, ProductId};

/// Invalid identifier at the parse boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidId {
    #[error("product id `{raw}` is invalid: {reason}")]
    Product { raw: String, reason: String },
    #[error("account id `{raw}` is invalid: {reason}")]
    Account { raw: String, reason: String },
}

/// Refusal states of registry operations.
///
/// Variants carry enough context to render a caller-facing message without
/// re-reading state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Product id empty or whitespace-only after trimming.
    #[error("product id is empty")]
    EmptyIdentifier,

    /// Product id present but malformed (oversize, control characters).
    #[error("invalid product id: {reason}")]
    InvalidIdentifier { reason: String },

    /// A record already exists under this id.
    #[error("product `{id}` is already registered")]
    AlreadyRegistered { id: ProductId },

    /// No record under this id. Carries the raw lookup string: absence must
    /// be reportable even for ids that never parsed.
    #[error("product `{id}` not found")]
    NotFound { id: String },

    /// Caller is not the record's current owner.
    #[error("`{caller}` is not the current owner of product `{id}`")]
    Unauthorized { id: ProductId, caller: AccountId },

    /// New owner missing, malformed, or the zero identity.
    #[error("invalid new owner: {reason}")]
    InvalidNewOwner { reason: String },

    /// Positional lookup outside `[0, total_count)`.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::EmptyIdentifier => ErrorCode::EmptyIdentifier,
            RegistryError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            RegistryError::AlreadyRegistered { .. } => ErrorCode::AlreadyRegistered,
            RegistryError::NotFound { .. } => ErrorCode::NotFound,
            RegistryError::Unauthorized { .. } => ErrorCode::Unauthorized,
            RegistryError::InvalidNewOwner { .. } => ErrorCode::InvalidNewOwner,
            RegistryError::IndexOutOfBounds { .. } => ErrorCode::IndexOutOfBounds,
        }
    }
}

/// Stable wire identifiers for refusal states.
///
/// The service layer maps these to transport status codes; the strings are a
/// compatibility surface and must not change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    EmptyIdentifier,
    InvalidIdentifier,
    AlreadyRegistered,
    NotFound,
    Unauthorized,
    InvalidNewOwner,
    IndexOutOfBounds,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyIdentifier => "empty_identifier",
            ErrorCode::InvalidIdentifier => "invalid_identifier",
            ErrorCode::AlreadyRegistered => "already_registered",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::InvalidNewOwner => "invalid_new_owner",
            ErrorCode::IndexOutOfBounds => "index_out_of_bounds",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
