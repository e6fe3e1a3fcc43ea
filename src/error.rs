use thiserror::Error;

use crate::broadcast::BroadcastError;
use crate::config::ConfigError;
use crate::core::{ChainError, RegistryError, ReplayError};

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs/state.
    Permanent,
    /// Retry may help (transient contention/outage).
    Retryable,
    /// Unknown if retry will help.
    Unknown,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// What we know about side effects when an error is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Effect {
    /// Definitely no side effects occurred.
    None,
    /// Side effects definitely occurred.
    Some,
    /// We don't know if side effects occurred.
    Unknown,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Some => "some",
            Effect::Unknown => "unknown",
        }
    }
}

/// Crate-level convenience error.
///
/// A thin wrapper over the canonical errors of each surface; the service
/// layer can match on the inner kinds or classify via `transience`/`effect`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn transience(&self) -> Transience {
        match self {
            // Refusal states: same inputs against the same state will refuse
            // again. Tampered logs stay tampered.
            Error::Registry(_) | Error::Replay(_) | Error::Chain(_) => Transience::Permanent,
            Error::Broadcast(BroadcastError::TooManySubscribers { .. }) => Transience::Retryable,
            Error::Broadcast(BroadcastError::LockPoisoned) => Transience::Permanent,
            Error::Config(ConfigError::Io(_)) => Transience::Unknown,
            Error::Config(ConfigError::Parse(_)) => Transience::Permanent,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            // The registry validates before mutating; every refusal leaves
            // state untouched.
            Error::Registry(_) | Error::Chain(_) | Error::Broadcast(_) => Effect::None,
            // Replay fails mid-log: earlier events were already applied to
            // the state under construction.
            Error::Replay(_) => Effect::Unknown,
            Error::Config(_) => Effect::Unknown,
        }
    }
}
