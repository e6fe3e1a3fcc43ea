#![forbid(unsafe_code)]

//! Tamper-evident product provenance registry.
//!
//! Binds a product identifier to its manufacturer, tracks the single current
//! owner, and records every accepted mutation in a hash-chained event log.
//! The [`Registry`] shell serializes writes and hands out snapshot reads;
//! [`core`] holds the aggregate and its replay semantics.

pub mod api;
pub mod broadcast;
pub mod config;
pub mod core;
pub mod error;
pub mod registry;
pub mod telemetry;

pub use error::{Effect, Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

pub use broadcast::{BroadcastError, DropReason, EventSubscription};
pub use config::Config;
pub use registry::Registry;

// Re-export core types at crate root for convenience
pub use crate::core::{
    AccountId, ChainError, ErrorCode, EventKind, EventLog, EventRecord, Limits, LogicalTime,
    ProductId, ProductRecord, RegistrationReceipt, RegistryError, RegistryId, RegistryMeta,
    RegistryState, ReplayError, SaleReceipt, Seq0, Seq1, Sha256, WallClock,
};
