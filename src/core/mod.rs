//! Core registry types and semantics
//!
//! Module hierarchy follows type dependency order:
//! - time: logical clock primitives (Layer 0)
//! - sequence: Seq0/Seq1, the sequencer counter (Layer 0)
//! - identity: ProductId, AccountId (Layer 1)
//! - record: ProductRecord (Layer 2)
//! - event: hash-chained EventLog (Layer 3)
//! - state: RegistryState aggregate (Layer 4)
//! - apply: deterministic replay over a log (Layer 5)

pub mod apply;
pub mod error;
pub mod event;
pub mod identity;
pub mod json_canon;
pub mod limits;
pub mod meta;
pub mod record;
pub mod sequence;
pub mod state;
pub mod time;

pub use apply::{apply_event, replay, ReplayError};
pub use error::{ErrorCode, InvalidId, RegistryError};
pub use event::{sha256_bytes, ChainError, EventKind, EventLog, EventRecord, Sha256};
pub use identity::{AccountId, ProductId, MAX_ACCOUNT_ID_BYTES, MAX_PRODUCT_ID_BYTES};
pub use json_canon::{to_canon_json_bytes, CanonJsonError};
pub use limits::Limits;
pub use meta::{RegistryId, RegistryMeta, EVENT_FORMAT_VERSION, SNAPSHOT_FORMAT_VERSION};
pub use record::ProductRecord;
pub use sequence::{Seq0, Seq1, Sequencer};
pub use state::{RegistrationReceipt, RegistryState, SaleReceipt};
pub use time::{LogicalTime, WallClock};
