//! Registry instance metadata and format versions.
//!
//! The core keeps no disk format itself; the surrounding service layer
//! persists the event log and needs a stable header to know what it wrote.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::WallClock;

/// Identifies one registry instance across restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryId(Uuid);

impl RegistryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RegistryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version of the serialized event-record schema.
pub const EVENT_FORMAT_VERSION: u32 = 1;

/// Version of the serialized aggregate snapshot schema.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMeta {
    pub registry_id: RegistryId,
    pub event_format_version: u32,
    pub snapshot_format_version: u32,
    pub created_at_ms: u64,
}

impl RegistryMeta {
    pub fn generate() -> Self {
        Self {
            registry_id: RegistryId::generate(),
            event_format_version: EVENT_FORMAT_VERSION,
            snapshot_format_version: SNAPSHOT_FORMAT_VERSION,
            created_at_ms: WallClock::now().0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_roundtrips_through_json() {
        let meta = RegistryMeta::generate();
        let json = serde_json::to_string(&meta).unwrap();
        let back: RegistryMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(RegistryId::generate(), RegistryId::generate());
    }
}
