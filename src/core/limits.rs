//! Operational safety limits (normative defaults).

use serde::{Deserialize, Serialize};

use super::identity::{MAX_ACCOUNT_ID_BYTES, MAX_PRODUCT_ID_BYTES};

/// Bounds on caller-supplied sizes and fan-out resources.
///
/// Values are intentionally explicit about their units to avoid confusion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_product_id_bytes: usize,
    pub max_account_id_bytes: usize,

    pub max_broadcast_subscribers: usize,
    pub max_subscriber_queue_events: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_product_id_bytes: MAX_PRODUCT_ID_BYTES,
            max_account_id_bytes: MAX_ACCOUNT_ID_BYTES,
            max_broadcast_subscribers: 64,
            max_subscriber_queue_events: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let limits: Limits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, Limits::default());

        let limits: Limits =
            serde_json::from_str(r#"{"max_broadcast_subscribers": 2}"#).unwrap();
        assert_eq!(limits.max_broadcast_subscribers, 2);
        assert_eq!(limits.max_product_id_bytes, MAX_PRODUCT_ID_BYTES);
    }
}
