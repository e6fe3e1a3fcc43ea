//! Concurrent shell over the registry aggregate.
//!
//! Writes take the write lock: that lock is the sequencer's admission
//! boundary, so mutations form a strict total order and no write is ever
//! observable half-applied. Reads take the read lock and see the latest
//! committed state. Accepted events are published to subscribers before the
//! write lock is released, so subscription order equals admission order.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::api::StatusOutput;
use crate::broadcast::{BroadcastError, BroadcasterLimits, EventBroadcaster, EventSubscription};
use crate::config::Config;
use crate::core::{
    replay, AccountId, ChainError, EventRecord, ProductId, ProductRecord, RegistrationReceipt,
    RegistryError, RegistryMeta, RegistryState, ReplayError, SaleReceipt, Seq0, Sha256,
};

/// Thread-safe registry handle. Clones share the same state.
#[derive(Clone, Debug)]
pub struct Registry {
    meta: RegistryMeta,
    state: Arc<RwLock<RegistryState>>,
    broadcaster: EventBroadcaster,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self::from_state(RegistryState::new(), config)
    }

    /// Wrap an existing aggregate (e.g. a deserialized snapshot). The
    /// configured limits replace whatever bounds the aggregate carried.
    pub fn from_state(mut state: RegistryState, config: &Config) -> Self {
        state.set_limits(config.limits.clone());
        Self {
            meta: RegistryMeta::generate(),
            state: Arc::new(RwLock::new(state)),
            broadcaster: EventBroadcaster::new(BroadcasterLimits::from_limits(&config.limits)),
        }
    }

    /// Rebuild from a persisted event log.
    pub fn from_events<'a, I>(events: I, config: &Config) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let state = replay(events)?;
        info!(
            total = state.total_count(),
            events = state.log().len(),
            "registry rebuilt from event log"
        );
        Ok(Self::from_state(state, config))
    }

    pub fn meta(&self) -> &RegistryMeta {
        &self.meta
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Register a product with the caller as manufacturer and initial owner.
    pub fn register(
        &self,
        product_id: &str,
        manufacturer: &AccountId,
    ) -> Result<RegistrationReceipt, RegistryError> {
        let mut state = self.state.write().expect("registry lock poisoned");
        match state.register(product_id, manufacturer) {
            Ok(receipt) => {
                self.publish_appended(&state, &receipt.seq.prev_seq0());
                info!(
                    product_id = %receipt.product_id,
                    manufacturer = %manufacturer,
                    seq = %receipt.seq,
                    "product registered"
                );
                Ok(receipt)
            }
            Err(err) => {
                debug!(product_id, code = %err.code(), "registration refused");
                Err(err)
            }
        }
    }

    /// Transfer ownership; only the current owner may sell.
    pub fn sell(
        &self,
        product_id: &str,
        caller: &AccountId,
        new_owner: &str,
    ) -> Result<SaleReceipt, RegistryError> {
        let mut state = self.state.write().expect("registry lock poisoned");
        match state.sell(product_id, caller, new_owner) {
            Ok(receipt) => {
                self.publish_appended(&state, &receipt.seq.prev_seq0());
                info!(
                    product_id = %receipt.product_id,
                    previous_owner = %receipt.previous_owner,
                    new_owner = %receipt.new_owner,
                    seq = %receipt.seq,
                    "ownership transferred"
                );
                Ok(receipt)
            }
            Err(err) => {
                debug!(product_id, caller = %caller, code = %err.code(), "sale refused");
                Err(err)
            }
        }
    }

    fn publish_appended(&self, state: &RegistryState, before: &Seq0) {
        for event in state.log().since(*before) {
            // Lag-drop inside publish; a poisoned broadcaster lock only
            // affects subscribers, never the committed write.
            let _ = self.broadcaster.publish(event);
        }
    }

    // =========================================================================
    // Reads (snapshot view of the latest committed write)
    // =========================================================================

    /// Full record snapshot for a registered product.
    pub fn verify(&self, product_id: &str) -> Result<ProductRecord, RegistryError> {
        let state = self.state.read().expect("registry lock poisoned");
        state.verify(product_id).cloned()
    }

    pub fn is_registered(&self, product_id: &str) -> bool {
        let state = self.state.read().expect("registry lock poisoned");
        state.is_registered(product_id)
    }

    pub fn total_count(&self) -> usize {
        let state = self.state.read().expect("registry lock poisoned");
        state.total_count()
    }

    pub fn get_by_index(&self, index: usize) -> Result<ProductId, RegistryError> {
        let state = self.state.read().expect("registry lock poisoned");
        state.get_by_index(index).cloned()
    }

    /// Events strictly after `after`, in admission order. The polling
    /// counterpart to `subscribe`.
    pub fn events_since(&self, after: Seq0) -> Vec<EventRecord> {
        let state = self.state.read().expect("registry lock poisoned");
        state.log().since(after).to_vec()
    }

    /// Highest admitted sequence number.
    pub fn head_seq(&self) -> Seq0 {
        let state = self.state.read().expect("registry lock poisoned");
        state.log().head_seq()
    }

    /// Hash of the newest event; fingerprint of the whole history.
    pub fn head_sha256(&self) -> Option<Sha256> {
        let state = self.state.read().expect("registry lock poisoned");
        state.log().head_sha256()
    }

    /// Recompute the full hash chain (audit path).
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        let state = self.state.read().expect("registry lock poisoned");
        state.log().verify_chain()
    }

    /// Owned copy of the aggregate, e.g. for snapshot persistence.
    pub fn snapshot(&self) -> RegistryState {
        let state = self.state.read().expect("registry lock poisoned");
        state.clone()
    }

    /// Registry-wide summary for dashboards and replication health checks.
    pub fn status(&self) -> StatusOutput {
        let state = self.state.read().expect("registry lock poisoned");
        StatusOutput::from(&*state)
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Live event feed from this point forward. Catch up on history with
    /// `events_since` before subscribing.
    pub fn subscribe(&self) -> Result<EventSubscription, BroadcastError> {
        self.broadcaster.subscribe()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::parse(s).unwrap()
    }

    #[test]
    fn clones_share_state() {
        let registry = Registry::new();
        let other = registry.clone();
        registry.register("IMEI-1", &account("0xm")).unwrap();
        assert!(other.is_registered("IMEI-1"));
        assert_eq!(other.total_count(), 1);
    }

    #[test]
    fn subscriber_sees_committed_writes() {
        let registry = Registry::new();
        let sub = registry.subscribe().unwrap();
        let manufacturer = account("0xm");
        registry.register("IMEI-1", &manufacturer).unwrap();
        registry.sell("IMEI-1", &manufacturer, "0xbuyer").unwrap();

        assert_eq!(sub.recv().unwrap().seq.get(), 1);
        assert_eq!(sub.recv().unwrap().seq.get(), 2);
    }

    #[test]
    fn events_since_matches_head() {
        let registry = Registry::new();
        registry.register("IMEI-1", &account("0xm")).unwrap();
        registry.register("IMEI-2", &account("0xm")).unwrap();

        assert_eq!(registry.head_seq().get(), 2);
        assert_eq!(registry.events_since(Seq0::ZERO).len(), 2);
        assert_eq!(registry.events_since(Seq0::new(1)).len(), 1);
        registry.verify_chain().unwrap();
    }
}
