//! The registry aggregate: records, insertion-order index, event log, and
//! the sequencer counter, mutated through one validate-then-apply path.
//!
//! INVARIANTS (checked by `check_invariants`):
//! - record keys are exactly the ids ever accepted by registration
//! - total count == |order| == |records|; no id appears twice in `order`
//! - manufacturer and registration stamp never change after creation
//! - is_sold iff at least one sale accepted; current_owner is the latest
//!   recipient (or the manufacturer before any sale)
//! - event seqs are gapless, strictly increasing, in admission order
//!
//! All validation happens before any mutation; an error path leaves the
//! aggregate byte-for-byte unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::RegistryError;
use super::event::{EventKind, EventLog};
use super::identity::{AccountId, ProductId};
use super::limits::Limits;
use super::sequence::{Seq1, Sequencer};
use super::time::LogicalTime;
use super::record::ProductRecord;

/// Proof of a successful registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub product_id: ProductId,
    pub seq: Seq1,
    pub at: LogicalTime,
}

/// Proof of a successful ownership transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub product_id: ProductId,
    pub seq: Seq1,
    pub at: LogicalTime,
    pub previous_owner: AccountId,
    pub new_owner: AccountId,
}

/// The single source of truth for product provenance.
///
/// Not thread-safe by itself; `Registry` wraps it for concurrent callers.
/// Fully serializable as a snapshot (the sequencer counter travels with it,
/// so a restored snapshot continues the same sequence).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub(crate) records: BTreeMap<ProductId, ProductRecord>,
    /// First-registration order; position i is the i-th distinct product
    /// ever registered and is stable forever.
    pub(crate) order: Vec<ProductId>,
    pub(crate) log: EventLog,
    pub(crate) sequencer: Sequencer,
    /// Active operational bounds. Configuration, not history: excluded from
    /// snapshots and equality so the same log under different limits is
    /// still the same state.
    #[serde(skip, default)]
    pub(crate) limits: Limits,
}

/// History equality: two states are equal when they hold the same records,
/// order, log, and sequence position, whatever bounds they run under.
impl PartialEq for RegistryState {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
            && self.order == other.order
            && self.log == other.log
            && self.sequencer == other.sequencer
    }
}

impl Eq for RegistryState {}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State enforcing the given bounds on incoming identifiers.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub(crate) fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Register a product with the caller as manufacturer and initial owner.
    pub fn register(
        &mut self,
        product_id: &str,
        manufacturer: &AccountId,
    ) -> Result<RegistrationReceipt, RegistryError> {
        let id = self.parse_product_id(product_id)?;
        if self.records.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered { id });
        }

        let (seq, at) = self.sequencer.admit();
        let record = ProductRecord::new(id.clone(), manufacturer.clone(), seq, at);
        self.records.insert(id.clone(), record);
        self.order.push(id.clone());
        self.log.append(
            seq,
            at,
            id.clone(),
            EventKind::Registered {
                manufacturer: manufacturer.clone(),
            },
        );

        Ok(RegistrationReceipt {
            product_id: id,
            seq,
            at,
        })
    }

    /// Transfer ownership. Preconditions, in order: ids provided and valid,
    /// new owner not the zero identity, record exists, caller is the current
    /// owner. The authorization check runs against the state admitted here,
    /// never a stale read.
    pub fn sell(
        &mut self,
        product_id: &str,
        caller: &AccountId,
        new_owner: &str,
    ) -> Result<SaleReceipt, RegistryError> {
        let id = self.parse_product_id(product_id)?;
        let new_owner = self.parse_new_owner(new_owner)?;

        let Some(record) = self.records.get(&id) else {
            return Err(RegistryError::NotFound {
                id: id.as_str().to_string(),
            });
        };
        Self::authorize_sale(record, &id, caller)?;

        let (seq, at) = self.sequencer.admit();
        let record = self
            .records
            .get_mut(&id)
            .expect("record present after authorization");
        let previous_owner = record.apply_sale(new_owner.clone());
        self.log.append(
            seq,
            at,
            id.clone(),
            EventKind::Sold {
                previous_owner: previous_owner.clone(),
                new_owner: new_owner.clone(),
            },
        );

        Ok(SaleReceipt {
            product_id: id,
            seq,
            at,
            previous_owner,
            new_owner,
        })
    }

    /// Ownership guard: only the current owner may transfer.
    fn authorize_sale(
        record: &ProductRecord,
        id: &ProductId,
        caller: &AccountId,
    ) -> Result<(), RegistryError> {
        if &record.current_owner != caller {
            return Err(RegistryError::Unauthorized {
                id: id.clone(),
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn parse_product_id(&self, raw: &str) -> Result<ProductId, RegistryError> {
        if raw.trim().is_empty() {
            return Err(RegistryError::EmptyIdentifier);
        }
        let id = ProductId::parse(raw).map_err(|err| RegistryError::InvalidIdentifier {
            reason: err.to_string(),
        })?;
        // Configured bound; ProductId::parse already enforces the hard cap.
        if id.as_str().len() > self.limits.max_product_id_bytes {
            return Err(RegistryError::InvalidIdentifier {
                reason: format!(
                    "longer than {} bytes",
                    self.limits.max_product_id_bytes
                ),
            });
        }
        Ok(id)
    }

    fn parse_new_owner(&self, raw: &str) -> Result<AccountId, RegistryError> {
        let owner = AccountId::parse(raw).map_err(|err| RegistryError::InvalidNewOwner {
            reason: err.to_string(),
        })?;
        if owner.as_str().len() > self.limits.max_account_id_bytes {
            return Err(RegistryError::InvalidNewOwner {
                reason: format!(
                    "longer than {} bytes",
                    self.limits.max_account_id_bytes
                ),
            });
        }
        if owner.is_zero() {
            return Err(RegistryError::InvalidNewOwner {
                reason: "zero identity".into(),
            });
        }
        Ok(owner)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Full record for a registered product.
    pub fn verify(&self, product_id: &str) -> Result<&ProductRecord, RegistryError> {
        let not_found = || RegistryError::NotFound {
            id: product_id.trim().to_string(),
        };
        let id = ProductId::parse(product_id).map_err(|_| not_found())?;
        self.records.get(&id).ok_or_else(not_found)
    }

    /// Registration check; absent (or unparseable) ids are simply `false`.
    pub fn is_registered(&self, product_id: &str) -> bool {
        ProductId::parse(product_id)
            .map(|id| self.records.contains_key(&id))
            .unwrap_or(false)
    }

    /// Number of distinct products ever registered.
    pub fn total_count(&self) -> usize {
        self.order.len()
    }

    /// The i-th distinct product ever registered (0-based, stable forever).
    pub fn get_by_index(&self, index: usize) -> Result<&ProductId, RegistryError> {
        self.order.get(index).ok_or(RegistryError::IndexOutOfBounds {
            index,
            len: self.order.len(),
        })
    }

    /// Product ids in first-registration order.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.order.iter()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    // =========================================================================
    // Invariant audit
    // =========================================================================

    /// Full structural audit; test and debugging aid, not a hot-path check.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.records.len() != self.order.len() {
            return Err(format!(
                "count mismatch: {} records vs {} ordered ids",
                self.records.len(),
                self.order.len()
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for id in &self.order {
            if !seen.insert(id) {
                return Err(format!("id `{id}` appears twice in order"));
            }
            if !self.records.contains_key(id) {
                return Err(format!("ordered id `{id}` has no record"));
            }
        }
        if self.log.len() as u64 != self.sequencer.head().get() {
            return Err(format!(
                "log length {} does not match sequencer head {}",
                self.log.len(),
                self.sequencer.head()
            ));
        }
        for record in self.records.values() {
            let sold_events = self
                .log
                .iter()
                .filter(|e| {
                    e.product_id == record.product_id
                        && matches!(e.kind, EventKind::Sold { .. })
                })
                .count() as u64;
            if record.transfer_count != sold_events {
                return Err(format!(
                    "record `{}` counts {} transfers but log has {}",
                    record.product_id, record.transfer_count, sold_events
                ));
            }
            if record.is_sold != (sold_events > 0) {
                return Err(format!(
                    "record `{}` is_sold={} disagrees with {} sale events",
                    record.product_id, record.is_sold, sold_events
                ));
            }
            if !record.is_registered {
                return Err(format!("record `{}` lost is_registered", record.product_id));
            }
        }
        self.log.verify_chain().map_err(|err| err.to_string())
    }
}
