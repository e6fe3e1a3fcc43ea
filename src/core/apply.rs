//! Deterministic event application: rebuild a registry from its log.
//!
//! Replay is the recovery path for the service layer: persist the event log,
//! restart, fold it back into a state. `replay` over a well-formed log
//! produces a state identical to the one that emitted it, including the
//! sequencer position, so writes continue the same sequence.

use thiserror::Error;

use super::event::{verify_record_hash, EventKind, EventRecord};
use super::identity::ProductId;
use super::record::ProductRecord;
use super::state::RegistryState;

/// A log that cannot be replayed: tampered, truncated in the middle, or
/// emitted by a registry these semantics don't describe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("sequence gap: expected seq {expected}, log has {found}")]
    SeqGap { expected: u64, found: u64 },

    #[error("event {seq} logical time {at} does not match its seq")]
    TimeMismatch { seq: u64, at: u64 },

    #[error("event {seq} prev-hash does not match the preceding event")]
    PrevHashMismatch { seq: u64 },

    #[error("event {seq} body hash does not match its contents")]
    BodyHashMismatch { seq: u64 },

    #[error("event {seq} registers `{id}` twice")]
    DuplicateRegistration { seq: u64, id: ProductId },

    #[error("event {seq} sells unregistered product `{id}`")]
    UnknownProduct { seq: u64, id: ProductId },

    #[error("event {seq} sells `{id}` from `{recorded}` but owner was `{actual}`")]
    OwnerMismatch {
        seq: u64,
        id: ProductId,
        recorded: String,
        actual: String,
    },
}

/// Apply one event to a state positioned exactly before it.
///
/// Verifies the stamp, the hash chain link, and the body hash before any
/// mutation; a failed event leaves the state untouched.
pub fn apply_event(state: &mut RegistryState, event: &EventRecord) -> Result<(), ReplayError> {
    let expected = state.sequencer.head().next();
    if event.seq != expected {
        return Err(ReplayError::SeqGap {
            expected: expected.get(),
            found: event.seq.get(),
        });
    }
    if event.at.get() != event.seq.get() {
        return Err(ReplayError::TimeMismatch {
            seq: event.seq.get(),
            at: event.at.get(),
        });
    }
    if event.prev_sha256 != state.log.head_sha256() {
        return Err(ReplayError::PrevHashMismatch {
            seq: event.seq.get(),
        });
    }
    if !verify_record_hash(event) {
        return Err(ReplayError::BodyHashMismatch {
            seq: event.seq.get(),
        });
    }

    match &event.kind {
        EventKind::Registered { manufacturer } => {
            if state.records.contains_key(&event.product_id) {
                return Err(ReplayError::DuplicateRegistration {
                    seq: event.seq.get(),
                    id: event.product_id.clone(),
                });
            }
            let record = ProductRecord::new(
                event.product_id.clone(),
                manufacturer.clone(),
                event.seq,
                event.at,
            );
            state.records.insert(event.product_id.clone(), record);
            state.order.push(event.product_id.clone());
        }
        EventKind::Sold {
            previous_owner,
            new_owner,
        } => {
            let Some(record) = state.records.get_mut(&event.product_id) else {
                return Err(ReplayError::UnknownProduct {
                    seq: event.seq.get(),
                    id: event.product_id.clone(),
                });
            };
            if &record.current_owner != previous_owner {
                return Err(ReplayError::OwnerMismatch {
                    seq: event.seq.get(),
                    id: event.product_id.clone(),
                    recorded: previous_owner.to_string(),
                    actual: record.current_owner.to_string(),
                });
            }
            record.apply_sale(new_owner.clone());
        }
    }

    let (seq, _) = state.sequencer.admit();
    debug_assert_eq!(seq, event.seq);
    state.log.push_replayed(event.clone());
    Ok(())
}

/// Fold a full log into a fresh state.
pub fn replay<'a, I>(events: I) -> Result<RegistryState, ReplayError>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut state = RegistryState::new();
    for event in events {
        apply_event(&mut state, event)?;
    }
    Ok(state)
}
