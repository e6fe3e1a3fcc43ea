//! Event log: append-only history of accepted mutations.
//!
//! Every accepted write produces exactly one event, stamped with its
//! sequence number and logical time. Each event hashes its canonical body
//! together with the previous event's hash, so any rewrite of history is
//! detectable from the head hash alone.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256 as Sha2};
use thiserror::Error;

use super::identity::{AccountId, ProductId};
use super::json_canon::to_canon_json_bytes;
use super::sequence::{Seq0, Seq1};
use super::time::LogicalTime;

/// SHA-256 digest, serialized as lowercase hex.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256(pub [u8; 32]);

impl Sha256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            out.push(char::from_digit((byte >> 4) as u32, 16).unwrap_or('0'));
            out.push(char::from_digit((byte & 0xf) as u32, 16).unwrap_or('0'));
        }
        out
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut buf = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char).to_digit(16)?;
            let lo = (chunk[1] as char).to_digit(16)?;
            buf[i] = ((hi << 4) | lo) as u8;
        }
        Some(Self(buf))
    }
}

impl fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Sha256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Sha256::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom("expected 64 lowercase hex chars"))
    }
}

pub fn sha256_bytes(data: &[u8]) -> Sha256 {
    let mut hasher = Sha2::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&out);
    Sha256(buf)
}

/// What happened, with the parties involved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Registered {
        manufacturer: AccountId,
    },
    Sold {
        previous_owner: AccountId,
        new_owner: AccountId,
    },
}

/// One accepted mutation. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: Seq1,
    pub at: LogicalTime,
    pub product_id: ProductId,
    #[serde(flatten)]
    pub kind: EventKind,
    /// Hash of the previous event; None for the first event.
    pub prev_sha256: Option<Sha256>,
    /// Hash of this event's canonical body (which includes `prev_sha256`).
    pub sha256: Sha256,
}

/// The hashed portion of an event: everything except the hash itself.
#[derive(Serialize)]
struct EventBody<'a> {
    seq: Seq1,
    at: LogicalTime,
    product_id: &'a ProductId,
    #[serde(flatten)]
    kind: &'a EventKind,
    prev_sha256: Option<Sha256>,
}

fn hash_body(
    seq: Seq1,
    at: LogicalTime,
    product_id: &ProductId,
    kind: &EventKind,
    prev_sha256: Option<Sha256>,
) -> Sha256 {
    let body = EventBody {
        seq,
        at,
        product_id,
        kind,
        prev_sha256,
    };
    // Strings, bools, and integers only; canonical encoding cannot fail.
    let bytes = to_canon_json_bytes(&body).expect("event body encodes to canonical json");
    sha256_bytes(&bytes)
}

/// Recompute an event's body hash and compare against its recorded hash.
pub(crate) fn verify_record_hash(event: &EventRecord) -> bool {
    hash_body(
        event.seq,
        event.at,
        &event.product_id,
        &event.kind,
        event.prev_sha256,
    ) == event.sha256
}

/// Chain verification failures, by the first offending sequence number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("event at position {position} has seq {found}, expected {expected}")]
    SeqMismatch {
        position: usize,
        expected: u64,
        found: u64,
    },
    #[error("event {seq} prev-hash does not match preceding event")]
    PrevHashMismatch { seq: u64 },
    #[error("event {seq} body hash does not match its contents")]
    BodyHashMismatch { seq: u64 },
}

/// Append-only, hash-chained log of accepted mutations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sequence number of the newest event (ZERO if none).
    pub fn head_seq(&self) -> Seq0 {
        Seq0::new(self.events.len() as u64)
    }

    /// Hash of the newest event (None if the log is empty).
    pub fn head_sha256(&self) -> Option<Sha256> {
        self.events.last().map(|e| e.sha256)
    }

    pub fn get(&self, seq: Seq1) -> Option<&EventRecord> {
        self.events.get(seq.get() as usize - 1)
    }

    /// Events strictly after `after`, in order. `Seq0::ZERO` returns the
    /// whole log; an offset at or past the head returns an empty slice.
    pub fn since(&self, after: Seq0) -> &[EventRecord] {
        let start = (after.get() as usize).min(self.events.len());
        &self.events[start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.events.iter()
    }

    /// Append the event for an accepted write. The caller supplies the stamp
    /// the sequencer assigned; seq must extend the log contiguously.
    pub(crate) fn append(
        &mut self,
        seq: Seq1,
        at: LogicalTime,
        product_id: ProductId,
        kind: EventKind,
    ) -> &EventRecord {
        debug_assert_eq!(
            seq.get(),
            self.events.len() as u64 + 1,
            "event log append must be gapless"
        );
        let prev_sha256 = self.head_sha256();
        let sha256 = hash_body(seq, at, &product_id, &kind, prev_sha256);
        self.events.push(EventRecord {
            seq,
            at,
            product_id,
            kind,
            prev_sha256,
            sha256,
        });
        self.events.last().expect("just pushed")
    }

    /// Append a replayed event verbatim. The replay path has already
    /// verified seq contiguity and both hashes.
    pub(crate) fn push_replayed(&mut self, event: EventRecord) {
        self.events.push(event);
    }

    /// Recompute every hash and link; returns the first break found.
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        let mut prev: Option<Sha256> = None;
        for (position, event) in self.events.iter().enumerate() {
            let expected_seq = position as u64 + 1;
            if event.seq.get() != expected_seq {
                return Err(ChainError::SeqMismatch {
                    position,
                    expected: expected_seq,
                    found: event.seq.get(),
                });
            }
            if event.prev_sha256 != prev {
                return Err(ChainError::PrevHashMismatch {
                    seq: event.seq.get(),
                });
            }
            let recomputed = hash_body(
                event.seq,
                event.at,
                &event.product_id,
                &event.kind,
                event.prev_sha256,
            );
            if recomputed != event.sha256 {
                return Err(ChainError::BodyHashMismatch {
                    seq: event.seq.get(),
                });
            }
            prev = Some(event.sha256);
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
