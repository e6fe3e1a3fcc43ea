//! Write admission order: sequence numbers and the sequencer counter.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use super::time::LogicalTime;

/// Zero-based sequence position: "everything up to and including this seq".
///
/// `Seq0::ZERO` means "nothing admitted yet"; used as the offset type for
/// event-log polling (`events after seq N`).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq0(u64);

impl Seq0 {
    pub const ZERO: Seq0 = Seq0(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Seq1 {
        let next = self
            .0
            .checked_add(1)
            .expect("seq0 overflow computing next seq1");
        Seq1(NonZeroU64::new(next).expect("seq1 cannot be zero"))
    }
}

impl fmt::Debug for Seq0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq0({})", self.0)
    }
}

impl fmt::Display for Seq0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Seq0> for u64 {
    fn from(value: Seq0) -> u64 {
        value.0
    }
}

/// One-based sequence number of an admitted write. Strictly increasing,
/// gapless within one registry lifetime.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq1(NonZeroU64);

impl Seq1 {
    pub fn from_u64(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    pub fn next(self) -> Seq1 {
        let next = self
            .0
            .get()
            .checked_add(1)
            .expect("seq1 overflow computing next");
        Seq1(NonZeroU64::new(next).expect("seq1 cannot be zero"))
    }

    pub fn prev_seq0(self) -> Seq0 {
        Seq0(self.0.get() - 1)
    }
}

impl fmt::Debug for Seq1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq1({})", self.0)
    }
}

impl fmt::Display for Seq1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Seq1> for u64 {
    fn from(value: Seq1) -> u64 {
        value.0.get()
    }
}

/// The sequencer: hands out the next (sequence number, logical time) pair.
///
/// Lives inside the aggregate so assignment is atomic with the mutation it
/// stamps; callers never observe a seq that was assigned but not applied.
/// Logical time advances in lockstep with the sequence number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequencer {
    head: Seq0,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest sequence number admitted so far (ZERO if none).
    pub fn head(&self) -> Seq0 {
        self.head
    }

    /// Admit the next write: advance and return its stamp.
    pub fn admit(&mut self) -> (Seq1, LogicalTime) {
        let seq = self.head.next();
        self.head = Seq0::new(seq.get());
        (seq, LogicalTime::new(seq.get()))
    }
}
