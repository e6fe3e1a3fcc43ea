//! Layer 2: Product record
//!
//! Per-product state: provenance (immutable) + ownership (mutated by sales).

use serde::{Deserialize, Serialize};

use super::identity::{AccountId, ProductId};
use super::sequence::Seq1;
use super::time::LogicalTime;

/// One registered product.
///
/// `manufacturer`, `registered_at`, and `registered_seq` are provenance:
/// set once at registration, never changed. Sales touch only
/// `current_owner`, `is_sold`, and `transfer_count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: ProductId,
    pub manufacturer: AccountId,
    pub registered_at: LogicalTime,
    pub registered_seq: Seq1,
    /// True from the moment registration succeeds; records are never
    /// deleted, so this never reverts. Kept explicit for wire parity with
    /// verification consumers.
    pub is_registered: bool,
    /// True once any sale has been accepted; idempotent thereafter.
    pub is_sold: bool,
    pub current_owner: AccountId,
    /// Number of accepted sales. Not part of the original record shape, but
    /// audit consumers want it and it falls out of the sale path for free.
    pub transfer_count: u64,
}

impl ProductRecord {
    /// A fresh record: the manufacturer is the initial owner.
    pub fn new(
        product_id: ProductId,
        manufacturer: AccountId,
        registered_seq: Seq1,
        registered_at: LogicalTime,
    ) -> Self {
        Self {
            product_id,
            current_owner: manufacturer.clone(),
            manufacturer,
            registered_at,
            registered_seq,
            is_registered: true,
            is_sold: false,
            transfer_count: 0,
        }
    }

    /// Apply an accepted sale. Caller has already authorized and validated;
    /// this is the mutation step only.
    pub(crate) fn apply_sale(&mut self, new_owner: AccountId) -> AccountId {
        let previous = std::mem::replace(&mut self.current_owner, new_owner);
        self.is_sold = true;
        self.transfer_count += 1;
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::Seq0;

    fn record() -> ProductRecord {
        ProductRecord::new(
            ProductId::parse("IMEI-1").unwrap(),
            AccountId::parse("0xmanu").unwrap(),
            Seq0::ZERO.next(),
            LogicalTime::new(1),
        )
    }

    #[test]
    fn new_record_is_owned_by_manufacturer() {
        let rec = record();
        assert_eq!(rec.current_owner, rec.manufacturer);
        assert!(rec.is_registered);
        assert!(!rec.is_sold);
        assert_eq!(rec.transfer_count, 0);
    }

    #[test]
    fn sale_moves_ownership_and_sets_sold() {
        let mut rec = record();
        let buyer = AccountId::parse("0xbuyer").unwrap();

        let previous = rec.apply_sale(buyer.clone());
        assert_eq!(previous, rec.manufacturer);
        assert_eq!(rec.current_owner, buyer);
        assert!(rec.is_sold);
        assert_eq!(rec.transfer_count, 1);

        // Provenance untouched.
        assert_eq!(rec.registered_at, LogicalTime::new(1));
    }
}
