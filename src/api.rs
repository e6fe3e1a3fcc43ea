//! Canonical output schemas for whatever transport hosts this core.
//!
//! These types are the truthful boundary: no lossy "view" structs that
//! silently drop information. The service layer serializes them as-is and
//! maps `ErrorOutput.code` to its transport's status codes.

use serde::{Deserialize, Serialize};

use crate::core::{
    AccountId, ErrorCode, LogicalTime, ProductId, ProductRecord, RegistrationReceipt,
    RegistryError, RegistryState, SaleReceipt, Seq1, Sha256,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterOutput {
    pub product_id: ProductId,
    pub seq: Seq1,
    pub logical_time: LogicalTime,
}

impl From<RegistrationReceipt> for RegisterOutput {
    fn from(receipt: RegistrationReceipt) -> Self {
        Self {
            product_id: receipt.product_id,
            seq: receipt.seq,
            logical_time: receipt.at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellOutput {
    pub product_id: ProductId,
    pub previous_owner: AccountId,
    pub new_owner: AccountId,
    pub seq: Seq1,
    pub logical_time: LogicalTime,
}

impl From<SaleReceipt> for SellOutput {
    fn from(receipt: SaleReceipt) -> Self {
        Self {
            product_id: receipt.product_id,
            previous_owner: receipt.previous_owner,
            new_owner: receipt.new_owner,
            seq: receipt.seq,
            logical_time: receipt.at,
        }
    }
}

/// Buyer-facing verification view: the full record plus the genuineness
/// verdict the verification front end renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutput {
    #[serde(flatten)]
    pub record: ProductRecord,
    /// True whenever a record exists; an absent record is `NotFound`, not a
    /// `false` here.
    pub is_genuine: bool,
}

impl From<ProductRecord> for VerifyOutput {
    fn from(record: ProductRecord) -> Self {
        Self {
            record,
            is_genuine: true,
        }
    }
}

/// Registry-wide summary for dashboards and replication health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOutput {
    pub total_products: usize,
    pub head_seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_sha256: Option<Sha256>,
}

impl From<&RegistryState> for StatusOutput {
    fn from(state: &RegistryState) -> Self {
        Self {
            total_products: state.total_count(),
            head_seq: state.log().head_seq().get(),
            head_sha256: state.log().head_sha256(),
        }
    }
}

/// Wire form of a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&RegistryError> for ErrorOutput {
    fn from(err: &RegistryError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}
