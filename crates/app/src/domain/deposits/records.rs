//! Deposit Records

use jiff::Timestamp;
use roster::deposits::DepositStatus;
use serde::Serialize;
use serde_json::Value;

use crate::{domain::lessons::records::LessonUuid, uuids::TypedUuid};

/// Deposit UUID
pub type DepositUuid = TypedUuid<DepositRecord>;

/// Deposit Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositRecord {
    pub uuid: DepositUuid,
    pub lesson_uuid: LessonUuid,

    /// Amount in minor currency units, fixed when the deposit was recorded.
    pub amount: u64,

    /// ISO 4217 code.
    pub currency: String,

    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub receipt: Option<Value>,
    pub status: DepositStatus,

    /// When the deposit was last confirmed or failed.
    pub verified_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
