//! Deposit Data

use jiff::Timestamp;
use roster::deposits::DepositStatus;
use serde_json::Value;

use crate::domain::{deposits::records::DepositUuid, lessons::records::LessonUuid};

/// New Deposit
#[derive(Debug, Clone)]
pub struct NewDeposit {
    pub uuid: DepositUuid,
    pub lesson_uuid: LessonUuid,
    pub payment_reference: Option<String>,
}

/// Row to insert once the amount and initial status are known.
#[derive(Debug, Clone)]
pub(crate) struct DepositRow {
    pub uuid: DepositUuid,
    pub lesson_uuid: LessonUuid,
    pub amount: i64,
    pub currency: &'static str,
    pub payment_reference: Option<String>,
    pub transaction_id: Option<String>,
    pub receipt: Option<Value>,
    pub status: DepositStatus,
    pub verified_at: Option<Timestamp>,
}
