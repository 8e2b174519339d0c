//! Payment Gateway

use async_trait::async_trait;
use mockall::automock;
use roster::deposits::PaymentStatus;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::lessons::records::LessonUuid;

/// A deposit payment to collect.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Amount in minor currency units.
    pub amount: u64,

    /// ISO 4217 code.
    pub currency: String,

    /// Reference the payer quotes, e.g. a bank transfer reference.
    pub reference: String,

    pub lesson_uuid: LessonUuid,
}

/// What the provider reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub receipt: Option<Value>,
}

impl PaymentResult {
    /// Result recorded when the provider could not be reached or errored.
    pub const fn failed() -> Self {
        Self {
            status: PaymentStatus::Failed,
            transaction_id: None,
            receipt: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment provider unavailable")]
    Unavailable,

    #[error("payment provider error: {0}")]
    Provider(String),
}

#[automock]
#[async_trait]
/// Collects deposit payments.
///
/// An error is treated by callers exactly like a `failed` payment.
pub trait PaymentGateway: Send + Sync {
    async fn process(&self, request: &PaymentRequest) -> Result<PaymentResult, PaymentGatewayError>;
}

/// Gateway for manually reconciled payments such as bank transfers.
///
/// Every payment is accepted as `created` under the payer's reference, to be confirmed or
/// failed later by staff.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTransferGateway;

#[async_trait]
impl PaymentGateway for ManualTransferGateway {
    async fn process(&self, request: &PaymentRequest) -> Result<PaymentResult, PaymentGatewayError> {
        Ok(PaymentResult {
            status: PaymentStatus::Created,
            transaction_id: Some(request.reference.clone()),
            receipt: Some(json!({
                "method": "manual_transfer",
                "amount": request.amount,
                "currency": request.currency,
                "reference": request.reference,
            })),
        })
    }
}
