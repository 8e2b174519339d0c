//! Student Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Student UUID
pub type StudentUuid = TypedUuid<StudentRecord>;

/// Student Record
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    pub uuid: StudentUuid,

    /// Unique within the tenant.
    pub phone: String,

    pub name: Option<String>,

    /// Set once the student has proven ownership of the phone number.
    pub otp_verified: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Pending one-time code for a student, locked for verification.
#[derive(Debug, Clone)]
pub(crate) struct PendingOtp {
    pub uuid: StudentUuid,
    pub code: Option<String>,
    pub expires_at: Option<Timestamp>,
}
