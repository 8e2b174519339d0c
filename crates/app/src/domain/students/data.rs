//! Student Data

use jiff::Timestamp;

use crate::domain::students::records::{StudentRecord, StudentUuid};

/// New Student Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    /// UUID used if this phone has not registered before.
    pub uuid: StudentUuid,

    /// Raw phone number as entered.
    pub phone: String,

    pub name: Option<String>,
}

/// Outcome of a registration attempt.
///
/// The one-time code is handed back so the caller can deliver it to the student's phone.
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub student: StudentRecord,

    /// Whether this attempt created the student.
    pub created: bool,

    pub otp_code: String,
    pub otp_expires_at: Timestamp,
}
