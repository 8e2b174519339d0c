//! Error Kinds

use std::fmt;

use serde::Serialize;

/// Stable, machine-checkable failure category shared by every service error.
///
/// The HTTP layer (or any other caller) maps these onto its own status vocabulary; the string
/// form returned by [`ErrorKind::as_str`] never changes between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Tenant, student, instructor, lesson type, lesson or deposit absent in the tenant scope.
    NotFound,

    /// Booking attempted by a student who has not completed OTP verification.
    Unverified,

    /// Tenant plan cap reached.
    LimitExceeded,

    /// The instructor already holds a blocking lesson at the requested timestamp.
    SlotConflict,

    /// The current status of a lesson or deposit forbids the requested operation.
    InvalidTransition,

    /// Missing or malformed input.
    ValidationError,

    /// A record with the same identity already exists.
    AlreadyExists,

    /// Underlying storage failure.
    StorageError,
}

impl ErrorKind {
    /// Stable snake-case code for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unverified => "unverified",
            Self::LimitExceeded => "limit_exceeded",
            Self::SlotConflict => "slot_conflict",
            Self::InvalidTransition => "invalid_transition",
            Self::ValidationError => "validation_error",
            Self::AlreadyExists => "already_exists",
            Self::StorageError => "storage_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
