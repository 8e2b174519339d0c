//! Phone Numbers

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Phone number validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    /// No phone number supplied.
    #[error("phone number is required")]
    Missing,

    /// Not an optional `+` followed by 10 to 15 digits.
    #[error("invalid phone number format")]
    Invalid,
}

/// A phone number: an optional leading `+` followed by 10 to 15 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a raw phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] when the input is empty or malformed.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        if raw.is_empty() {
            return Err(PhoneError::Missing);
        }

        let digits = raw.strip_prefix('+').unwrap_or(raw);

        if !(10..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::Invalid);
        }

        Ok(Self(raw.to_string()))
    }

    /// The validated number.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the validated number.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
