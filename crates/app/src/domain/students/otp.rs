//! One-time codes

use jiff::{SignedDuration, Timestamp};
use rand::Rng;

/// How long a code stays valid after it is issued.
pub(crate) const OTP_TTL: SignedDuration = SignedDuration::from_mins(10);

/// A fresh six digit code.
pub(crate) fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);

    format!("{code:06}")
}

/// Whether `submitted` matches a stored code that has not yet expired.
pub(crate) fn is_valid(
    stored: Option<&str>,
    expires_at: Option<Timestamp>,
    submitted: &str,
    now: Timestamp,
) -> bool {
    match (stored, expires_at) {
        (Some(stored), Some(expires_at)) => stored == submitted.trim() && now <= expires_at,
        _ => false,
    }
}
