//! Tenant Settings
//!
//! Tenants store their configuration as string key/value pairs. [`TenantSettings`] is the typed
//! view of that map, with defaults for every key a tenant has not set.

use jiff::{civil::Time, tz::TimeZone};
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{deposits::DepositPercentage, slots::BusinessHours};

/// Configuration key for opening hours (JSON `{"start":"HH:MM","end":"HH:MM"}`).
pub const BUSINESS_HOURS: &str = "business_hours";

/// Configuration key for the cancellation notice period in hours.
pub const CANCELLATION_HOURS: &str = "cancellation_hours";

/// Configuration key for the deposit percentage.
pub const DEPOSIT_PERCENTAGE: &str = "deposit_percentage";

/// Configuration key for the ISO 4217 currency code.
pub const CURRENCY: &str = "currency";

/// Configuration key for the IANA time zone name.
pub const TIMEZONE: &str = "timezone";

/// Configuration key for the advisory gap between bookings, in minutes.
pub const BOOKING_BUFFER_MINUTES: &str = "booking_buffer_minutes";

/// Configuration key toggling online payment.
pub const ONLINE_PAYMENT_ENABLED: &str = "online_payment_enabled";

const DEFAULT_CANCELLATION_HOURS: u32 = 24;
const DEFAULT_CURRENCY: &str = "AUD";
const DEFAULT_TIMEZONE: &str = "Australia/Sydney";
const DEFAULT_BOOKING_BUFFER_MINUTES: u32 = 30;

/// A stored configuration value that could not be interpreted.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for setting '{key}': {reason}")]
pub struct SettingsError {
    /// Configuration key.
    pub key: &'static str,

    /// Offending raw value.
    pub value: String,

    /// What was wrong with it.
    pub reason: String,
}

impl SettingsError {
    fn new(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct StoredHours {
    start: String,
    end: String,
}

/// Typed tenant configuration.
#[derive(Debug, Clone)]
pub struct TenantSettings {
    /// Daily opening hours in local time.
    pub business_hours: BusinessHours,

    /// Notice, in hours, below which a cancellation is flagged as late.
    pub cancellation_hours: u32,

    /// Share of the lesson price taken as a deposit.
    pub deposit_percentage: DepositPercentage,

    /// Currency prices and deposits are denominated in.
    pub currency: &'static Currency,

    /// Time zone the business operates in.
    pub timezone: TimeZone,

    /// Advisory gap between bookings, in minutes. Not enforced by slot generation.
    pub booking_buffer_minutes: u32,

    /// Whether online deposit payment is offered.
    pub online_payment_enabled: bool,
}

impl TenantSettings {
    /// Build settings from a tenant's stored configuration, defaulting absent keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a stored value is present but malformed.
    pub fn from_map(config: &FxHashMap<String, String>) -> Result<Self, SettingsError> {
        let get = |key: &str| config.get(key).map(String::as_str);

        let business_hours = get(BUSINESS_HOURS)
            .map(parse_business_hours)
            .transpose()?
            .unwrap_or_default();

        let cancellation_hours = get(CANCELLATION_HOURS)
            .map(|raw| parse_u32(CANCELLATION_HOURS, raw))
            .transpose()?
            .unwrap_or(DEFAULT_CANCELLATION_HOURS);

        let deposit_percentage = get(DEPOSIT_PERCENTAGE)
            .map(parse_deposit_percentage)
            .transpose()?
            .unwrap_or_default();

        let currency = parse_currency(get(CURRENCY).unwrap_or(DEFAULT_CURRENCY))?;
        let timezone = parse_timezone(get(TIMEZONE).unwrap_or(DEFAULT_TIMEZONE))?;

        let booking_buffer_minutes = get(BOOKING_BUFFER_MINUTES)
            .map(|raw| parse_u32(BOOKING_BUFFER_MINUTES, raw))
            .transpose()?
            .unwrap_or(DEFAULT_BOOKING_BUFFER_MINUTES);

        let online_payment_enabled = get(ONLINE_PAYMENT_ENABLED)
            .map(|raw| parse_bool(ONLINE_PAYMENT_ENABLED, raw))
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            business_hours,
            cancellation_hours,
            deposit_percentage,
            currency,
            timezone,
            booking_buffer_minutes,
            online_payment_enabled,
        })
    }

    /// Check a single value before it is stored.
    ///
    /// Keys this type does not interpret are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when `value` is not valid for `key`.
    pub fn validate(key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            BUSINESS_HOURS => parse_business_hours(value).map(drop),
            CANCELLATION_HOURS => parse_u32(CANCELLATION_HOURS, value).map(drop),
            DEPOSIT_PERCENTAGE => parse_deposit_percentage(value).map(drop),
            CURRENCY => parse_currency(value).map(drop),
            TIMEZONE => parse_timezone(value).map(drop),
            BOOKING_BUFFER_MINUTES => parse_u32(BOOKING_BUFFER_MINUTES, value).map(drop),
            ONLINE_PAYMENT_ENABLED => parse_bool(ONLINE_PAYMENT_ENABLED, value).map(drop),
            _ => Ok(()),
        }
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            business_hours: BusinessHours::default(),
            cancellation_hours: DEFAULT_CANCELLATION_HOURS,
            deposit_percentage: DepositPercentage::default(),
            currency: iso::AUD,
            timezone: TimeZone::get(DEFAULT_TIMEZONE).unwrap_or(TimeZone::UTC),
            booking_buffer_minutes: DEFAULT_BOOKING_BUFFER_MINUTES,
            online_payment_enabled: true,
        }
    }
}

fn parse_business_hours(raw: &str) -> Result<BusinessHours, SettingsError> {
    let stored: StoredHours =
        serde_json::from_str(raw).map_err(|err| SettingsError::new(BUSINESS_HOURS, raw, err))?;

    let start: Time = stored
        .start
        .parse()
        .map_err(|err| SettingsError::new(BUSINESS_HOURS, raw, err))?;

    let end: Time = stored
        .end
        .parse()
        .map_err(|err| SettingsError::new(BUSINESS_HOURS, raw, err))?;

    BusinessHours::new(start, end).map_err(|err| SettingsError::new(BUSINESS_HOURS, raw, err))
}

fn parse_u32(key: &'static str, raw: &str) -> Result<u32, SettingsError> {
    raw.trim()
        .parse()
        .map_err(|err| SettingsError::new(key, raw, err))
}

/// Exactly `true` or `false`; other spellings are rejected rather than read as `false`.
fn parse_bool(key: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(SettingsError::new(key, raw, "expected `true` or `false`")),
    }
}

fn parse_deposit_percentage(raw: &str) -> Result<DepositPercentage, SettingsError> {
    let points: i64 = raw
        .trim()
        .parse()
        .map_err(|err| SettingsError::new(DEPOSIT_PERCENTAGE, raw, err))?;

    DepositPercentage::new(points).map_err(|err| SettingsError::new(DEPOSIT_PERCENTAGE, raw, err))
}

fn parse_currency(raw: &str) -> Result<&'static Currency, SettingsError> {
    iso::find(raw.trim())
        .ok_or_else(|| SettingsError::new(CURRENCY, raw, "unknown ISO 4217 currency"))
}

fn parse_timezone(raw: &str) -> Result<TimeZone, SettingsError> {
    TimeZone::get(raw.trim()).map_err(|err| SettingsError::new(TIMEZONE, raw, err))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_config_uses_defaults() -> TestResult {
        let settings = TenantSettings::from_map(&FxHashMap::default())?;

        assert_eq!(settings.business_hours, BusinessHours::default());
        assert_eq!(settings.cancellation_hours, 24);
        assert_eq!(settings.deposit_percentage.points(), 50);
        assert_eq!(settings.currency.iso_alpha_code, "AUD");
        assert_eq!(settings.timezone.iana_name(), Some("Australia/Sydney"));
        assert_eq!(settings.booking_buffer_minutes, 30);
        assert!(settings.online_payment_enabled);

        Ok(())
    }

    #[test]
    fn stored_values_override_defaults() -> TestResult {
        let settings = TenantSettings::from_map(&config(&[
            (BUSINESS_HOURS, r#"{"start":"09:30","end":"17:00"}"#),
            (CANCELLATION_HOURS, "48"),
            (DEPOSIT_PERCENTAGE, "25"),
            (CURRENCY, "NZD"),
            (TIMEZONE, "Pacific/Auckland"),
            (ONLINE_PAYMENT_ENABLED, "false"),
        ]))?;

        assert_eq!(settings.business_hours.start, Time::constant(9, 30, 0, 0));
        assert_eq!(settings.business_hours.end, Time::constant(17, 0, 0, 0));
        assert_eq!(settings.cancellation_hours, 48);
        assert_eq!(settings.deposit_percentage.points(), 25);
        assert_eq!(settings.currency.iso_alpha_code, "NZD");
        assert_eq!(settings.timezone.iana_name(), Some("Pacific/Auckland"));
        assert!(!settings.online_payment_enabled);

        Ok(())
    }

    #[test]
    fn online_payment_flag_accepts_only_true_or_false() -> TestResult {
        let enabled = TenantSettings::from_map(&config(&[(ONLINE_PAYMENT_ENABLED, "true")]))?;
        assert!(enabled.online_payment_enabled);

        for raw in ["yes", "1", "TRUE", "True", "no", ""] {
            let result = TenantSettings::from_map(&config(&[(ONLINE_PAYMENT_ENABLED, raw)]));

            assert!(
                matches!(result, Err(SettingsError { key: ONLINE_PAYMENT_ENABLED, .. })),
                "{raw:?} should be rejected, got {result:?}"
            );
            assert!(TenantSettings::validate(ONLINE_PAYMENT_ENABLED, raw).is_err());
        }

        Ok(())
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (key, value) in [
            (BUSINESS_HOURS, "9 to 5"),
            (BUSINESS_HOURS, r#"{"start":"18:00","end":"08:00"}"#),
            (CANCELLATION_HOURS, "-1"),
            (DEPOSIT_PERCENTAGE, "150"),
            (CURRENCY, "XYZ"),
            (TIMEZONE, "Mars/Olympus_Mons"),
        ] {
            let result = TenantSettings::from_map(&config(&[(key, value)]));

            assert!(result.is_err(), "{key}={value} should be rejected");
            assert!(TenantSettings::validate(key, value).is_err());
        }
    }

    #[test]
    fn unknown_keys_validate() {
        assert!(TenantSettings::validate("welcome_message", "hello").is_ok());
    }
}
