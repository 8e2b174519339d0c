//! Deposits
//!
//! Deposit status vocabulary, the mapping from the payment collaborator's vocabulary onto it,
//! and the deposit amount arithmetic.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use thiserror::Error;

/// Deposit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Submitted, awaiting verification.
    Pending,

    /// Verified as received.
    Confirmed,

    /// Verified as not received.
    Failed,
}

/// Status reported by a payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment created but not settled.
    Created,

    /// Payment settled.
    Confirmed,

    /// Payment rejected.
    Failed,
}

/// Outcome of applying a requested deposit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositChange {
    /// The deposit already holds the requested status; nothing to do.
    Unchanged,

    /// The deposit moves from one status to another.
    Changed {
        /// Previous status.
        from: DepositStatus,

        /// New status.
        to: DepositStatus,
    },
}

/// A forbidden deposit status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deposit cannot move from {from} to {to}")]
pub struct DepositTransitionError {
    /// Current status.
    pub from: DepositStatus,

    /// Requested status.
    pub to: DepositStatus,
}

/// Unrecognised deposit status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown deposit status '{0}'")]
pub struct UnknownDepositStatus(pub String);

/// Deposit percentage outside `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deposit percentage {0} is outside 0..=100")]
pub struct InvalidDepositPercentage(pub i64);

impl DepositStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }

    /// Work out what applying `requested` to a deposit currently in this status means.
    ///
    /// Re-applying the current status is a no-op. Verification outcomes (`confirmed`, `failed`)
    /// may be applied from any status, including a previously verified one: verification is an
    /// administrator action and is trusted.
    ///
    /// # Errors
    ///
    /// Returns [`DepositTransitionError`] when asked to move a verified deposit back to
    /// `pending`.
    pub const fn change_to(
        self,
        requested: Self,
    ) -> Result<DepositChange, DepositTransitionError> {
        match (self, requested) {
            (Self::Pending, Self::Pending)
            | (Self::Confirmed, Self::Confirmed)
            | (Self::Failed, Self::Failed) => Ok(DepositChange::Unchanged),
            (_, Self::Pending) => Err(DepositTransitionError {
                from: self,
                to: requested,
            }),
            (from, to) => Ok(DepositChange::Changed { from, to }),
        }
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositStatus {
    type Err = UnknownDepositStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownDepositStatus(other.to_string())),
        }
    }
}

impl PaymentStatus {
    /// Parse a provider status code, treating anything unrecognised as still `created`.
    pub fn from_provider(code: &str) -> Self {
        if code.eq_ignore_ascii_case("confirmed") {
            Self::Confirmed
        } else if code.eq_ignore_ascii_case("failed") {
            Self::Failed
        } else {
            Self::Created
        }
    }
}

impl From<PaymentStatus> for DepositStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Created => Self::Pending,
            PaymentStatus::Confirmed => Self::Confirmed,
            PaymentStatus::Failed => Self::Failed,
        }
    }
}

/// Share of a lesson price taken as deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DepositPercentage(u8);

impl DepositPercentage {
    /// Create a percentage from whole percent points.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDepositPercentage`] when `points` is outside `0..=100`.
    pub fn new(points: i64) -> Result<Self, InvalidDepositPercentage> {
        u8::try_from(points)
            .ok()
            .filter(|points| *points <= 100)
            .map(Self)
            .ok_or(InvalidDepositPercentage(points))
    }

    /// Whole percent points.
    pub const fn points(self) -> u8 {
        self.0
    }

    /// Deposit owed on `price`, both in minor currency units.
    ///
    /// Computed once, when the deposit is recorded; half a minor unit rounds away from zero.
    pub fn of(self, price: u64) -> u64 {
        let amount = Decimal::from(price) * Decimal::from(self.0) / Decimal::ONE_HUNDRED;

        amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(price)
    }
}

impl Default for DepositPercentage {
    fn default() -> Self {
        Self(50)
    }
}

impl fmt::Display for DepositPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Render a minor-unit amount in the given currency, e.g. `$50.00`.
pub fn format_amount(amount: u64, currency: &'static Currency) -> String {
    let minor = i64::try_from(amount).unwrap_or(i64::MAX);

    Money::from_minor(minor, currency).to_string()
}
