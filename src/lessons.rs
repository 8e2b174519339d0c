//! Lesson Lifecycle
//!
//! A lesson starts in [`LessonStatus::PendingDeposit`] and moves forward only:
//!
//! ```text
//! pending_deposit -> confirmed -> in_progress -> completed
//!        \               \             \
//!         +---------------+-------------+--> cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

/// Lesson status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    /// Booked, waiting for a confirmed deposit.
    PendingDeposit,

    /// Deposit confirmed.
    Confirmed,

    /// Lesson under way.
    InProgress,

    /// Lesson delivered.
    Completed,

    /// Lesson cancelled.
    Cancelled,
}

/// Statuses that occupy an instructor's slot.
pub const BLOCKING_STATUSES: [LessonStatus; 3] = [
    LessonStatus::PendingDeposit,
    LessonStatus::Confirmed,
    LessonStatus::InProgress,
];

/// A forbidden lesson status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("lesson cannot move from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: LessonStatus,

    /// Requested status.
    pub to: LessonStatus,
}

/// Unrecognised status string read from storage or input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lesson status '{0}'")]
pub struct UnknownLessonStatus(pub String);

impl LessonStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingDeposit => "pending_deposit",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a lesson in this status prevents another booking at the same instructor and time.
    ///
    /// Slot listing and the booking-time recheck both go through this predicate.
    pub const fn is_blocking(self) -> bool {
        matches!(
            self,
            Self::PendingDeposit | Self::Confirmed | Self::InProgress
        )
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `next` is a legal successor of this status.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::PendingDeposit, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }

    /// Validate a move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when `next` is not a legal successor.
    pub const fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    /// Status after the lesson's deposit has been confirmed.
    ///
    /// A pending lesson becomes confirmed. A lesson that is already confirmed or under way keeps
    /// its status, since status never regresses.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for completed and cancelled lessons.
    pub const fn confirm_by_deposit(self) -> Result<Self, TransitionError> {
        match self {
            Self::PendingDeposit => Ok(Self::Confirmed),
            Self::Confirmed | Self::InProgress => Ok(self),
            Self::Completed | Self::Cancelled => Err(TransitionError {
                from: self,
                to: Self::Confirmed,
            }),
        }
    }

    /// Whether the lesson may still be moved to another time.
    pub const fn is_reschedulable(self) -> bool {
        matches!(self, Self::PendingDeposit | Self::Confirmed)
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = UnknownLessonStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_deposit" => Ok(Self::PendingDeposit),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownLessonStatus(other.to_string())),
        }
    }
}
