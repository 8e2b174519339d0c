//! Slots
//!
//! A business day is tiled into back-to-back windows of the lesson duration, starting at the
//! tenant's opening time. Every window that starts before closing time is offered, so when the
//! opening hours are not a multiple of the duration the last window runs past closing.

use jiff::{
    SignedDuration, Timestamp,
    civil::{Date, Time},
    tz::TimeZone,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lessons::LessonStatus;

/// Errors building a slot grid.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Lesson duration must be a positive number of minutes.
    #[error("slot duration must be positive, got {0} minutes")]
    InvalidDuration(i64),

    /// Opening time must precede closing time.
    #[error("business hours start {start} is not before end {end}")]
    InvalidBusinessHours {
        /// Opening time.
        start: Time,

        /// Closing time.
        end: Time,
    },

    /// Date/time arithmetic or time zone resolution failed.
    #[error(transparent)]
    Time(#[from] jiff::Error),
}

/// Daily opening hours, in the tenant's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// Opening time.
    pub start: Time,

    /// Closing time.
    pub end: Time,
}

impl BusinessHours {
    /// Create business hours, validating that they are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::InvalidBusinessHours`] when `start` is not before `end`.
    pub fn new(start: Time, end: Time) -> Result<Self, SlotError> {
        if start >= end {
            return Err(SlotError::InvalidBusinessHours { start, end });
        }

        Ok(Self { start, end })
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start: Time::constant(8, 0, 0, 0),
            end: Time::constant(18, 0, 0, 0),
        }
    }
}

/// A candidate booking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotWindow {
    /// Window start, which is the lesson's scheduled timestamp.
    pub start: Timestamp,

    /// Window end (start plus lesson duration).
    pub end: Timestamp,
}

/// A window annotated with availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Window start.
    pub start: Timestamp,

    /// Window end.
    pub end: Timestamp,

    /// Whether no blocking lesson occupies the start timestamp.
    pub available: bool,
}

/// Tile `date`'s business hours into windows of `duration_minutes`.
///
/// # Errors
///
/// Returns an error for a non-positive duration, or when the local times cannot be resolved in
/// `tz`.
pub fn tile_business_day(
    date: Date,
    hours: BusinessHours,
    tz: &TimeZone,
    duration_minutes: i64,
) -> Result<Vec<SlotWindow>, SlotError> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }

    let step = SignedDuration::from_mins(duration_minutes);

    let open = date.to_datetime(hours.start).to_zoned(tz.clone())?.timestamp();
    let close = date.to_datetime(hours.end).to_zoned(tz.clone())?.timestamp();

    let mut windows = Vec::new();
    let mut start = open;

    while start < close {
        let end = start.checked_add(step)?;

        windows.push(SlotWindow { start, end });

        start = end;
    }

    Ok(windows)
}

/// The instants a local calendar day begins and ends, in `tz`.
///
/// # Errors
///
/// Returns an error when the day boundaries cannot be resolved in `tz`.
pub fn day_bounds(date: Date, tz: &TimeZone) -> Result<(Timestamp, Timestamp), SlotError> {
    let start = date.to_zoned(tz.clone())?;
    let end = start.tomorrow()?;

    Ok((start.timestamp(), end.timestamp()))
}

/// Whether any of the lessons at a timestamp blocks it.
pub fn is_blocked<I>(statuses: I) -> bool
where
    I: IntoIterator<Item = LessonStatus>,
{
    statuses.into_iter().any(LessonStatus::is_blocking)
}

/// Mark each window available unless a blocking lesson starts exactly at its start.
///
/// `booked` holds the scheduled timestamp and status of every lesson the instructor has on the
/// day, whatever its status.
pub fn mark_availability(
    windows: &[SlotWindow],
    booked: &[(Timestamp, LessonStatus)],
) -> Vec<Slot> {
    windows
        .iter()
        .map(|window| Slot {
            start: window.start,
            end: window.end,
            available: !is_blocked(
                booked
                    .iter()
                    .filter(|(at, _)| *at == window.start)
                    .map(|(_, status)| *status),
            ),
        })
        .collect()
}
