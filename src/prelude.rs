//! Roster prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cancellation::CancellationAdvisory,
    deposits::{
        DepositChange, DepositPercentage, DepositStatus, DepositTransitionError,
        InvalidDepositPercentage, PaymentStatus, UnknownDepositStatus, format_amount,
    },
    errors::ErrorKind,
    lessons::{BLOCKING_STATUSES, LessonStatus, TransitionError, UnknownLessonStatus},
    limits::{LimitKind, PlanLimits, UnknownLimit, month_start},
    phone::{PhoneError, PhoneNumber},
    settings::{SettingsError, TenantSettings},
    slots::{
        BusinessHours, Slot, SlotError, SlotWindow, day_bounds, is_blocked, mark_availability,
        tile_business_day,
    },
};
