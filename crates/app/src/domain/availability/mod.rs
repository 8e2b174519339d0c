//! Availability
//!
//! Slot listing and the booking-time availability check share one blocking predicate,
//! [`roster::slots::is_blocked`], so a slot offered as free is judged the same way when it is
//! claimed.

pub mod errors;
pub(crate) mod repository;
pub mod service;

pub use errors::AvailabilityServiceError;
pub use service::*;
