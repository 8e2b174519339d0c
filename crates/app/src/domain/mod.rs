//! Roster Domain Concerns

pub mod availability;
pub mod deposits;
pub mod instructors;
pub mod lesson_types;
pub mod lessons;
pub mod notifications;
pub mod payments;
pub mod students;
pub mod tenants;
