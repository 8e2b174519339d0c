//! Deposits
//!
//! One deposit per lesson. Confirming a deposit confirms its lesson in the same transaction,
//! so the two are never observed out of step.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::DepositsServiceError;
pub use service::*;
