//! Students

pub mod data;
pub mod errors;
pub(crate) mod otp;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::StudentsServiceError;
pub use service::*;
