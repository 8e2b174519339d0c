//! Lessons
//!
//! The booking lifecycle: creating a lesson claims an instructor's slot, and the lesson then
//! moves through the forward-only status graph in [`roster::lessons`].

pub mod data;
pub mod errors;
pub(crate) mod events;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::BookingsServiceError;
pub use service::*;
