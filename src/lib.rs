//! Roster
//!
//! Roster is the storage-free core of a multi-tenant lesson booking backend: lesson and deposit
//! state machines, business-day slot tiling, plan limits and typed tenant settings.

pub mod cancellation;
pub mod deposits;
pub mod errors;
pub mod lessons;
pub mod limits;
pub mod phone;
pub mod prelude;
pub mod settings;
pub mod slots;

pub use errors::ErrorKind;
pub use settings::TenantSettings;
