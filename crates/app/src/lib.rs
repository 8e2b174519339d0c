//! Roster's PostgreSQL-backed services: tenant registry, availability, bookings and deposits.

pub mod context;
pub mod database;
pub mod domain;
pub mod uuids;

#[cfg(test)]
mod test;
