//! Database models and DTOs for all domain entities.

pub mod customer;
pub mod usage;
pub mod user;
