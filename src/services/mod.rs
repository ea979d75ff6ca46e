//! Business logic services.

pub mod auth;
pub mod billing;
pub mod customer;
pub mod usage;
