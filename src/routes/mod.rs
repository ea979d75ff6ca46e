//! Route definitions for the Hydrobill API.

pub mod health;
pub mod usage;
