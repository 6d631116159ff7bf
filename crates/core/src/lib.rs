//! Core business logic for the vv backend.
//!
//! The services here own every multi-row write. Anything that touches a
//! content row's counters together with a dependent row (reactions, comments,
//! playlist entries) runs inside one database transaction.

pub mod services;

pub use services::*;
