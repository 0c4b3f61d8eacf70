//! Shared types and models for the Farm Weather service
//!
//! This crate holds the domain model and the pure decision rules (condition
//! classification, settings validation). It performs no I/O, so the backend
//! and any future client can depend on it freely.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
