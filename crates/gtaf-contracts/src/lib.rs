//! # gtaf-contracts
//!
//! Shared types and contracts for the GTAF runtime enforcement gate.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod artifact;
pub mod context;
pub mod drc;
pub mod error;
pub mod record;
pub mod result;
pub mod validation;
