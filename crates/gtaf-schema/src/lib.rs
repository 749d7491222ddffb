//! # gtaf-schema
//!
//! Wire contracts for the GTAF runtime gate.
//!
//! This crate ships the JSON Schema documents for the five projection v0.1
//! contracts (DRC, runtime context, system boundary, decision record,
//! rulebook), a validator over them, and a loader for the projection
//! fixture matrix.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use gtaf_schema::ContractSchemas;
//!
//! let schemas = ContractSchemas::new()?;
//! let report = schemas.validate_bundle(&drc, &context, &pool);
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod engine;
pub mod fixture;

pub use engine::{contract_for, schema_document, ContractSchemas};
pub use fixture::{default_root, load_all, load_case, Expectation, FixtureCase, CASE_NAMES};
