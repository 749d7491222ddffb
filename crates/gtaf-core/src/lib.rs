//! # gtaf-core
//!
//! The deterministic runtime gate for GTAF decision record contracts.
//!
//! Given a DRC, a runtime context and a pool of supporting artifacts, the
//! gate answers one question: may this action, by this component, through
//! this interface, execute right now? The answer is `EXECUTE` or `DENY`
//! with a single, stable reason code.
//!
//! This crate provides:
//! - The `Gate` and `DecisionAuditWriter` traits
//! - The `Enforcer`, which runs the ordered pipeline behind a fail-closed
//!   boundary, and `AuditedEnforcer`, which records every decision
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gtaf_core::{evaluate, Enforcer};
//!
//! let result = evaluate(&drc, &context, &pool, None);
//! if result.is_execute() { /* run the action */ }
//! ```

pub mod audited;
pub mod checks;
pub mod enforcer;
pub mod pipeline;
pub mod resolve;
pub mod temporal;
pub mod traits;
pub mod validate;

pub use audited::AuditedEnforcer;
pub use enforcer::{evaluate, evaluate as enforce, Enforcer};
pub use traits::{DecisionAuditWriter, Gate};
