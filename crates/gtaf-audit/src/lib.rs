//! # gtaf-audit
//!
//! Append-only, SHA-256 hash-chained decision log for the GTAF runtime gate.
//!
//! ## Overview
//!
//! Every decision an `AuditedEnforcer` makes is wrapped in a `DecisionEvent`
//! that links to the previous event via its SHA-256 hash. Tampering with any
//! stored event breaks the chain and is detected by `verify_chain`.
//!
//! The gate stays stateless: the log is a collaborator the caller owns and
//! hands to the gate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gtaf_audit::InMemoryDecisionLog;
//! use gtaf_core::{AuditedEnforcer, Enforcer, Gate};
//!
//! let log = InMemoryDecisionLog::new("gate-payments");
//! let gate = AuditedEnforcer::new("gate-payments", Enforcer::default(), Box::new(log.clone()));
//! let result = gate.enforce(&drc, &context, &pool, now);
//! gate.close()?;
//!
//! assert!(log.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{DecisionEvent, DecisionLog};
pub use memory::InMemoryDecisionLog;

// ── Tests ─────────────────────────────────────────────────────────────────────
