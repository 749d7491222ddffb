//! Trait seams around the gate.
//!
//! - `Gate`: trusted decision point; never errors, never fails open
//! - `DecisionAuditWriter`: trusted sink; records every decision immutably
//!
//! The gate keeps no state between calls. Anything that must outlive one
//! evaluation (an audit trail) lives behind `DecisionAuditWriter` and is
//! owned by the caller.

use chrono::{DateTime, Utc};
use serde_json::Value;

use gtaf_contracts::{
    artifact::ArtifactPool, context::RuntimeContext, error::GtafResult, record::EvaluationRecord,
    result::EnforcementResult,
};

/// Answers: may this action, by this component, through this interface,
/// execute right now?
///
/// Implementations must be deterministic for identical inputs and `now`,
/// and must return `DENY` rather than propagate any failure.
pub trait Gate: Send + Sync {
    fn enforce(
        &self,
        drc: &Value,
        context: &RuntimeContext,
        pool: &ArtifactPool,
        now: DateTime<Utc>,
    ) -> EnforcementResult;
}

/// The decision audit trail.
///
/// Every evaluation routed through an audited gate produces exactly one
/// `EvaluationRecord`. A failed write is fatal for that decision: the
/// caller receives `DENY / INTERNAL_ERROR` instead of the gate's answer.
pub trait DecisionAuditWriter: Send + Sync {
    /// Append one record. Append-only; records are never modified.
    fn write(&self, record: &EvaluationRecord) -> GtafResult<()>;

    /// Seal the trail for `gate_id`. Implementations may flush or sign here.
    fn finalize(&self, gate_id: &str) -> GtafResult<()>;
}
