//! Audit records for gate evaluations.
//!
//! The gate is stateless. An `EvaluationRecord` is what a caller-owned
//! `DecisionAuditWriter` receives after each decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{context::RuntimeContext, result::EnforcementResult};

/// Unique identifier for a single recorded evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub uuid::Uuid);

impl EvaluationId {
    /// Create a new, unique evaluation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

/// One immutable entry in the decision audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluation_id: EvaluationId,
    /// The `now` the gate evaluated against, not the wall-clock write time.
    pub evaluated_at: DateTime<Utc>,
    /// The request that was gated.
    pub context: RuntimeContext,
    /// What the gate answered.
    pub result: EnforcementResult,
}
