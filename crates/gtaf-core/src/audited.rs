//! A gate that records every decision it makes.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{error, info};

use gtaf_contracts::{
    artifact::ArtifactPool,
    context::RuntimeContext,
    error::GtafResult,
    record::{EvaluationId, EvaluationRecord},
    result::{EnforcementResult, Outcome, ReasonCode},
};

use crate::{
    enforcer::Enforcer,
    traits::{DecisionAuditWriter, Gate},
};

/// Wraps an `Enforcer` with a caller-owned audit sink.
///
/// Every call writes exactly one `EvaluationRecord`. If the write fails the
/// decision is replaced with `DENY / INTERNAL_ERROR`: an unrecorded decision
/// never executes.
pub struct AuditedEnforcer {
    gate_id: String,
    enforcer: Enforcer,
    audit: Box<dyn DecisionAuditWriter>,
}

impl AuditedEnforcer {
    pub fn new(gate_id: impl Into<String>, enforcer: Enforcer, audit: Box<dyn DecisionAuditWriter>) -> Self {
        Self {
            gate_id: gate_id.into(),
            enforcer,
            audit,
        }
    }

    pub fn gate_id(&self) -> &str {
        &self.gate_id
    }

    /// Seal the audit trail. Call once when the gate is retired.
    pub fn close(&self) -> GtafResult<()> {
        info!(gate_id = %self.gate_id, "closing audited gate");
        self.audit.finalize(&self.gate_id)
    }
}

impl Gate for AuditedEnforcer {
    fn enforce(
        &self,
        drc: &Value,
        context: &RuntimeContext,
        pool: &ArtifactPool,
        now: DateTime<Utc>,
    ) -> EnforcementResult {
        let result = self.enforcer.evaluate_at(drc, context, pool, now);

        let record = EvaluationRecord {
            evaluation_id: EvaluationId::new(),
            evaluated_at: now,
            context: context.clone(),
            result: result.clone(),
        };

        match self.audit.write(&record) {
            Ok(()) => result,
            Err(err) => {
                error!(
                    gate_id = %self.gate_id,
                    drc_id = ?result.drc_id,
                    error = %err,
                    "decision could not be audited, denying"
                );
                EnforcementResult {
                    outcome: Outcome::Deny,
                    reason_code: ReasonCode::InternalError,
                    details: Map::new(),
                    ..result
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use serde_json::json;

    use gtaf_contracts::error::{GtafError, GtafResult};

    use super::*;

    /// An audit writer that records every call, or fails every write.
    struct MockAudit {
        records: Arc<Mutex<Vec<EvaluationRecord>>>,
        finalized: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl MockAudit {
        fn new(fail: bool) -> Self {
            Self {
                records: Arc::new(Mutex::new(vec![])),
                finalized: Arc::new(Mutex::new(vec![])),
                fail,
            }
        }
    }

    impl DecisionAuditWriter for MockAudit {
        fn write(&self, record: &EvaluationRecord) -> GtafResult<()> {
            if self.fail {
                return Err(GtafError::AuditWriteFailed {
                    reason: "disk full".to_string(),
                });
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn finalize(&self, gate_id: &str) -> GtafResult<()> {
            self.finalized.lock().unwrap().push(gate_id.to_string());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).unwrap()
    }

    fn inputs() -> (Value, RuntimeContext, ArtifactPool) {
        let drc = json!({
            "id": "DRC-002",
            "revision": 1,
            "result": "PERMITTED",
            "gtaf_ref": { "version": "0.1" },
            "scope": "ops.prod",
            "valid_from": "2026-01-01T00:00:00Z",
            "valid_until": "2026-12-31T00:00:00Z",
            "refs": { "sb": ["SB-002"], "dr": ["DR-0002"], "rb": [] }
        });
        let pool: ArtifactPool = [
            (
                "SB-002",
                json!({
                    "scope": "ops.prod",
                    "included_components": ["ops.agent"],
                    "allowed_interfaces": ["ops-api"],
                    "valid_from": "2026-01-01T00:00:00Z",
                    "valid_until": "2026-12-31T00:00:00Z"
                }),
            ),
            (
                "DR-0002",
                json!({
                    "scope": "ops.prod",
                    "decisions": ["restart_worker"],
                    "delegation_mode": "MANUAL",
                    "valid_from": "2026-01-01T00:00:00Z",
                    "valid_until": "2026-12-31T00:00:00Z"
                }),
            ),
        ]
        .into_iter()
        .collect();
        let ctx = RuntimeContext::new("ops.prod", "ops.agent", "ops-api", "restart_worker");
        (drc, ctx, pool)
    }

    #[test]
    fn every_decision_is_recorded() {
        let audit = MockAudit::new(false);
        let records = audit.records.clone();
        let gate = AuditedEnforcer::new("gate-ops", Enforcer::default(), Box::new(audit));

        let (drc, ctx, pool) = inputs();
        let allowed = gate.enforce(&drc, &ctx, &pool, now());

        let mut denied_ctx = ctx.clone();
        denied_ctx.action = Some("drop_database".to_string());
        let denied = gate.enforce(&drc, &denied_ctx, &pool, now());

        assert_eq!(allowed.reason_code, ReasonCode::Ok);
        assert_eq!(denied.reason_code, ReasonCode::DrMismatch);

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 2, "both EXECUTE and DENY must be audited");
        assert_eq!(records[0].result, allowed);
        assert_eq!(records[1].context.action.as_deref(), Some("drop_database"));
        assert_eq!(records[0].evaluated_at, now());
        assert_ne!(records[0].evaluation_id, records[1].evaluation_id);
    }

    #[test]
    fn failed_audit_write_denies() {
        let gate = AuditedEnforcer::new("gate-ops", Enforcer::default(), Box::new(MockAudit::new(true)));

        let (drc, ctx, pool) = inputs();
        let result = gate.enforce(&drc, &ctx, &pool, now());

        assert_eq!(result.outcome, Outcome::Deny);
        assert_eq!(result.reason_code, ReasonCode::InternalError);
        assert_eq!(result.drc_id.as_deref(), Some("DRC-002"));
    }

    #[test]
    fn close_finalizes_with_gate_id() {
        let audit = MockAudit::new(false);
        let finalized = audit.finalized.clone();
        let gate = AuditedEnforcer::new("gate-ops", Enforcer::default(), Box::new(audit));

        gate.close().unwrap();
        assert_eq!(*finalized.lock().unwrap(), vec!["gate-ops".to_string()]);
        assert_eq!(gate.gate_id(), "gate-ops");
    }
}
