//! Wire-contract validation against the shipped JSON Schema documents.
//!
//! `ContractSchemas` validates an instance in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic**: `valid_from` / `valid_until` must parse with the same
//!    timestamp parser the gate uses. `format: date-time` is an annotation
//!    under draft 2020-12, so the structural phase alone would let a
//!    malformed timestamp through.
//!
//! All failures are accumulated so a contract author sees the full failure
//! set in one pass. This is a tooling concern: the gate never calls it and
//! its verdict never depends on it.

use std::collections::HashMap;

use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use gtaf_contracts::{
    artifact::{ArtifactKind, ArtifactPool},
    error::{GtafError, GtafResult},
    validation::{ContractKind, ValidationFailure, ValidationReport},
};
use gtaf_core::temporal::parse_timestamp;

const DRC_SCHEMA: &str = include_str!("../schemas/drc.schema.json");
const RUNTIME_CONTEXT_SCHEMA: &str = include_str!("../schemas/runtime_context.schema.json");
const SB_SCHEMA: &str = include_str!("../schemas/sb.schema.json");
const DR_SCHEMA: &str = include_str!("../schemas/dr.schema.json");
const RB_SCHEMA: &str = include_str!("../schemas/rb.schema.json");

const TIMESTAMP_FIELDS: [&str; 2] = ["valid_from", "valid_until"];

/// The raw schema document for `kind`.
pub fn schema_document(kind: ContractKind) -> &'static str {
    match kind {
        ContractKind::Drc => DRC_SCHEMA,
        ContractKind::RuntimeContext => RUNTIME_CONTEXT_SCHEMA,
        ContractKind::SystemBoundary => SB_SCHEMA,
        ContractKind::DecisionRecord => DR_SCHEMA,
        ContractKind::Rulebook => RB_SCHEMA,
    }
}

/// The contract an artifact is validated against when a ref group names it.
pub fn contract_for(kind: ArtifactKind) -> ContractKind {
    match kind {
        ArtifactKind::SystemBoundary => ContractKind::SystemBoundary,
        ArtifactKind::DecisionRecord => ContractKind::DecisionRecord,
        ArtifactKind::Rulebook => ContractKind::Rulebook,
    }
}

/// All five contract schemas, compiled once.
pub struct ContractSchemas {
    validators: HashMap<ContractKind, Validator>,
}

impl ContractSchemas {
    /// Parse and compile every shipped schema document.
    ///
    /// Fails only if a document is not valid JSON or not a valid schema,
    /// which means the crate itself was built from broken sources.
    pub fn new() -> GtafResult<Self> {
        let mut validators = HashMap::new();
        for kind in ContractKind::ALL {
            let document: Value =
                serde_json::from_str(schema_document(kind)).map_err(|e| GtafError::SchemaValidation {
                    reason: format!("schema document '{kind}' is not valid JSON: {e}"),
                })?;
            let validator = jsonschema::validator_for(&document).map_err(|e| GtafError::SchemaValidation {
                reason: format!("schema document '{kind}' failed to compile: {e}"),
            })?;
            validators.insert(kind, validator);
        }
        debug!(count = validators.len(), "contract schemas compiled");
        Ok(Self { validators })
    }

    /// Validate `instance` against the `kind` schema. Paths are rooted at `$`.
    pub fn validate(&self, kind: ContractKind, instance: &Value) -> ValidationReport {
        self.validate_at(kind, instance, "$")
    }

    /// Validate `instance` against the `kind` schema, prefixing every
    /// failure path with `root`.
    pub fn validate_at(&self, kind: ContractKind, instance: &Value, root: &str) -> ValidationReport {
        let mut failures: Vec<ValidationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        match self.validators.get(&kind) {
            Some(validator) => {
                for error in validator.iter_errors(instance) {
                    failures.push(ValidationFailure {
                        contract: kind,
                        path: format!("{root}{}", error.instance_path),
                        message: error.to_string(),
                    });
                }
            }
            None => failures.push(ValidationFailure {
                contract: kind,
                path: root.to_string(),
                message: format!("no compiled schema for contract '{kind}'"),
            }),
        }

        // ── Phase 2: Timestamp semantics ─────────────────────────────────────
        //
        // Non-string values were already reported by phase 1.
        if kind != ContractKind::RuntimeContext {
            for field in TIMESTAMP_FIELDS {
                if let Some(raw) = instance.get(field).and_then(Value::as_str) {
                    if parse_timestamp(raw).is_none() {
                        failures.push(ValidationFailure {
                            contract: kind,
                            path: format!("{root}/{field}"),
                            message: format!("{raw:?} is not a valid date-time with an offset"),
                        });
                    }
                }
            }
        }

        if !failures.is_empty() {
            warn!(contract = %kind, failures = failures.len(), "contract validation failed");
        }
        ValidationReport::from_failures(failures)
    }

    /// Validate a whole evaluation input: the DRC, the context, and every
    /// pool entry the DRC names.
    pub fn validate_bundle(&self, drc: &Value, context: &Value, pool: &ArtifactPool) -> ValidationReport {
        let mut report = self.validate_at(ContractKind::Drc, drc, "$.drc");
        report.merge(self.validate_at(ContractKind::RuntimeContext, context, "$.context"));
        report.merge(self.validate_artifacts(drc, pool));
        report
    }

    /// Validate every pool entry the DRC's ref groups name, each against the
    /// schema of the group that names it.
    ///
    /// IDs missing from the pool are skipped; that is the gate's
    /// `MISSING_REFERENCE`, not a contract problem. Refs are read
    /// defensively so a structurally broken DRC still yields a report.
    pub fn validate_artifacts(&self, drc: &Value, pool: &ArtifactPool) -> ValidationReport {
        let mut report = ValidationReport::from_failures(Vec::new());
        let refs = drc.get("refs");

        for kind in ArtifactKind::ALL {
            let ids = refs
                .and_then(|r| r.get(kind.ref_key()))
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_str).collect::<Vec<_>>())
                .unwrap_or_default();

            for id in ids {
                if let Some(artifact) = pool.get(id) {
                    let root = format!("$.artifacts['{id}']");
                    report.merge(self.validate_at(contract_for(kind), artifact, &root));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schemas() -> ContractSchemas {
        ContractSchemas::new().expect("shipped schemas must compile")
    }

    fn valid_drc() -> Value {
        json!({
            "id": "DRC-100",
            "revision": 3,
            "result": "PERMITTED",
            "gtaf_ref": { "version": "0.1" },
            "scope": "ops.prod",
            "valid_from": "2026-01-01T00:00:00Z",
            "valid_until": "2027-01-01T00:00:00Z",
            "refs": { "sb": ["SB-1"], "dr": ["DR-1"], "rb": [] }
        })
    }

    // ── Documents ────────────────────────────────────────────────────────────

    #[test]
    fn every_document_is_a_draft_2020_12_object_schema() {
        for kind in ContractKind::ALL {
            let doc: Value = serde_json::from_str(schema_document(kind)).unwrap();
            assert_eq!(
                doc["$schema"],
                "https://json-schema.org/draft/2020-12/schema",
                "{kind} must declare draft 2020-12"
            );
            assert_eq!(doc["type"], "object", "{kind} must describe an object");
        }
    }

    #[test]
    fn drc_required_list_matches_gate() {
        let doc: Value = serde_json::from_str(schema_document(ContractKind::Drc)).unwrap();
        let required: Vec<&str> = doc["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            required,
            vec!["id", "revision", "result", "gtaf_ref", "scope", "valid_from", "valid_until", "refs"]
        );
    }

    // ── Structural phase ─────────────────────────────────────────────────────

    #[test]
    fn valid_drc_passes() {
        let report = schemas().validate(ContractKind::Drc, &valid_drc());
        assert!(report.passed, "unexpected failures: {:?}", report.failures);
    }

    #[test]
    fn version_const_is_enforced() {
        let mut drc = valid_drc();
        drc["gtaf_ref"]["version"] = json!("0.2");

        let report = schemas().validate(ContractKind::Drc, &drc);
        assert!(!report.passed);
        assert!(
            report.failures.iter().any(|f| f.path == "$/gtaf_ref/version"),
            "expected a failure at gtaf_ref/version, got {:?}",
            report.failures
        );
    }

    #[test]
    fn empty_sb_group_fails() {
        let mut drc = valid_drc();
        drc["refs"]["sb"] = json!([]);

        let report = schemas().validate(ContractKind::Drc, &drc);
        assert!(report.failures.iter().any(|f| f.path == "$/refs/sb"));
    }

    #[test]
    fn zero_revision_and_bad_result_are_both_reported() {
        let mut drc = valid_drc();
        drc["revision"] = json!(0);
        drc["result"] = json!("MAYBE");

        let report = schemas().validate(ContractKind::Drc, &drc);
        let paths: Vec<&str> = report.failures.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"$/revision"), "got {paths:?}");
        assert!(paths.contains(&"$/result"), "got {paths:?}");
    }

    #[test]
    fn context_requires_all_four_fields() {
        let report = schemas().validate(ContractKind::RuntimeContext, &json!({ "scope": "ops.prod" }));
        assert_eq!(report.failures.len(), 3, "got {:?}", report.failures);
        assert!(report.failures.iter().all(|f| f.contract == ContractKind::RuntimeContext));
    }

    #[test]
    fn rulebook_active_must_be_boolean() {
        let rb = json!({
            "scope": "ops.prod",
            "valid_from": "2026-01-01T00:00:00Z",
            "valid_until": "2027-01-01T00:00:00Z",
            "active": "yes"
        });
        let report = schemas().validate(ContractKind::Rulebook, &rb);
        assert!(report.failures.iter().any(|f| f.path == "$/active"));
    }

    // ── Semantic phase ───────────────────────────────────────────────────────

    #[test]
    fn unparseable_timestamp_is_reported() {
        let mut drc = valid_drc();
        drc["valid_until"] = json!("next tuesday");

        let report = schemas().validate(ContractKind::Drc, &drc);
        assert!(!report.passed);
        let failure = report
            .failures
            .iter()
            .find(|f| f.path == "$/valid_until")
            .expect("valid_until failure");
        assert!(failure.message.contains("date-time"));
    }

    #[test]
    fn offsetless_timestamp_is_reported() {
        let mut drc = valid_drc();
        drc["valid_from"] = json!("2026-01-01T00:00:00");

        let report = schemas().validate(ContractKind::Drc, &drc);
        assert!(report.failures.iter().any(|f| f.path == "$/valid_from"));
    }

    // ── Bundles ──────────────────────────────────────────────────────────────

    #[test]
    fn bundle_validates_artifacts_by_ref_group() {
        let drc = valid_drc();
        let context = json!({
            "scope": "ops.prod",
            "component": "ops.agent",
            "interface": "ops-api",
            "action": "restart"
        });
        // DR-1 has no delegation_mode; SB-1 is fine. DR-1 is judged by the
        // dr schema because the DRC lists it under `dr`.
        let pool: ArtifactPool = [
            (
                "SB-1",
                json!({
                    "scope": "ops.prod",
                    "valid_from": "2026-01-01T00:00:00Z",
                    "valid_until": "2027-01-01T00:00:00Z",
                    "included_components": ["ops.agent"],
                    "allowed_interfaces": ["ops-api"]
                }),
            ),
            (
                "DR-1",
                json!({
                    "scope": "ops.prod",
                    "valid_from": "2026-01-01T00:00:00Z",
                    "valid_until": "2027-01-01T00:00:00Z",
                    "decisions": ["restart"]
                }),
            ),
        ]
        .into_iter()
        .collect();

        let report = schemas().validate_bundle(&drc, &context, &pool);
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1, "got {:?}", report.failures);
        assert_eq!(report.failures[0].contract, ContractKind::DecisionRecord);
        assert_eq!(report.failures[0].path, "$.artifacts['DR-1']");
    }

    #[test]
    fn bundle_skips_missing_pool_entries() {
        let context = json!({
            "scope": "ops.prod",
            "component": "ops.agent",
            "interface": "ops-api",
            "action": "restart"
        });
        let report = schemas().validate_bundle(&valid_drc(), &context, &ArtifactPool::new());
        assert!(report.passed, "unexpected failures: {:?}", report.failures);
    }

    #[test]
    fn bundle_survives_non_object_drc() {
        let report = schemas().validate_bundle(&json!("not a drc"), &json!({}), &ArtifactPool::new());
        assert!(!report.passed);
        assert!(report.failures.iter().any(|f| f.path == "$.drc"));
        assert!(report.failures.iter().any(|f| f.contract == ContractKind::RuntimeContext));
    }
}
