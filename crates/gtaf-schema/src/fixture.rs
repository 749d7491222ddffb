//! Projection contract fixtures.
//!
//! Each case is a directory holding four JSON files:
//!
//! ```text
//! <root>/<case>/drc.json        the DRC under evaluation
//! <root>/<case>/context.json    the runtime context
//! <root>/<case>/artifacts.json  the artifact pool
//! <root>/<case>/expected.json   { "now", "outcome", "reason_code" }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use gtaf_contracts::{
    artifact::ArtifactPool,
    context::RuntimeContext,
    error::{GtafError, GtafResult},
    result::{EnforcementResult, Outcome, ReasonCode},
};
use gtaf_core::{temporal::parse_timestamp, Gate};

/// Every case in the projection v0.1 matrix.
pub const CASE_NAMES: [&str; 9] = [
    "happy_execute",
    "deny_missing_reference",
    "deny_expired_valid_until",
    "deny_scope_leak",
    "deny_outside_sb",
    "deny_dr_mismatch",
    "deny_rb_required_missing",
    "deny_unsupported_version",
    "deny_invalid_drc_structure",
];

/// Cases whose inputs are expected to fail contract validation.
pub const SCHEMA_INVALID_CASES: [&str; 2] = ["deny_unsupported_version", "deny_invalid_drc_structure"];

/// The fixture tree shipped with this workspace.
pub fn default_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("projection_v0_1")
}

/// What the gate must answer for a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    /// The evaluation instant, as an ISO-8601 string.
    pub now: String,
    pub outcome: Outcome,
    pub reason_code: ReasonCode,
}

/// One loaded fixture case.
#[derive(Debug, Clone)]
pub struct FixtureCase {
    pub name: String,
    pub drc: Value,
    /// Kept raw so contract validation sees exactly what is on disk.
    pub context: Value,
    pub artifacts: ArtifactPool,
    pub expected: Expectation,
}

impl FixtureCase {
    pub fn runtime_context(&self) -> RuntimeContext {
        RuntimeContext::from_value(&self.context)
    }

    pub fn now(&self) -> GtafResult<DateTime<Utc>> {
        parse_timestamp(&self.expected.now).ok_or_else(|| GtafError::Fixture {
            reason: format!("case '{}' has an invalid 'now': {:?}", self.name, self.expected.now),
        })
    }

    /// Run the case through `gate` at the case's `now`.
    pub fn evaluate(&self, gate: &dyn Gate) -> GtafResult<EnforcementResult> {
        let now = self.now()?;
        Ok(gate.enforce(&self.drc, &self.runtime_context(), &self.artifacts, now))
    }

    /// True if `result` carries the expected outcome and reason code.
    pub fn matches(&self, result: &EnforcementResult) -> bool {
        result.outcome == self.expected.outcome && result.reason_code == self.expected.reason_code
    }
}

/// Load the case `name` from under `root`.
pub fn load_case(root: &Path, name: &str) -> GtafResult<FixtureCase> {
    let dir = root.join(name);
    debug!(case = name, dir = %dir.display(), "loading fixture case");

    Ok(FixtureCase {
        name: name.to_string(),
        drc: read_json(&dir.join("drc.json"))?,
        context: read_json(&dir.join("context.json"))?,
        artifacts: read_json(&dir.join("artifacts.json"))?,
        expected: read_json(&dir.join("expected.json"))?,
    })
}

/// Load every case in `CASE_NAMES`, in order.
pub fn load_all(root: &Path) -> GtafResult<Vec<FixtureCase>> {
    CASE_NAMES.iter().map(|name| load_case(root, name)).collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> GtafResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| GtafError::Fixture {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| GtafError::Fixture {
        reason: format!("failed to parse '{}': {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use gtaf_contracts::validation::ContractKind;
    use gtaf_core::{evaluate, Enforcer};

    use super::*;
    use crate::engine::ContractSchemas;

    fn case(name: &str) -> FixtureCase {
        load_case(&default_root(), name).unwrap_or_else(|e| panic!("loading {name}: {e}"))
    }

    // ── Matrix ───────────────────────────────────────────────────────────────

    #[test]
    fn fixture_schema_alignment_matrix() {
        let schemas = ContractSchemas::new().unwrap();

        for name in CASE_NAMES {
            let case = case(name);
            let report = schemas.validate_bundle(&case.drc, &case.context, &case.artifacts);
            let expected_valid = !SCHEMA_INVALID_CASES.contains(&name);

            assert_eq!(
                report.passed, expected_valid,
                "schema validity mismatch for {name}: {:?}",
                report.failures
            );
        }
    }

    #[test]
    fn unsupported_version_fails_on_version_const() {
        let schemas = ContractSchemas::new().unwrap();
        let case = case("deny_unsupported_version");

        let report = schemas.validate(ContractKind::Drc, &case.drc);
        assert!(
            report.failures.iter().any(|f| f.path.contains("gtaf_ref/version")),
            "expected const-version failure, got {:?}",
            report.failures
        );
    }

    #[test]
    fn invalid_structure_fails_on_missing_id() {
        let schemas = ContractSchemas::new().unwrap();
        let case = case("deny_invalid_drc_structure");

        let report = schemas.validate(ContractKind::Drc, &case.drc);
        assert!(
            report
                .failures
                .iter()
                .any(|f| f.message.contains("\"id\"") && f.message.contains("required")),
            "expected missing-id failure, got {:?}",
            report.failures
        );
    }

    #[test]
    fn contract_enforcement_matrix() {
        let gate = Enforcer::default();

        for case in load_all(&default_root()).unwrap() {
            let result = case.evaluate(&gate).unwrap();
            assert!(
                case.matches(&result),
                "{}: expected {} / {}, got {} / {}",
                case.name,
                case.expected.outcome,
                case.expected.reason_code,
                result.outcome,
                result.reason_code
            );
        }
    }

    // ── First-failure precedence ─────────────────────────────────────────────

    #[test]
    fn unsupported_version_beats_missing_reference() {
        let mut case = case("happy_execute");
        case.drc["gtaf_ref"]["version"] = serde_json::json!("0.2");
        case.artifacts.remove("DR-FX-001");

        let result = evaluate(&case.drc, &case.runtime_context(), &case.artifacts, Some(case.now().unwrap()));
        assert_eq!(result.outcome, Outcome::Deny);
        assert_eq!(result.reason_code, ReasonCode::UnsupportedGtafVersion);
    }

    #[test]
    fn not_permitted_beats_missing_reference() {
        let mut case = case("happy_execute");
        case.drc["result"] = serde_json::json!("NOT_PERMITTED");
        case.artifacts.remove("DR-FX-001");

        let result = evaluate(&case.drc, &case.runtime_context(), &case.artifacts, Some(case.now().unwrap()));
        assert_eq!(result.outcome, Outcome::Deny);
        assert_eq!(result.reason_code, ReasonCode::DrcNotPermitted);
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    #[test]
    fn happy_case_echoes_drc_fields() {
        let case = case("happy_execute");
        let result = case.evaluate(&Enforcer::default()).unwrap();

        assert!(result.is_execute());
        assert_eq!(result.drc_id.as_deref(), Some("DRC-FX-001"));
        assert_eq!(result.revision, Some(1));
        assert_eq!(result.refs, vec!["SB-FX-001", "DR-FX-001", "RB-FX-001"]);
    }

    #[test]
    fn missing_case_is_a_fixture_error() {
        match load_case(&default_root(), "no_such_case") {
            Err(GtafError::Fixture { reason }) => assert!(reason.contains("failed to read")),
            other => panic!("expected Fixture error, got {:?}", other.map(|c| c.name)),
        }
    }

    #[test]
    fn invalid_now_is_a_fixture_error() {
        let mut case = case("happy_execute");
        case.expected.now = "yesterday".to_string();
        assert!(matches!(case.evaluate(&Enforcer::default()), Err(GtafError::Fixture { .. })));
    }
}
