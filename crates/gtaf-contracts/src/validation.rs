//! Contract validation report types.
//!
//! Produced by `gtaf-schema` when an instance is checked against one of the
//! wire-level JSON Schema contracts. Unlike the gate, validation collects
//! every failure instead of stopping at the first.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The wire-level contracts the runtime ships schema documents for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Drc,
    RuntimeContext,
    SystemBoundary,
    DecisionRecord,
    Rulebook,
}

impl ContractKind {
    pub const ALL: [ContractKind; 5] = [
        ContractKind::Drc,
        ContractKind::RuntimeContext,
        ContractKind::SystemBoundary,
        ContractKind::DecisionRecord,
        ContractKind::Rulebook,
    ];

    /// File stem of the schema document, e.g. `"drc"` for `drc.schema.json`.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::Drc => "drc",
            Self::RuntimeContext => "runtime_context",
            Self::SystemBoundary => "sb",
            Self::DecisionRecord => "dr",
            Self::Rulebook => "rb",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}

/// The result of validating one or more instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if no failure was recorded.
    pub passed: bool,
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }

    /// Fold `other` into this report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.failures.extend(other.failures);
        self.passed = self.failures.is_empty();
    }
}

/// A single contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Which contract was violated.
    pub contract: ContractKind,
    /// Location of the offending value, e.g. `$.drc/gtaf_ref/version`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.contract, self.path, self.message)
    }
}
