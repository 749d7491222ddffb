//! The gate's answer: outcome, reason code and audit echo.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The binary decision the gate emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Execute,
    Deny,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Execute => "EXECUTE",
            Self::Deny => "DENY",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Stable reason codes. Declaration order is evaluation precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    InvalidDrcSchema,
    UnsupportedGtafVersion,
    Expired,
    DrcNotPermitted,
    MissingReference,
    ScopeLeak,
    OutsideSb,
    DrMismatch,
    RbRequired,
    InternalError,
    Ok,
}

impl ReasonCode {
    /// Every code, in precedence order.
    pub const ALL: [ReasonCode; 11] = [
        ReasonCode::InvalidDrcSchema,
        ReasonCode::UnsupportedGtafVersion,
        ReasonCode::Expired,
        ReasonCode::DrcNotPermitted,
        ReasonCode::MissingReference,
        ReasonCode::ScopeLeak,
        ReasonCode::OutsideSb,
        ReasonCode::DrMismatch,
        ReasonCode::RbRequired,
        ReasonCode::InternalError,
        ReasonCode::Ok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDrcSchema => "INVALID_DRC_SCHEMA",
            Self::UnsupportedGtafVersion => "UNSUPPORTED_GTAF_VERSION",
            Self::Expired => "EXPIRED",
            Self::DrcNotPermitted => "DRC_NOT_PERMITTED",
            Self::MissingReference => "MISSING_REFERENCE",
            Self::ScopeLeak => "SCOPE_LEAK",
            Self::OutsideSb => "OUTSIDE_SB",
            Self::DrMismatch => "DR_MISMATCH",
            Self::RbRequired => "RB_REQUIRED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Ok => "OK",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The full result of one evaluation.
///
/// `drc_id`, `revision` and `valid_until` are echoed from the raw DRC on
/// every outcome when they can be extracted, and are `None` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementResult {
    pub outcome: Outcome,
    pub drc_id: Option<String>,
    pub revision: Option<i64>,
    pub valid_until: Option<String>,
    pub reason_code: ReasonCode,
    /// Every ref ID the DRC names, flattened in `sb`, `dr`, `rb` order.
    pub refs: Vec<String>,
    /// Reserved for diagnostics. Currently always empty.
    pub details: Map<String, Value>,
}

impl EnforcementResult {
    pub fn is_execute(&self) -> bool {
        self.outcome == Outcome::Execute
    }
}
