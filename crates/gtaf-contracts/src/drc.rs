//! The decision record contract (DRC) in its validated, strongly-typed form.
//!
//! Callers hand the gate a loosely-typed JSON document. The schema stage in
//! `gtaf-core` turns it into a `DecisionRecordContract`; every later stage
//! works only on this type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;

/// The protocol version this runtime projection implements.
pub const PROJECTION_CONTRACT_VERSION: &str = "0.1";

/// The binary governance result recorded on a DRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrcVerdict {
    Permitted,
    NotPermitted,
}

impl DrcVerdict {
    /// Parse the wire spelling (`"PERMITTED"` / `"NOT_PERMITTED"`).
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "PERMITTED" => Some(Self::Permitted),
            "NOT_PERMITTED" => Some(Self::NotPermitted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permitted => "PERMITTED",
            Self::NotPermitted => "NOT_PERMITTED",
        }
    }
}

/// Reference to the GTAF protocol the DRC was written against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GtafRef {
    /// Protocol version string, e.g. `"0.1"`.
    pub version: String,
}

/// The three named groups of artifact IDs a DRC depends on.
///
/// Order inside each group is significant: the first system boundary is the
/// authoritative one, and decision records are matched in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrcRefs {
    /// System-boundary artifacts. At least one.
    pub sb: Vec<String>,
    /// Decision-record artifacts. At least one.
    pub dr: Vec<String>,
    /// Rulebook artifacts. May be empty.
    pub rb: Vec<String>,
}

impl DrcRefs {
    /// The IDs in the group for `kind`.
    pub fn group(&self, kind: ArtifactKind) -> &[String] {
        match kind {
            ArtifactKind::SystemBoundary => &self.sb,
            ArtifactKind::DecisionRecord => &self.dr,
            ArtifactKind::Rulebook => &self.rb,
        }
    }

    /// All IDs in `sb`, `dr`, `rb` order, for the audit trail.
    pub fn flatten(&self) -> Vec<String> {
        self.sb
            .iter()
            .chain(&self.dr)
            .chain(&self.rb)
            .cloned()
            .collect()
    }
}

/// A structurally valid decision record contract.
///
/// Immutable for the duration of one evaluation and owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecordContract {
    /// Non-empty identity of the record.
    pub id: String,
    /// Revision counter, always >= 1.
    pub revision: u64,
    /// Whether governance permitted the action at all.
    pub result: DrcVerdict,
    /// Protocol version binding.
    pub gtaf_ref: GtafRef,
    /// Namespace the record applies to.
    pub scope: String,
    /// Inclusive start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// Exclusive end of the validity window.
    pub valid_until: DateTime<Utc>,
    /// Referenced artifact IDs.
    pub refs: DrcRefs,
}
