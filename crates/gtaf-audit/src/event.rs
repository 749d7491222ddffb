//! Decision log entry and export types.
//!
//! `DecisionEvent` is a single entry in the hash chain. It wraps an
//! `EvaluationRecord` with sequence numbering and the SHA-256 hashes that
//! make tampering detectable. `DecisionLog` is the snapshot handed out by
//! `InMemoryDecisionLog::export_log()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gtaf_contracts::record::EvaluationRecord;

/// A single entry in the SHA-256 hash chain for one gate.
///
/// Each event commits to the previous event via `prev_hash`. Modifying any
/// field, including those of the embedded `record`, invalidates `this_hash`
/// and every later `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The gate that made the decision.
    pub gate_id: String,

    /// The decision as the gate returned it.
    pub record: EvaluationRecord,

    /// SHA-256 hash (hex) of the previous event, or `GENESIS_HASH` for the
    /// first event.
    pub prev_hash: String,

    /// SHA-256 hash (hex) over (gate_id, sequence, prev_hash, canonical JSON
    /// of record).
    pub this_hash: String,
}

impl DecisionEvent {
    /// The `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// An exported snapshot of one gate's decision log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLog {
    pub gate_id: String,

    /// All events in chain order (sequence 0 first).
    pub events: Vec<DecisionEvent>,

    /// When the snapshot was taken (UTC).
    pub exported_at: DateTime<Utc>,

    /// True once the gate has been closed and no further writes are taken.
    pub sealed: bool,

    /// The `this_hash` of the last event. Empty if the log is empty.
    pub terminal_hash: String,
}
