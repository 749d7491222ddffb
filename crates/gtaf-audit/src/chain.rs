//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. gate_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of record (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use gtaf_contracts::{
    error::{GtafError, GtafResult},
    record::EvaluationRecord,
};

use crate::event::DecisionEvent;

/// Compute the SHA-256 hash for a single decision event.
///
/// Returns a lowercase 64-character hex string, or `AuditWriteFailed` if the
/// record cannot be serialized.
pub fn hash_event(
    gate_id: &str,
    sequence: u64,
    record: &EvaluationRecord,
    prev_hash: &str,
) -> GtafResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| GtafError::AuditWriteFailed {
        reason: format!("evaluation record could not be serialized: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(gate_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event's `prev_hash` equals the preceding event's
/// `this_hash` (or `GENESIS_HASH` for the first), every `sequence` equals
/// its position, and every `this_hash` matches the value recomputed from
/// the event's own fields. An empty chain is valid.
pub fn verify_chain(events: &[DecisionEvent]) -> bool {
    let mut expected_prev: &str = DecisionEvent::GENESIS_HASH;

    for (position, event) in events.iter().enumerate() {
        if event.prev_hash != expected_prev || event.sequence != position as u64 {
            return false;
        }

        match hash_event(&event.gate_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.as_str();
    }

    true
}
