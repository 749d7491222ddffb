//! In-memory implementation of `DecisionAuditWriter`.
//!
//! `InMemoryDecisionLog` keeps all events in a `Vec` behind a `Mutex`, so
//! one log can back a gate that is shared across threads. `export_log()`
//! returns a snapshot; `verify_integrity()` re-checks the chain at any time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use gtaf_contracts::{
    error::{GtafError, GtafResult},
    record::EvaluationRecord,
};
use gtaf_core::DecisionAuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{DecisionEvent, DecisionLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct LogState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<DecisionEvent>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// The `this_hash` of the last event, or `GENESIS_HASH`.
    pub(crate) last_hash: String,

    /// Set by `finalize`; a sealed log rejects writes.
    pub(crate) sealed: bool,
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only decision log backed by a SHA-256 hash chain.
#[derive(Clone)]
pub struct InMemoryDecisionLog {
    gate_id: String,
    pub(crate) state: Arc<Mutex<LogState>>,
}

impl InMemoryDecisionLog {
    /// Create an empty log for the given gate.
    pub fn new(gate_id: impl Into<String>) -> Self {
        let state = LogState {
            events: Vec::new(),
            sequence: 0,
            last_hash: DecisionEvent::GENESIS_HASH.to_string(),
            sealed: false,
        };
        Self {
            gate_id: gate_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn gate_id(&self) -> &str {
        &self.gate_id
    }

    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().events.is_empty()
    }

    /// Snapshot every event written so far.
    pub fn export_log(&self) -> DecisionLog {
        let state = self.read();
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        DecisionLog {
            gate_id: self.gate_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            sealed: state.sealed,
            terminal_hash,
        }
    }

    /// Re-verify the whole chain.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.read().events)
    }

    // Readers tolerate poisoning: a panicked writer never pushed a partial
    // event, so the chain itself is still consistent.
    fn read(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> GtafResult<MutexGuard<'_, LogState>> {
        self.state.lock().map_err(|e| GtafError::AuditWriteFailed {
            reason: format!("decision log lock poisoned: {}", e),
        })
    }
}

// ── DecisionAuditWriter impl ──────────────────────────────────────────────────

impl DecisionAuditWriter for InMemoryDecisionLog {
    fn write(&self, record: &EvaluationRecord) -> GtafResult<()> {
        let mut state = self.lock()?;

        if state.sealed {
            return Err(GtafError::AuditWriteFailed {
                reason: format!("decision log for gate '{}' is sealed", self.gate_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.gate_id, sequence, record, &prev_hash)?;

        state.events.push(DecisionEvent {
            sequence,
            gate_id: self.gate_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    fn finalize(&self, gate_id: &str) -> GtafResult<()> {
        let mut state = self.lock()?;

        if gate_id != self.gate_id {
            warn!(expected = %self.gate_id, got = %gate_id, "finalize called for a different gate");
            return Err(GtafError::AuditWriteFailed {
                reason: format!(
                    "decision log belongs to gate '{}', not '{}'",
                    self.gate_id, gate_id
                ),
            });
        }

        state.sealed = true;
        info!(
            gate_id = %gate_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "decision log sealed"
        );

        Ok(())
    }
}
