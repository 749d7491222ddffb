//! The enforcer: boundary function and result construction.
//!
//! `Enforcer::evaluate_at` is the only way into the pipeline. It runs the
//! stages under `catch_unwind`, so a fault or a panic anywhere inside turns
//! into `DENY / INTERNAL_ERROR` and nothing escapes to the caller.

use std::{
    any::Any,
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use gtaf_contracts::{
    artifact::ArtifactPool,
    context::RuntimeContext,
    drc::PROJECTION_CONTRACT_VERSION,
    result::{EnforcementResult, Outcome, ReasonCode},
};

use crate::{
    pipeline::{self, Halt},
    traits::Gate,
};

/// The deterministic runtime gate.
///
/// Holds only the set of protocol versions it accepts. Cheap to clone and
/// safe to share across threads; each call reads nothing but its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enforcer {
    supported_versions: BTreeSet<String>,
}

impl Enforcer {
    /// Build an enforcer accepting exactly `supported_versions`.
    pub fn new<I, S>(supported_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_versions: supported_versions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supported_versions(&self) -> &BTreeSet<String> {
        &self.supported_versions
    }

    /// Evaluate against the current UTC instant.
    pub fn evaluate(&self, drc: &Value, context: &RuntimeContext, pool: &ArtifactPool) -> EnforcementResult {
        self.evaluate_at(drc, context, pool, Utc::now())
    }

    /// Evaluate against a caller-supplied instant.
    pub fn evaluate_at(
        &self,
        drc: &Value,
        context: &RuntimeContext,
        pool: &ArtifactPool,
        now: DateTime<Utc>,
    ) -> EnforcementResult {
        guarded(drc, || {
            pipeline::run(drc, context, pool, &self.supported_versions, now)
        })
    }
}

impl Default for Enforcer {
    fn default() -> Self {
        Self::new([PROJECTION_CONTRACT_VERSION])
    }
}

impl Gate for Enforcer {
    fn enforce(
        &self,
        drc: &Value,
        context: &RuntimeContext,
        pool: &ArtifactPool,
        now: DateTime<Utc>,
    ) -> EnforcementResult {
        self.evaluate_at(drc, context, pool, now)
    }
}

/// Evaluate with the default supported versions (`{"0.1"}`).
///
/// `now = None` reads the clock once for this call.
pub fn evaluate(
    drc: &Value,
    context: &RuntimeContext,
    pool: &ArtifactPool,
    now: Option<DateTime<Utc>>,
) -> EnforcementResult {
    Enforcer::default().evaluate_at(drc, context, pool, now.unwrap_or_else(Utc::now))
}

/// The single fail-closed boundary.
///
/// Maps a clean run to `EXECUTE`, a `Halt::Deny` to its reason, and every
/// fault or panic to `INTERNAL_ERROR`. Faults are logged before conversion.
pub(crate) fn guarded<F>(drc: &Value, run: F) -> EnforcementResult
where
    F: FnOnce() -> Result<(), Halt>,
{
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(())) => {
            debug!(drc_id = ?echo_id(drc), "execute");
            build_result(drc, Outcome::Execute, ReasonCode::Ok)
        }
        Ok(Err(Halt::Deny(reason))) => {
            warn!(drc_id = ?echo_id(drc), reason_code = %reason, "deny");
            build_result(drc, Outcome::Deny, reason)
        }
        Ok(Err(Halt::Fault(err))) => {
            error!(drc_id = ?echo_id(drc), error = %err, "pipeline fault, denying");
            build_result(drc, Outcome::Deny, ReasonCode::InternalError)
        }
        Err(payload) => {
            error!(
                drc_id = ?echo_id(drc),
                panic = %panic_message(payload.as_ref()),
                "pipeline panicked, denying"
            );
            build_result(drc, Outcome::Deny, ReasonCode::InternalError)
        }
    }
}

/// Result constructor. Echo fields are read straight from the raw document
/// so they are available even when the DRC never validated.
fn build_result(drc: &Value, outcome: Outcome, reason_code: ReasonCode) -> EnforcementResult {
    EnforcementResult {
        outcome,
        drc_id: echo_id(drc),
        revision: drc.get("revision").and_then(Value::as_i64),
        valid_until: drc.get("valid_until").and_then(Value::as_str).map(str::to_string),
        reason_code,
        refs: refs_from_value(drc),
        details: Map::new(),
    }
}

fn echo_id(drc: &Value) -> Option<String> {
    drc.get("id").and_then(Value::as_str).map(str::to_string)
}

/// Flatten `refs.sb`, `refs.dr`, `refs.rb` defensively: anything that is not
/// an array of strings contributes nothing.
fn refs_from_value(drc: &Value) -> Vec<String> {
    let Some(refs) = drc.get("refs").and_then(Value::as_object) else {
        return Vec::new();
    };
    ["sb", "dr", "rb"]
        .iter()
        .filter_map(|key| refs.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

// ── Tests ────────────────────────────────────────────────────────────────────
