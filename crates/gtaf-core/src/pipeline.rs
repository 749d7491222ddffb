//! The ordered evaluation pipeline.
//!
//!   Schema → Version → DRC window → Permitted → Resolve → Artifact windows
//!   → Scope → Boundary → Decision → Rulebook
//!
//! Strictly top to bottom, first failure wins. Every stage reports failure
//! as a `Halt` value; nothing here is allowed to decide `EXECUTE` other than
//! reaching the end.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use gtaf_contracts::{
    artifact::ArtifactPool, context::RuntimeContext, error::GtafError, result::ReasonCode,
};

use crate::{checks, resolve, validate::validate_drc};

/// Why the pipeline stopped before reaching the end.
#[derive(Debug)]
pub enum Halt {
    /// A policy or structural check failed with this reason.
    Deny(ReasonCode),
    /// Something went wrong that no check anticipates.
    Fault(GtafError),
}

impl From<GtafError> for Halt {
    fn from(err: GtafError) -> Self {
        Halt::Fault(err)
    }
}

/// Run every stage against one set of inputs.
pub(crate) fn run(
    drc: &Value,
    context: &RuntimeContext,
    pool: &ArtifactPool,
    supported_versions: &BTreeSet<String>,
    now: DateTime<Utc>,
) -> Result<(), Halt> {
    // ── 1. Schema ────────────────────────────────────────────────────────────
    let drc = validate_drc(drc).map_err(|violation| {
        debug!(%violation, "drc failed schema validation");
        Halt::Deny(ReasonCode::InvalidDrcSchema)
    })?;

    // ── 2. Version binding, before anything touches references ─────────────
    checks::check_version(&drc, supported_versions)?;

    // ── 3. DRC validity window ───────────────────────────────────────────────
    checks::check_drc_window(&drc, now)?;

    // ── 4. Binary gate, so broken refs never mask an explicit refusal ────────
    checks::check_permitted(&drc)?;

    // ── 5. Referential closure, then artifact validity windows ──────────────
    let referenced = resolve::resolve(&drc.refs, pool)?;
    let resolved = checks::check_artifact_windows(referenced, now)?;

    // ── 6. Scope coherence ───────────────────────────────────────────────────
    let scope = checks::check_scope(context, &drc, &resolved)?;

    // ── 7. System boundary containment ───────────────────────────────────────
    checks::check_boundary(context, &resolved)?;

    // ── 8. Decision record match ─────────────────────────────────────────────
    let matched = checks::match_decision(context, &resolved)?;

    // ── 9. Rulebook presence ─────────────────────────────────────────────────
    checks::check_rulebook(matched, &resolved)?;

    debug!(drc_id = %drc.id, %scope, "all pipeline stages passed");
    Ok(())
}
