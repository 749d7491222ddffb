//! Pipeline stages 2–4 and 5b–9.
//!
//! Each stage either passes (possibly carrying a value forward) or halts
//! with the single reason code it owns. None of them touch the raw DRC
//! document, and only stage 5b sees pool entries directly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use gtaf_contracts::{
    artifact::{ArtifactView, DecisionRecord},
    context::RuntimeContext,
    drc::{DecisionRecordContract, DrcVerdict},
    error::GtafError,
    result::ReasonCode,
};

use crate::{
    pipeline::Halt,
    resolve::{Referenced, ResolvedRefs},
    temporal::{window_contains, within_window},
};

/// Stage 2: the declared protocol version must be one the caller supports.
pub fn check_version(drc: &DecisionRecordContract, supported: &BTreeSet<String>) -> Result<(), Halt> {
    if supported.contains(&drc.gtaf_ref.version) {
        Ok(())
    } else {
        debug!(version = %drc.gtaf_ref.version, "unsupported protocol version");
        Err(Halt::Deny(ReasonCode::UnsupportedGtafVersion))
    }
}

/// Stage 3: the DRC itself must be inside its validity window.
pub fn check_drc_window(drc: &DecisionRecordContract, now: DateTime<Utc>) -> Result<(), Halt> {
    if window_contains(drc.valid_from, drc.valid_until, now) {
        Ok(())
    } else {
        debug!(
            valid_from = %drc.valid_from,
            valid_until = %drc.valid_until,
            %now,
            "drc outside validity window"
        );
        Err(Halt::Deny(ReasonCode::Expired))
    }
}

/// Stage 4: binary governance gate.
pub fn check_permitted(drc: &DecisionRecordContract) -> Result<(), Halt> {
    match drc.result {
        DrcVerdict::Permitted => Ok(()),
        DrcVerdict::NotPermitted => Err(Halt::Deny(ReasonCode::DrcNotPermitted)),
    }
}

/// Stage 5b: view each referenced entry as an artifact and check that it
/// is inside its own window.
///
/// Entries are taken in ref order and the first one that fails decides the
/// outcome: an expired artifact denies with `EXPIRED` even if a later entry
/// is not an object. A `valid_from` or `valid_until` that is not a string
/// does not parse and counts as expired.
pub fn check_artifact_windows<'a>(
    referenced: Vec<Referenced<'a>>,
    now: DateTime<Utc>,
) -> Result<ResolvedRefs<'a>, Halt> {
    let mut resolved = ResolvedRefs::default();
    for entry in referenced {
        let view = ArtifactView::new(entry.id, entry.value)?;
        if !within_window(view.valid_from(), view.valid_until(), now) {
            debug!(artifact_id = %entry.id, %now, "artifact outside validity window");
            return Err(Halt::Deny(ReasonCode::Expired));
        }
        resolved.push(entry.kind, view);
    }
    Ok(resolved)
}

/// Stage 6: the request, the DRC and every artifact must agree on scope.
///
/// Returns the active scope.
pub fn check_scope<'c>(
    context: &'c RuntimeContext,
    drc: &DecisionRecordContract,
    resolved: &ResolvedRefs<'_>,
) -> Result<&'c str, Halt> {
    let scope = match context.scope() {
        Some(scope) if scope == drc.scope => scope,
        other => {
            debug!(context_scope = ?other, drc_scope = %drc.scope, "context scope does not match drc");
            return Err(Halt::Deny(ReasonCode::ScopeLeak));
        }
    };

    for view in resolved.views() {
        if !view.admits_scope(scope) {
            debug!(
                artifact_id = %view.id(),
                artifact_scope = ?view.scope(),
                active_scope = %scope,
                "artifact not issued for or linked to active scope"
            );
            return Err(Halt::Deny(ReasonCode::ScopeLeak));
        }
    }

    Ok(scope)
}

/// Stage 7: component and interface must sit inside the first system
/// boundary. Later boundaries are resolved and checked for time and scope
/// but are not authoritative for containment.
pub fn check_boundary(context: &RuntimeContext, resolved: &ResolvedRefs<'_>) -> Result<(), Halt> {
    let boundary = resolved
        .system_boundaries
        .first()
        .ok_or_else(|| GtafError::MalformedArtifact {
            id: "refs.sb".to_string(),
            reason: "no system boundary resolved".to_string(),
        })?;

    let inside = match (context.component(), context.interface()) {
        (Some(component), Some(interface)) => boundary.contains(component, interface)?,
        _ => false,
    };
    if !inside {
        debug!(
            boundary_id = %boundary.view().id(),
            component = ?context.component(),
            interface = ?context.interface(),
            "request outside system boundary"
        );
        return Err(Halt::Deny(ReasonCode::OutsideSb));
    }
    Ok(())
}

/// Stage 8: first decision record, in ref order, that authorises the action.
pub fn match_decision<'a>(
    context: &RuntimeContext,
    resolved: &ResolvedRefs<'a>,
) -> Result<DecisionRecord<'a>, Halt> {
    let action = context.action().ok_or(Halt::Deny(ReasonCode::DrMismatch))?;

    resolved
        .decision_records
        .iter()
        .find(|record| record.authorises(action))
        .map(|record| {
            debug!(decision_record_id = %record.view().id(), %action, "action matched");
            *record
        })
        .ok_or_else(|| {
            debug!(%action, "no decision record authorises action");
            Halt::Deny(ReasonCode::DrMismatch)
        })
}

/// Stage 9: unattended delegation needs at least one active rulebook.
pub fn check_rulebook(matched: DecisionRecord<'_>, resolved: &ResolvedRefs<'_>) -> Result<(), Halt> {
    let Some(mode) = matched.mode().filter(|m| m.requires_rulebook()) else {
        return Ok(());
    };

    if resolved.rulebooks.iter().any(|rb| rb.is_active()) {
        Ok(())
    } else {
        debug!(?mode, "delegation mode requires an active rulebook");
        Err(Halt::Deny(ReasonCode::RbRequired))
    }
}
