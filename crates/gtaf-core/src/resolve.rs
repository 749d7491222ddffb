//! Referential closure: turn the DRC's ref IDs into pool entries.
//!
//! Resolution is atomic. If any ID in any group is absent from the pool, or
//! is stored as JSON `null`, the whole resolution fails with
//! `MISSING_REFERENCE`; nothing partial escapes. Entries are borrowed, never
//! copied or decoded here. The window stage views them as artifacts one by
//! one, so a malformed entry only faults once evaluation reaches it.

use serde_json::Value;
use tracing::debug;

use gtaf_contracts::{
    artifact::{ArtifactKind, ArtifactPool, ArtifactView, DecisionRecord, Rulebook, SystemBoundary},
    drc::DrcRefs,
    result::ReasonCode,
};

use crate::pipeline::Halt;

/// A pool entry found through one of the DRC's ref groups.
#[derive(Debug, Clone, Copy)]
pub struct Referenced<'a> {
    pub kind: ArtifactKind,
    pub id: &'a str,
    pub value: &'a Value,
}

/// Look up every ref group of `refs` in `pool`, `sb` then `dr` then `rb`.
pub fn resolve<'a>(refs: &'a DrcRefs, pool: &'a ArtifactPool) -> Result<Vec<Referenced<'a>>, Halt> {
    let mut found = Vec::with_capacity(refs.sb.len() + refs.dr.len() + refs.rb.len());
    for kind in ArtifactKind::ALL {
        for id in refs.group(kind) {
            match pool.get(id).filter(|value| !value.is_null()) {
                Some(value) => found.push(Referenced { kind, id: id.as_str(), value }),
                None => {
                    debug!(
                        group = kind.ref_key(),
                        artifact_id = %id,
                        "referenced artifact not in pool"
                    );
                    return Err(Halt::Deny(ReasonCode::MissingReference));
                }
            }
        }
    }
    Ok(found)
}

/// Referenced artifacts viewed by kind, each group in the DRC's declared order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRefs<'a> {
    pub system_boundaries: Vec<SystemBoundary<'a>>,
    pub decision_records: Vec<DecisionRecord<'a>>,
    pub rulebooks: Vec<Rulebook<'a>>,
}

impl<'a> ResolvedRefs<'a> {
    pub fn push(&mut self, kind: ArtifactKind, view: ArtifactView<'a>) {
        match kind {
            ArtifactKind::SystemBoundary => self.system_boundaries.push(SystemBoundary::new(view)),
            ArtifactKind::DecisionRecord => self.decision_records.push(DecisionRecord::new(view)),
            ArtifactKind::Rulebook => self.rulebooks.push(Rulebook::new(view)),
        }
    }

    /// Every artifact, `sb` then `dr` then `rb`.
    pub fn views(&self) -> impl Iterator<Item = ArtifactView<'a>> + '_ {
        let sb = self.system_boundaries.iter().map(SystemBoundary::view);
        let dr = self.decision_records.iter().map(DecisionRecord::view);
        let rb = self.rulebooks.iter().map(Rulebook::view);
        sb.chain(dr).chain(rb)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn refs(sb: &[&str], dr: &[&str], rb: &[&str]) -> DrcRefs {
        let own = |ids: &[&str]| -> Vec<String> { ids.iter().map(|s| s.to_string()).collect() };
        DrcRefs { sb: own(sb), dr: own(dr), rb: own(rb) }
    }

    fn pool() -> ArtifactPool {
        [
            ("SB-1", json!({ "scope": "a", "included_components": ["c"] })),
            ("DR-1", json!({ "scope": "a", "decisions": ["x"] })),
            ("DR-2", json!({ "scope": "a", "decisions": ["y"] })),
            ("RB-1", json!({ "scope": "a", "active": true })),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolves_in_declared_order() {
        let refs = refs(&["SB-1"], &["DR-2", "DR-1"], &["RB-1"]);
        let pool = pool();
        let found = resolve(&refs, &pool).unwrap();

        let ids: Vec<&str> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["SB-1", "DR-2", "DR-1", "RB-1"]);
        assert_eq!(found[1].kind, ArtifactKind::DecisionRecord);
        assert!(std::ptr::eq(found[3].value, pool.get("RB-1").unwrap()));
    }

    #[test]
    fn any_missing_id_fails_whole_resolution() {
        let refs = refs(&["SB-1"], &["DR-1"], &["RB-404"]);
        let pool = pool();
        assert!(matches!(
            resolve(&refs, &pool),
            Err(Halt::Deny(ReasonCode::MissingReference))
        ));
    }

    #[test]
    fn null_entry_counts_as_missing() {
        let refs = refs(&["SB-1"], &["DR-1"], &["RB-1"]);
        let mut pool = pool();
        pool.insert("RB-1", Value::Null);
        assert!(matches!(
            resolve(&refs, &pool),
            Err(Halt::Deny(ReasonCode::MissingReference))
        ));
    }

    #[test]
    fn missing_reference_wins_over_malformed_entry() {
        let refs = refs(&["SB-BAD"], &["DR-404"], &[]);
        let mut pool = pool();
        pool.insert("SB-BAD", json!("not an object"));
        assert!(matches!(
            resolve(&refs, &pool),
            Err(Halt::Deny(ReasonCode::MissingReference))
        ));
    }

    #[test]
    fn non_object_entry_resolves_but_cannot_be_viewed() {
        let refs = refs(&["SB-BAD"], &["DR-1"], &[]);
        let mut pool = pool();
        pool.insert("SB-BAD", json!(["agent.runtime"]));

        let found = resolve(&refs, &pool).unwrap();
        assert_eq!(found.len(), 2);
        assert!(ArtifactView::new(found[0].id, found[0].value).is_err());
    }

    #[test]
    fn views_group_by_kind_and_chain_in_order() {
        let refs = refs(&["SB-1"], &["DR-2", "DR-1"], &["RB-1"]);
        let pool = pool();
        let mut resolved = ResolvedRefs::default();
        for r in resolve(&refs, &pool).unwrap() {
            resolved.push(r.kind, ArtifactView::new(r.id, r.value).unwrap());
        }

        assert_eq!(resolved.decision_records.len(), 2);
        assert!(resolved.rulebooks[0].is_active());
        let ids: Vec<&str> = resolved.views().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["SB-1", "DR-2", "DR-1", "RB-1"]);
    }
}
