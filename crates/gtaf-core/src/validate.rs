//! Structural validation of the raw DRC document.
//!
//! Shallow on purpose: types, presence and basic value constraints only.
//! Semantic depth (versions, windows, references) belongs to later stages.
//! The output is the strongly-typed `DecisionRecordContract` that the rest
//! of the pipeline consumes.

use std::fmt;

use serde_json::{Map, Value};

use gtaf_contracts::drc::{DecisionRecordContract, DrcRefs, DrcVerdict, GtafRef};

use crate::temporal::parse_timestamp;

const REQUIRED_KEYS: [&str; 8] = [
    "id",
    "revision",
    "result",
    "gtaf_ref",
    "scope",
    "valid_from",
    "valid_until",
    "refs",
];

const REF_GROUPS: [&str; 3] = ["sb", "dr", "rb"];

/// Why a DRC document was rejected. Used for logging only; the caller sees
/// `INVALID_DRC_SCHEMA` regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn violation(field: &'static str, reason: &'static str) -> SchemaViolation {
    SchemaViolation { field, reason }
}

/// Validate `value` as a DRC and convert it to its typed form.
///
/// `valid_from` and `valid_until` must be ISO-8601 date-times with an
/// explicit offset. A timestamp without an offset, or a bare date, is a
/// schema violation and the gate denies with `INVALID_DRC_SCHEMA`.
pub fn validate_drc(value: &Value) -> Result<DecisionRecordContract, SchemaViolation> {
    let obj = value
        .as_object()
        .ok_or_else(|| violation("$", "expected a JSON object"))?;

    if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !obj.contains_key(**key)) {
        return Err(violation(*missing, "required property is missing"));
    }

    let id = non_empty_str(obj, "id")?;
    let revision = obj["revision"]
        .as_u64()
        .filter(|r| *r >= 1)
        .ok_or_else(|| violation("revision", "must be an integer >= 1"))?;
    let result = obj["result"]
        .as_str()
        .and_then(DrcVerdict::from_wire)
        .ok_or_else(|| violation("result", "must be PERMITTED or NOT_PERMITTED"))?;
    let scope = non_empty_str(obj, "scope")?;
    let valid_from = obj["valid_from"]
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| violation("valid_from", "must be an ISO-8601 timestamp"))?;
    let valid_until = obj["valid_until"]
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| violation("valid_until", "must be an ISO-8601 timestamp"))?;

    let gtaf_ref = obj["gtaf_ref"]
        .as_object()
        .ok_or_else(|| violation("gtaf_ref", "expected a JSON object"))?;
    let version = non_empty_str(gtaf_ref, "version")
        .map_err(|_| violation("gtaf_ref.version", "must be a non-empty string"))?;

    let refs = validate_refs(&obj["refs"])?;

    Ok(DecisionRecordContract {
        id,
        revision,
        result,
        gtaf_ref: GtafRef { version },
        scope,
        valid_from,
        valid_until,
        refs,
    })
}

fn validate_refs(value: &Value) -> Result<DrcRefs, SchemaViolation> {
    let refs = value
        .as_object()
        .ok_or_else(|| violation("refs", "expected a JSON object"))?;

    if refs.keys().any(|key| !REF_GROUPS.contains(&key.as_str())) {
        return Err(violation("refs", "only sb, dr and rb groups are allowed"));
    }

    let sb = ref_group(refs, "sb", "refs.sb")?;
    let dr = ref_group(refs, "dr", "refs.dr")?;
    let rb = ref_group(refs, "rb", "refs.rb")?;

    if sb.is_empty() {
        return Err(violation("refs.sb", "must name at least one artifact"));
    }
    if dr.is_empty() {
        return Err(violation("refs.dr", "must name at least one artifact"));
    }

    Ok(DrcRefs { sb, dr, rb })
}

fn ref_group(
    refs: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<Vec<String>, SchemaViolation> {
    let items = refs
        .get(key)
        .ok_or_else(|| violation(field, "required ref group is missing"))?
        .as_array()
        .ok_or_else(|| violation(field, "expected an array"))?;

    items
        .iter()
        .map(|item| match item.as_str() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(violation(field, "entries must be non-empty strings")),
        })
        .collect()
}

fn non_empty_str(obj: &Map<String, Value>, key: &'static str) -> Result<String, SchemaViolation> {
    match obj.get(key).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(violation(key, "must be a non-empty string")),
    }
}
