//! Referenced artifact kinds and the pool they are resolved from.
//!
//! The pool keeps entries as raw JSON. An entry only acquires a kind when a
//! DRC ref group names it: the same ID listed under `sb` is read as a
//! `SystemBoundary`, under `dr` as a `DecisionRecord`, and so on.
//!
//! The typed artifacts are borrowed views over the pool entry. Fields are
//! read when a check asks for them, and a field with an unexpected JSON type
//! reads as absent. Only the boundary lists are strict: a present but
//! non-array list cannot be checked and is reported as malformed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GtafError, GtafResult};

/// Which ref group an artifact was resolved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    SystemBoundary,
    DecisionRecord,
    Rulebook,
}

impl ArtifactKind {
    /// Resolution order used by the gate.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::SystemBoundary,
        ArtifactKind::DecisionRecord,
        ArtifactKind::Rulebook,
    ];

    /// The DRC `refs` key for this kind.
    pub fn ref_key(&self) -> &'static str {
        match self {
            Self::SystemBoundary => "sb",
            Self::DecisionRecord => "dr",
            Self::Rulebook => "rb",
        }
    }
}

/// A list-valued artifact field as found on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListField<'a> {
    /// The key is not present.
    Absent,
    Items(&'a [Value]),
    /// Present, but not an array (including `null`).
    WrongType,
}

impl<'a> ListField<'a> {
    fn read(fields: &'a Map<String, Value>, key: &str) -> Self {
        match fields.get(key) {
            None => Self::Absent,
            Some(Value::Array(items)) => Self::Items(items),
            Some(_) => Self::WrongType,
        }
    }

    /// True if the field is an array holding `needle` as a string element.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Self::Items(items) => items.iter().any(|item| item.as_str() == Some(needle)),
            Self::Absent | Self::WrongType => false,
        }
    }
}

/// A read-only view of one pool entry, with the fields every kind shares.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactView<'a> {
    id: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> ArtifactView<'a> {
    /// View `value` as an artifact. Anything but a JSON object is malformed.
    pub fn new(id: &'a str, value: &'a Value) -> GtafResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { id, fields }),
            other => Err(GtafError::MalformedArtifact {
                id: id.to_string(),
                reason: format!("expected a JSON object, found {}", json_type(other)),
            }),
        }
    }

    /// The pool ID this artifact was found under.
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// The scope the artifact was issued for, if it is a string.
    pub fn scope(&self) -> Option<&'a str> {
        self.str_field("scope")
    }

    /// Inclusive start of validity, if it is a string.
    pub fn valid_from(&self) -> Option<&'a str> {
        self.str_field("valid_from")
    }

    /// Exclusive end of validity, if it is a string.
    pub fn valid_until(&self) -> Option<&'a str> {
        self.str_field("valid_until")
    }

    /// Additional scopes the artifact may be reused in.
    pub fn linked_scopes(&self) -> ListField<'a> {
        self.list("linked_scopes")
    }

    /// True if the artifact was issued for `scope` or explicitly links it.
    /// A `linked_scopes` that is not an array links nothing.
    pub fn admits_scope(&self, scope: &str) -> bool {
        self.scope() == Some(scope) || self.linked_scopes().contains(scope)
    }

    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn list(&self, key: &str) -> ListField<'a> {
        ListField::read(self.fields, key)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    fn malformed(&self, reason: String) -> GtafError {
        GtafError::MalformedArtifact {
            id: self.id.to_string(),
            reason,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Which components and interfaces are inside the governed system.
#[derive(Debug, Clone, Copy)]
pub struct SystemBoundary<'a>(ArtifactView<'a>);

impl<'a> SystemBoundary<'a> {
    pub fn new(view: ArtifactView<'a>) -> Self {
        Self(view)
    }

    pub fn view(&self) -> ArtifactView<'a> {
        self.0
    }

    pub fn included_components(&self) -> ListField<'a> {
        self.0.list("included_components")
    }

    pub fn excluded_components(&self) -> ListField<'a> {
        self.0.list("excluded_components")
    }

    pub fn allowed_interfaces(&self) -> ListField<'a> {
        self.0.list("allowed_interfaces")
    }

    /// Containment test. Exclusion beats inclusion; absent lists are empty.
    ///
    /// Lists are read only as far as the answer needs them. A list that is
    /// read and turns out not to be an array is `MalformedArtifact`.
    pub fn contains(&self, component: &str, interface: &str) -> GtafResult<bool> {
        if !self.strict_list("included_components")?.contains(component) {
            return Ok(false);
        }
        if self.strict_list("excluded_components")?.contains(component) {
            return Ok(false);
        }
        Ok(self.strict_list("allowed_interfaces")?.contains(interface))
    }

    fn strict_list(&self, key: &str) -> GtafResult<ListField<'a>> {
        match self.0.list(key) {
            ListField::WrongType => Err(self.0.malformed(format!("'{key}' must be an array of strings"))),
            list => Ok(list),
        }
    }
}

/// How much human involvement a decision record demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegationMode {
    Manual,
    SemiAutonomous,
    Autonomous,
}

impl DelegationMode {
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "MANUAL" => Some(Self::Manual),
            "SEMI_AUTONOMOUS" => Some(Self::SemiAutonomous),
            "AUTONOMOUS" => Some(Self::Autonomous),
            _ => None,
        }
    }

    /// Unattended modes need an active rulebook.
    pub fn requires_rulebook(&self) -> bool {
        matches!(self, Self::SemiAutonomous | Self::Autonomous)
    }
}

/// Which actions are authorised and under what delegation mode.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRecord<'a>(ArtifactView<'a>);

impl<'a> DecisionRecord<'a> {
    pub fn new(view: ArtifactView<'a>) -> Self {
        Self(view)
    }

    pub fn view(&self) -> ArtifactView<'a> {
        self.0
    }

    pub fn decisions(&self) -> ListField<'a> {
        self.0.list("decisions")
    }

    /// A `decisions` field that is not an array authorises nothing.
    pub fn authorises(&self, action: &str) -> bool {
        self.decisions().contains(action)
    }

    /// The raw wire string, if it is a string.
    pub fn delegation_mode(&self) -> Option<&'a str> {
        self.0.str_field("delegation_mode")
    }

    /// Unknown values are treated as non-delegating.
    pub fn mode(&self) -> Option<DelegationMode> {
        self.delegation_mode().and_then(DelegationMode::from_wire)
    }
}

/// Presence of active human oversight.
#[derive(Debug, Clone, Copy)]
pub struct Rulebook<'a>(ArtifactView<'a>);

impl<'a> Rulebook<'a> {
    pub fn new(view: ArtifactView<'a>) -> Self {
        Self(view)
    }

    pub fn view(&self) -> ArtifactView<'a> {
        self.0
    }

    /// Only JSON `true` counts as active.
    pub fn is_active(&self) -> bool {
        matches!(self.0.get("active"), Some(Value::Bool(true)))
    }
}

/// Caller-supplied mapping from artifact ID to raw artifact JSON.
///
/// Supplied whole per evaluation; the gate only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactPool {
    entries: BTreeMap<String, Value>,
}

impl ArtifactPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the artifact stored under `id`.
    pub fn insert(&mut self, id: impl Into<String>, artifact: Value) {
        self.entries.insert(id.into(), artifact);
    }

    /// Remove the artifact under `id`, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ArtifactPool {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
