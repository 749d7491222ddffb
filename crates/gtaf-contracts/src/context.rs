//! The runtime request being gated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who wants to do what, where.
///
/// Every field is optional at the type level because callers supply the
/// context as loosely-typed JSON. A missing, empty, or non-string field
/// simply fails whichever pipeline stage depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContext {
    /// Namespace the request runs in. Must equal the DRC scope.
    pub scope: Option<String>,
    /// The component asking to execute.
    pub component: Option<String>,
    /// The interface the component is going through.
    pub interface: Option<String>,
    /// The action being requested.
    pub action: Option<String>,
}

impl RuntimeContext {
    /// Build a fully populated context.
    pub fn new(
        scope: impl Into<String>,
        component: impl Into<String>,
        interface: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            scope: Some(scope.into()),
            component: Some(component.into()),
            interface: Some(interface.into()),
            action: Some(action.into()),
        }
    }

    /// Read a context out of arbitrary JSON.
    ///
    /// Never fails: non-object input yields an empty context, and any field
    /// that is absent or not a string is left as `None`.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            scope: field("scope"),
            component: field("component"),
            interface: field("interface"),
            action: field("action"),
        }
    }

    pub fn scope(&self) -> Option<&str> {
        non_empty(&self.scope)
    }

    pub fn component(&self) -> Option<&str> {
        non_empty(&self.component)
    }

    pub fn interface(&self) -> Option<&str> {
        non_empty(&self.interface)
    }

    pub fn action(&self) -> Option<&str> {
        non_empty(&self.action)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
