//! Tool descriptors and the tagged registration payload.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a tool's implementation is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    /// In-process native callable.
    Builtin,
    /// Sandboxed JavaScript, evaluated in an isolated `rquickjs` context.
    Js,
    /// Sandboxed Python, run in a fresh interpreter subprocess.
    Py,
}

impl std::fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Builtin => "builtin",
            Self::Js => "js",
            Self::Py => "py",
        };
        f.write_str(s)
    }
}

/// Static metadata describing a registered tool. Descriptors, not
/// implementations, are what [`super::ToolEngine::list`] enumerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique id in a dotted namespace, e.g. `fs.read`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Which runner executes this tool's implementation.
    pub runner: RunnerKind,
    /// JSON-schema-shaped input spec.
    pub input_schema: Value,
    /// Optional JSON-schema-shaped output spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Permissions a caller must hold to invoke this tool, e.g. `vfs.read`,
    /// `net`, `execute_code`.
    pub permissions: BTreeSet<String>,
}

impl ToolDescriptor {
    /// Start building a descriptor for a builtin tool with no required
    /// permissions and an empty input schema (`{"type":"object"}`).
    #[must_use]
    pub fn builtin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            runner: RunnerKind::Builtin,
            input_schema: serde_json::json!({ "type": "object" }),
            output_schema: None,
            permissions: BTreeSet::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Declare the runner kind (use with `js`/`py` script registrations).
    #[must_use]
    pub const fn with_runner(mut self, runner: RunnerKind) -> Self {
        self.runner = runner;
        self
    }

    /// Require a permission for this tool to be invoked.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Derive the input schema from a Rust type's [`schemars::JsonSchema`]
    /// implementation, instead of writing the JSON Schema by hand.
    #[must_use]
    pub fn with_schema<T: schemars::JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.input_schema = serde_json::to_value(&schema).unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        self
    }
}
