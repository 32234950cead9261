//! Capability descriptor - the application's declared shape
//!
//! The framework never introspects a live object. An application registers
//! its state fields and callable operations once, at construction, through a
//! [`Descriptor`]. The descriptor is the single source of truth for which
//! keys belong to the state snapshot and which routes the daemon exposes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation name invoked when the CLI is run without a command.
pub const DEFAULT_OPERATION: &str = "default";

/// Coarse JSON type of a field or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    /// No constraint; accepted as-is.
    Any,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Any => "any",
        }
    }

    /// Whether a concrete JSON value is of this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Null => value.is_null(),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Number => value.is_number(),
            ValueKind::String => value.is_string(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
            ValueKind::Any => true,
        }
    }
}

/// One declared state field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: ValueKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One declared positional parameter of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ValueKind,
}

/// One declared callable operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub returns: ValueKind,
}

impl OperationSpec {
    pub fn new(name: impl Into<String>, returns: ValueKind) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
        }
    }

    pub fn param(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
        });
        self
    }
}

/// The full declared shape of an application: its name, state fields and
/// operations. Built once at construction and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub app_name: String,
    pub fields: Vec<FieldSpec>,
    pub operations: Vec<OperationSpec>,
}

impl Descriptor {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            fields: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.fields.push(FieldSpec::new(name, kind));
        self
    }

    pub fn operation(mut self, spec: OperationSpec) -> Self {
        self.operations.push(spec);
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.iter().any(|o| o.name == name)
    }

    pub fn get_operation(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.iter().find(|o| o.name == name)
    }
}

/// The contract an application implements to be served by the framework.
///
/// Any declared field becomes state automatically; any declared operation
/// becomes a remotely reachable route automatically. No other registration
/// step exists.
pub trait Applet: Send + Sync + 'static {
    /// The declared shape. Must not change over the instance's lifetime.
    fn descriptor(&self) -> &Descriptor;

    /// Read the current value of a declared field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Write a declared field. Returns false if the field is not owned by
    /// this instance (the caller drops the key silently in that case).
    fn set(&mut self, field: &str, value: Value) -> bool;

    /// Invoke a declared operation with positional arguments.
    fn invoke(&mut self, operation: &str, args: Vec<Value>) -> Result<Value, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_matching() {
        assert!(ValueKind::String.matches(&json!("hi")));
        assert!(ValueKind::Number.matches(&json!(42)));
        assert!(!ValueKind::Bool.matches(&json!("true")));
        assert!(ValueKind::Any.matches(&json!({"a": 1})));
    }

    #[test]
    fn descriptor_lookup() {
        let desc = Descriptor::new("demo")
            .field("message", ValueKind::String)
            .operation(OperationSpec::new("greet", ValueKind::String).param("name", ValueKind::String));

        assert!(desc.has_field("message"));
        assert!(!desc.has_field("greet"));
        assert!(desc.has_operation("greet"));
        assert_eq!(desc.get_operation("greet").unwrap().params.len(), 1);
    }
}
