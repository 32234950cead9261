//! Method router - the immutable route table
//!
//! One route per declared operation, named by the operation prefixed with
//! the canonical path separator. Built once at startup; no hot reloading.

use serde_json::Value;
use solo_common::descriptor::{Descriptor, OperationSpec};
use std::collections::BTreeMap;

/// Canonical separator prefixing every route name.
pub const ROUTE_SEPARATOR: char = '/';

/// Mapping from route path to the operation it invokes. Immutable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: BTreeMap<String, OperationSpec>,
}

impl RouteTable {
    /// Build the table from a descriptor. The router itself is side-effect
    /// free; whatever the invoked operations do is the application's
    /// responsibility.
    pub fn build(descriptor: &Descriptor) -> Self {
        let routes = descriptor
            .operations
            .iter()
            .map(|op| (format!("{ROUTE_SEPARATOR}{}", op.name), op.clone()))
            .collect();
        Self { routes }
    }

    pub fn resolve(&self, path: &str) -> Option<&OperationSpec> {
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

/// Coerce a request payload into the positional argument list: an array is
/// used verbatim, anything else becomes a one-element list.
pub fn coerce_args(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solo_common::descriptor::{OperationSpec, ValueKind};

    fn descriptor() -> Descriptor {
        Descriptor::new("demo")
            .operation(OperationSpec::new("greet", ValueKind::String).param("name", ValueKind::String))
            .operation(OperationSpec::new("default", ValueKind::String))
    }

    #[test]
    fn routes_are_prefixed_operation_names() {
        let table = RouteTable::build(&descriptor());
        assert_eq!(table.len(), 2);
        assert!(table.resolve("/greet").is_some());
        assert!(table.resolve("/default").is_some());
        assert!(table.resolve("greet").is_none());
        assert!(table.resolve("/missing").is_none());
    }

    #[test]
    fn single_payload_becomes_one_element_list() {
        assert_eq!(coerce_args(json!(["a", "b"])), vec![json!("a"), json!("b")]);
        assert_eq!(coerce_args(json!("Ada")), vec![json!("Ada")]);
        assert_eq!(coerce_args(json!({"k": 1})), vec![json!({"k": 1})]);
    }
}
