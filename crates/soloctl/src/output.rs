//! Terminal rendering for command results and the structure view

use owo_colors::OwoColorize;
use serde_json::Value;
use solo_common::Descriptor;

/// Print a command result. Strings print raw so `get message` composes in
/// shell pipelines; everything else prints as JSON.
pub fn print_value(value: &Value) {
    match value {
        Value::String(s) => println!("{s}"),
        Value::Object(_) | Value::Array(_) => {
            println!("{}", serde_json::to_string_pretty(value).unwrap_or_default())
        }
        other => println!("{other}"),
    }
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
}

/// Render the capability descriptor: the typed replacement for a runtime
/// structure dump.
pub fn render_descriptor(descriptor: &Descriptor) -> String {
    let mut out = String::new();
    out.push_str(&format!("application: {}\n", descriptor.app_name));

    out.push_str("fields:\n");
    if descriptor.fields.is_empty() {
        out.push_str("  (none)\n");
    }
    for field in &descriptor.fields {
        out.push_str(&format!("  {}: {}\n", field.name, field.kind.as_str()));
    }

    out.push_str("operations:\n");
    if descriptor.operations.is_empty() {
        out.push_str("  (none)\n");
    }
    for op in &descriptor.operations {
        let params = op
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "  {}({}) -> {}\n",
            op.name,
            params,
            op.returns.as_str()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use solo_common::descriptor::{OperationSpec, ValueKind};

    #[test]
    fn descriptor_renders_fields_and_signatures() {
        let descriptor = Descriptor::new("greeter")
            .field("message", ValueKind::String)
            .operation(
                OperationSpec::new("greet", ValueKind::String).param("name", ValueKind::String),
            );

        let rendered = render_descriptor(&descriptor);
        assert!(rendered.contains("application: greeter"));
        assert!(rendered.contains("message: string"));
        assert!(rendered.contains("greet(name: string) -> string"));
    }
}
