//! Greeter - the canonical solo application
//!
//! One struct, one descriptor, and the same binary is a one-shot command
//! (`greeter get message`), a daemon (`greeter --serve --port 4000`) or a
//! client of that daemon (`greeter call greet Ada --port 4000`), with no
//! client or server code written here.

use serde_json::{json, Value};
use solo_common::descriptor::{Applet, Descriptor, OperationSpec, ValueKind};
use std::process::ExitCode;

struct Greeter {
    message: String,
    shouted: u64,
    notify: bool,
    descriptor: Descriptor,
}

impl Greeter {
    fn new() -> Self {
        Self {
            message: "hi".to_string(),
            shouted: 0,
            notify: false,
            descriptor: Descriptor::new("greeter")
                .field("message", ValueKind::String)
                .field("shouted", ValueKind::Number)
                .field("notify", ValueKind::Bool)
                .operation(OperationSpec::new("default", ValueKind::String))
                .operation(
                    OperationSpec::new("greet", ValueKind::String).param("name", ValueKind::String),
                )
                .operation(OperationSpec::new("shout", ValueKind::String)),
        }
    }
}

impl Applet for Greeter {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "message" => Some(json!(self.message)),
            "shouted" => Some(json!(self.shouted)),
            "notify" => Some(json!(self.notify)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> bool {
        match field {
            "message" => {
                self.message = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                true
            }
            "shouted" => {
                self.shouted = value.as_u64().unwrap_or(self.shouted);
                true
            }
            "notify" => {
                self.notify = value.as_bool().unwrap_or(self.notify);
                true
            }
            _ => false,
        }
    }

    fn invoke(&mut self, operation: &str, args: Vec<Value>) -> Result<Value, String> {
        match operation {
            "default" => Ok(json!(self.message)),
            "greet" => {
                let name = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| "greet needs a name".to_string())?;
                Ok(json!(format!("Hello, {name}")))
            }
            "shout" => {
                self.shouted += 1;
                Ok(json!(self.message.to_uppercase()))
            }
            other => Err(format!("unknown operation '{other}'")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    soloctl::run(Box::new(Greeter::new())).await
}
