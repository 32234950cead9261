//! Wire protocol types
//!
//! JSON bodies exchanged over localhost HTTP. The daemon serves them, the
//! CLI client consumes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: &str = "ok";

/// Reply to `POST /state`: the snapshot after applying the patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateReply {
    pub status: String,
    pub state: Value,
}

impl StateReply {
    pub fn ok(state: Value) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            state,
        }
    }
}

/// Reply to a successful `POST /<operation>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallReply {
    pub status: String,
    pub result: Value,
}

impl CallReply {
    pub fn ok(result: Value) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            result,
        }
    }
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replies_serialize_to_spec_shape() {
        let reply = CallReply::ok(json!("Hello, Ada"));
        let wire = serde_json::to_value(&reply).unwrap();
        assert_eq!(wire, json!({"status": "ok", "result": "Hello, Ada"}));

        let err = ErrorReply::new("boom");
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({"error": "boom"}));
    }
}
