//! Shared test fixture: a minimal applet with every operation shape the
//! transport has to handle (nullary, unary, erroring, default).
#![allow(dead_code)]

use serde_json::{json, Value};
use solo_common::descriptor::{Applet, Descriptor, OperationSpec, ValueKind};
use solo_common::state::StateMeta;
use solo_common::StateStore;
use solod::server::AppState;
use solod::SharedState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

pub struct EchoApplet {
    pub message: String,
    pub count: u64,
    descriptor: Descriptor,
}

impl EchoApplet {
    pub fn new() -> Self {
        Self {
            message: "hi".to_string(),
            count: 0,
            descriptor: Descriptor::new("echo")
                .field("message", ValueKind::String)
                .field("count", ValueKind::Number)
                .operation(OperationSpec::new("default", ValueKind::String))
                .operation(
                    OperationSpec::new("greet", ValueKind::String).param("name", ValueKind::String),
                )
                .operation(OperationSpec::new("bump", ValueKind::Number))
                .operation(OperationSpec::new("boom", ValueKind::Null)),
        }
    }
}

impl Applet for EchoApplet {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn get(&self, field: &str) -> Option<Value> {
        match field {
            "message" => Some(json!(self.message)),
            "count" => Some(json!(self.count)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> bool {
        match field {
            "message" => {
                self.message = value.as_str().unwrap_or_default().to_string();
                true
            }
            "count" => {
                self.count = value.as_u64().unwrap_or_default();
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
            "bump" => {
                self.count += 1;
                Ok(json!(self.count))
            }
            "boom" => Err("boom".to_string()),
            other => Err(format!("unknown operation '{other}'")),
        }
    }
}

pub struct TestDaemon {
    pub port: u16,
    pub state: SharedState,
    pub shutdown: Arc<Notify>,
    pub handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _state_dir: tempfile::TempDir,
}

impl TestDaemon {
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    pub async fn stop(self) {
        self.shutdown.notify_one();
        let _ = self.handle.await;
    }
}

/// Boot a daemon on an ephemeral port with an isolated state file.
pub async fn spawn_daemon() -> TestDaemon {
    let state_dir = tempfile::tempdir().expect("state dir");
    let store = StateStore::at(state_dir.path().join("state.json"));

    let state: SharedState = Arc::new(AppState::new(
        Box::new(EchoApplet::new()),
        StateMeta::new(),
        store,
    ));

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let shutdown = Arc::new(Notify::new());
    let drain = {
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    };

    let handle = tokio::spawn(solod::server::serve_on(listener, Arc::clone(&state), drain));

    TestDaemon {
        port,
        state,
        shutdown,
        handle,
        _state_dir: state_dir,
    }
}
