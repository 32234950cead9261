//! RPC client - HTTP client for a live solo daemon
//!
//! Mirrors the server transport: `GET`/`POST /state` and `POST /<name>`,
//! always under an explicit timeout. Connection refusal, timeout and
//! application errors are distinguished in diagnostics but all surface as
//! errors to the caller.

use serde_json::{Map, Value};
use solo_common::{CallReply, Error, ErrorReply, StateReply, UnreachableKind};
use std::time::Duration;

pub struct RpcClient {
    port: u16,
    base: String,
    http: reqwest::Client,
}

impl RpcClient {
    pub fn new(port: u16, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            port,
            base: format!("http://127.0.0.1:{port}"),
            http,
        })
    }

    /// `GET /state` - the remote snapshot.
    pub async fn get_state(&self) -> Result<Value, Error> {
        let response = self
            .http
            .get(format!("{}/state", self.base))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(self.remote_error(response).await);
        }

        response.json().await.map_err(|e| self.classify(e))
    }

    /// `POST /state` - propose field values; returns the snapshot after the
    /// daemon applied whatever actually changed.
    pub async fn set_state(&self, patch: &Map<String, Value>) -> Result<Value, Error> {
        let response = self
            .http
            .post(format!("{}/state", self.base))
            .json(patch)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(self.remote_error(response).await);
        }

        let reply: StateReply = response.json().await.map_err(|e| self.classify(e))?;
        Ok(reply.state)
    }

    /// `POST /<operation>` - invoke a routed operation with positional
    /// arguments.
    pub async fn call(&self, operation: &str, args: &[Value]) -> Result<Value, Error> {
        let response = self
            .http
            .post(format!("{}/{operation}", self.base))
            .json(args)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(self.remote_error(response).await);
        }

        let reply: CallReply = response.json().await.map_err(|e| self.classify(e))?;
        Ok(reply.result)
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        let kind = if err.is_timeout() {
            UnreachableKind::TimedOut
        } else if err.is_connect() {
            UnreachableKind::Refused
        } else {
            UnreachableKind::Protocol
        };
        tracing::debug!("rpc to port {} failed: {err}", self.port);
        Error::Unreachable {
            port: self.port,
            kind,
        }
    }

    async fn remote_error(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        match response.json::<ErrorReply>().await {
            Ok(reply) => Error::Operation(reply.error),
            Err(_) => Error::Operation(format!("daemon answered {status}")),
        }
    }
}
