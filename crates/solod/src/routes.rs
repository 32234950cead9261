//! RPC transport - server side
//!
//! One always-present resource (`/state`) and one dynamically matched path
//! per routed operation. Method paths exist only under POST semantics: any
//! other verb on them is an unmatched path (404), while `/state` rejects
//! unsupported verbs with 405.

use crate::router::coerce_args;
use crate::server::{self, AppletCell, SharedState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::Value;
use solo_common::state::apply_update;
use solo_common::{CallReply, ErrorReply, StateReply};
use tracing::{debug, error, info};

pub fn state_routes() -> Router<SharedState> {
    Router::new().route("/state", get(get_state).post(set_state))
}

pub fn method_routes() -> Router<SharedState> {
    Router::new().route("/:operation", any(invoke_operation))
}

/// `GET /state` - the current snapshot, no side effects. Doubles as the
/// liveness resource the port resolver probes.
async fn get_state(State(state): State<SharedState>) -> Json<Value> {
    let cell = state.cell.read().await;
    Json(cell.snapshot().to_value())
}

/// `POST /state` - diff the proposed values against the current snapshot and
/// apply only what changed. Replies with the new snapshot even when the
/// patch turns out empty.
async fn set_state(State(state): State<SharedState>, body: Bytes) -> Response {
    let proposed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorReply::new(format!("invalid JSON: {err}"))),
            )
                .into_response();
        }
    };

    let Some(proposed) = proposed.as_object() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorReply::new("state update must be a JSON object")),
        )
            .into_response();
    };

    let snapshot = {
        let mut cell = state.cell.write().await;
        let patch = cell.snapshot().diff(proposed);
        if !patch.is_empty() {
            let AppletCell { applet, meta } = &mut *cell;
            let applied = apply_update(applet.as_mut(), meta, &patch);
            info!("state update applied {} field(s)", applied.len());
        }
        cell.snapshot()
    };

    server::schedule_persist(&state, snapshot.clone());

    Json(StateReply::ok(snapshot.to_value())).into_response()
}

/// `POST /<operation>` - invoke a routed operation with a positional
/// argument list. A failing operation surfaces as 500 and leaves the daemon
/// and other in-flight requests untouched.
async fn invoke_operation(
    State(state): State<SharedState>,
    method: Method,
    Path(operation): Path<String>,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        // The path does not exist outside POST semantics.
        return StatusCode::NOT_FOUND.into_response();
    }

    let route_path = format!("/{operation}");
    let Some(route) = state.routes.resolve(&route_path) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorReply::new(format!("unknown operation '{operation}'"))),
        )
            .into_response();
    };

    let args = if body.is_empty() {
        Vec::new()
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => coerce_args(payload),
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorReply::new(format!("invalid JSON: {err}"))),
                )
                    .into_response();
            }
        }
    };
    debug!(
        "invoking '{}' with {} argument(s) ({} declared)",
        operation,
        args.len(),
        route.params.len()
    );

    let (result, mutated) = {
        let mut cell = state.cell.write().await;
        let before = cell.snapshot();
        let result = cell.applet.invoke(&operation, args);
        let changed = !before.fields_equal(&cell.snapshot());
        if changed {
            cell.meta.touch();
        }
        (result, changed.then(|| cell.snapshot()))
    };

    if let Some(snapshot) = mutated {
        server::schedule_persist(&state, snapshot);
    }

    match result {
        Ok(value) => Json(CallReply::ok(value)).into_response(),
        Err(message) => {
            error!("operation '{}' failed: {}", operation, message);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorReply::new(message))).into_response()
        }
    }
}
