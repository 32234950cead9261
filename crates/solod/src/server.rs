//! HTTP server wiring for the daemon role

use crate::router::RouteTable;
use crate::routes;
use anyhow::Result;
use axum::Router;
use solo_common::state::{extract_state, Snapshot, StateMeta};
use solo_common::{Applet, StateStore};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// The application instance and its framework-owned timestamps, locked as a
/// unit so a diff-and-apply happens within one uninterrupted segment.
pub struct AppletCell {
    pub applet: Box<dyn Applet>,
    pub meta: StateMeta,
}

impl AppletCell {
    pub fn snapshot(&self) -> Snapshot {
        extract_state(self.applet.as_ref(), &self.meta)
    }
}

/// State shared across handlers.
pub struct AppState {
    pub cell: RwLock<AppletCell>,
    pub routes: RouteTable,
    pub store: StateStore,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(applet: Box<dyn Applet>, meta: StateMeta, store: StateStore) -> Self {
        let routes = RouteTable::build(applet.descriptor());
        Self {
            cell: RwLock::new(AppletCell { applet, meta }),
            routes,
            store,
        }
    }
}

/// Schedule a best-effort persist of a snapshot off the request path.
/// Persistence failures are logged by the store.
pub fn schedule_persist(state: &SharedState, snapshot: Snapshot) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        state.store.persist(&snapshot);
    });
}

/// Assemble the router: the state resource plus the per-operation method
/// paths, with request tracing layered on.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::state_routes())
        .merge(routes::method_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already-bound listener until `shutdown` resolves, then drain
/// in-flight requests. Listener construction is the lifecycle controller's
/// job; tests pass an ephemeral one.
pub async fn serve_on(
    listener: tokio::net::TcpListener,
    state: SharedState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
