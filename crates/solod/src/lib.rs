//! Solo Daemon - the server role of the solo framework
//!
//! When a process elects itself daemon, this crate wires the application's
//! route table and state store into an HTTP server bound to localhost, and
//! owns the lifecycle from role decision to graceful shutdown.

pub mod lifecycle;
pub mod resolver;
pub mod router;
pub mod routes;
pub mod server;

pub use lifecycle::{decide_role, serve, DaemonOptions, Role};
pub use router::{coerce_args, RouteTable};
pub use server::{AppState, AppletCell, SharedState};
