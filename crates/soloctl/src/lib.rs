//! Solo Control - the caller role of the solo framework
//!
//! Parses the command line, decides whether a daemon already owns the
//! target port, and either forwards the command over RPC, runs it locally,
//! or promotes this process into the daemon. Integrators call [`run`] from
//! their `main` with a boxed application instance.

pub mod bridge;
pub mod cli;
pub mod logging;
pub mod output;
pub mod rpc_client;

pub use bridge::{execute, run};
pub use cli::{parse_cli_value, Cli, Command};
pub use rpc_client::RpcClient;
