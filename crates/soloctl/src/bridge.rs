//! Command bridge - from argument vector to local call, RPC call, or daemon
//!
//! The resolution rule runs once per invocation: an explicit target port
//! (given, or implied by `--serve`) is probed; a live daemon gets the
//! command forwarded; a dead port with `--serve` promotes this process to
//! daemon; otherwise the command runs locally against a freshly
//! constructed, file-seeded instance.

use crate::cli::{parse_cli_value, Cli, Command};
use crate::output;
use crate::rpc_client::RpcClient;
use anyhow::Result;
use clap::Parser;
use serde_json::{Map, Value};
use solo_common::state::{apply_update, extract_state, StateMeta};
use solo_common::{Applet, Config, Error, StateStore, UnreachableKind, DEFAULT_OPERATION};
use solod::server::AppState;
use solod::{decide_role, lifecycle, DaemonOptions, Role, SharedState};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

/// Entry point for integrator binaries: parse the argument vector, decide
/// the role, run to completion.
pub async fn run(applet: Box<dyn Applet>) -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.dev);
    let config = Config::load();

    match execute(applet, cli, &config).await {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(err) => {
            output::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// The full bridge, separated from `run` so tests can drive it with a
/// hand-built [`Cli`].
pub async fn execute(mut applet: Box<dyn Applet>, cli: Cli, config: &Config) -> Result<i32> {
    if cli.view {
        print!("{}", output::render_descriptor(applet.descriptor()));
        return Ok(0);
    }

    let explicit_port = resolve_explicit_port(&cli, config);

    // Initializing: seed from the state file before the instance diverges.
    let store = StateStore::for_port(explicit_port);
    let mut meta = StateMeta::new();
    store.seed(applet.as_mut(), &mut meta);

    // RoleDeciding: probe exactly once, and only for an explicit port.
    let role = decide_role(explicit_port, cli.serve, config.probe_timeout()).await;
    debug!("resolved role: {role:?} (explicit port: {explicit_port:?})");

    match role {
        Role::Daemon => {
            if cli.notify {
                forward_notify_local(applet.as_mut(), &mut meta);
            }
            if cli.command.is_some() {
                debug!("serving; the given command is ignored in daemon role");
            }
            let state: SharedState = Arc::new(AppState::new(applet, meta, store));
            let requested_port = explicit_port.unwrap_or(config.network.default_port);
            lifecycle::serve(
                state,
                DaemonOptions {
                    requested_port,
                    max_port_attempts: config.network.max_port_attempts,
                    grace: config.grace(),
                },
            )
            .await
        }
        Role::OneShotClient => {
            // decide_role only yields the client role after probing an
            // explicit port.
            let port = explicit_port.unwrap_or(config.network.default_port);
            run_remote(cli, port, config).await
        }
        Role::OneShotLocal => {
            if let (Some(port), Some(_)) = (explicit_port, cli.command.as_ref()) {
                // A verb aimed at an explicit port with nothing listening
                // fails; only bare invocations fall back to local execution.
                return Err(Error::Unreachable {
                    port,
                    kind: UnreachableKind::Refused,
                }
                .into());
            }
            if cli.notify {
                forward_notify_local(applet.as_mut(), &mut meta);
            }
            run_local(applet, meta, store, cli.command)
        }
    }
}

/// `--port 0` means "no explicit port"; `--serve` without a port implies
/// the configured default.
fn resolve_explicit_port(cli: &Cli, config: &Config) -> Option<u16> {
    match cli.port {
        Some(0) => None,
        Some(port) => Some(port),
        None if cli.serve => Some(config.network.default_port),
        None => None,
    }
}

/// The notification hint rides the normal update path: declared `notify`
/// fields receive it, everything else drops it silently.
fn forward_notify_local(applet: &mut dyn Applet, meta: &mut StateMeta) {
    let mut hint = Map::new();
    hint.insert("notify".to_string(), Value::Bool(true));
    apply_update(applet, meta, &hint);
}

async fn run_remote(cli: Cli, port: u16, config: &Config) -> Result<i32> {
    let client = RpcClient::new(port, config.call_timeout())?;

    if cli.notify {
        let mut hint = Map::new();
        hint.insert("notify".to_string(), Value::Bool(true));
        client.set_state(&hint).await?;
    }

    match cli.command {
        None => {
            let result = client.call(DEFAULT_OPERATION, &[]).await?;
            output::print_value(&result);
            Ok(0)
        }
        Some(Command::Get { field }) => {
            let state = client.get_state().await?;
            match state.get(&field) {
                Some(value) => {
                    output::print_value(value);
                    Ok(0)
                }
                None => Err(Error::FieldNotFound(field).into()),
            }
        }
        Some(Command::Set { field, value }) => {
            let mut patch = Map::new();
            patch.insert(field.clone(), parse_cli_value(&value));
            let state = client.set_state(&patch).await?;
            output::print_value(state.get(&field).unwrap_or(&Value::Null));
            Ok(0)
        }
        Some(Command::Call { operation, args }) => {
            let args: Vec<Value> = args.iter().map(|a| parse_cli_value(a)).collect();
            let result = client.call(&operation, &args).await?;
            output::print_value(&result);
            Ok(0)
        }
    }
}

fn run_local(
    mut applet: Box<dyn Applet>,
    mut meta: StateMeta,
    store: StateStore,
    command: Option<Command>,
) -> Result<i32> {
    match command {
        None => invoke_local(
            applet.as_mut(),
            &mut meta,
            &store,
            DEFAULT_OPERATION,
            Vec::new(),
        ),
        Some(Command::Get { field }) => {
            let snapshot = extract_state(applet.as_ref(), &meta);
            match snapshot.get(&field) {
                Some(value) => {
                    output::print_value(value);
                    Ok(0)
                }
                None => Err(Error::FieldNotFound(field).into()),
            }
        }
        Some(Command::Set { field, value }) => {
            let mut patch = Map::new();
            patch.insert(field.clone(), parse_cli_value(&value));
            apply_update(applet.as_mut(), &mut meta, &patch);

            let snapshot = extract_state(applet.as_ref(), &meta);
            store.persist(&snapshot);
            output::print_value(snapshot.get(&field).unwrap_or(&Value::Null));
            Ok(0)
        }
        Some(Command::Call { operation, args }) => {
            let args: Vec<Value> = args.iter().map(|a| parse_cli_value(a)).collect();
            invoke_local(applet.as_mut(), &mut meta, &store, &operation, args)
        }
    }
}

fn invoke_local(
    applet: &mut dyn Applet,
    meta: &mut StateMeta,
    store: &StateStore,
    operation: &str,
    args: Vec<Value>,
) -> Result<i32> {
    if !applet.descriptor().has_operation(operation) {
        return Err(Error::UnknownOperation(operation.to_string()).into());
    }

    let before = extract_state(applet, meta);
    match applet.invoke(operation, args) {
        Ok(value) => {
            let after = extract_state(applet, meta);
            if !before.fields_equal(&after) {
                meta.touch();
                store.persist(&extract_state(applet, meta));
            }
            output::print_value(&value);
            Ok(0)
        }
        Err(message) => {
            error!("operation '{operation}' failed: {message}");
            Err(Error::Operation(message).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(port: Option<u16>, serve: bool) -> Cli {
        Cli {
            command: None,
            serve,
            port,
            notify: false,
            dev: false,
            view: false,
        }
    }

    #[test]
    fn port_zero_means_no_explicit_port() {
        let config = Config::default();
        assert_eq!(resolve_explicit_port(&cli(Some(0), false), &config), None);
        assert_eq!(
            resolve_explicit_port(&cli(Some(4000), false), &config),
            Some(4000)
        );
    }

    #[test]
    fn serve_implies_the_configured_default_port() {
        let config = Config::default();
        assert_eq!(
            resolve_explicit_port(&cli(None, true), &config),
            Some(config.network.default_port)
        );
        assert_eq!(resolve_explicit_port(&cli(None, false), &config), None);
    }
}
