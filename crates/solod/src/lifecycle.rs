//! Lifecycle controller - role decision and daemon supervision
//!
//! `Initializing -> RoleDeciding -> {Daemon | OneShotClient | OneShotLocal}
//! -> Terminated`. The probe runs exactly once, and only when a port was
//! explicitly requested. The OS socket layer is the sole mutual-exclusion
//! primitive: whoever binds the port is the daemon.

use crate::resolver;
use crate::server::{self, SharedState};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// What this invocation is going to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Hold the port and serve until terminated.
    Daemon,
    /// Forward the command to the live daemon and exit.
    OneShotClient,
    /// Execute the command in-process and exit.
    OneShotLocal,
}

/// Decide the role for this invocation. No explicit port skips probing
/// entirely and defaults to local execution.
pub async fn decide_role(explicit_port: Option<u16>, serve: bool, probe_timeout: Duration) -> Role {
    let Some(port) = explicit_port else {
        return Role::OneShotLocal;
    };

    if resolver::probe(port, probe_timeout).await {
        info!("daemon already live on port {port}, deferring to it");
        Role::OneShotClient
    } else if serve {
        Role::Daemon
    } else {
        Role::OneShotLocal
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DaemonOptions {
    pub requested_port: u16,
    pub max_port_attempts: u16,
    /// Window granted to in-flight requests after a termination signal.
    pub grace: Duration,
}

/// Become the daemon: bind the first available port at-or-after the
/// requested one and serve until SIGTERM/SIGINT. Returns the process exit
/// code: 0 for a clean drain, 1 when the grace window had to force matters.
pub async fn serve(state: SharedState, opts: DaemonOptions) -> Result<i32> {
    let port = resolver::find_available(opts.requested_port, opts.max_port_attempts)?;
    if port != opts.requested_port {
        info!(
            "port {} occupied, advancing to {}",
            opts.requested_port, port
        );
    }

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("listening on http://127.0.0.1:{port}");

    // First save creates the state file for this port.
    let snapshot = state.cell.read().await.snapshot();
    state.store.persist(&snapshot);

    let (signal_tx, signal_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(true);
    });

    let drain = {
        let mut rx = signal_rx.clone();
        async move {
            let _ = rx.changed().await;
            info!("shutdown requested, draining in-flight requests");
        }
    };

    let server = server::serve_on(listener, state, drain);
    tokio::pin!(server);

    let force = {
        let mut rx = signal_rx;
        async move {
            let _ = rx.changed().await;
            tokio::time::sleep(opts.grace).await;
        }
    };

    // The grace timer races the clean-close path; the winner decides the
    // exit code.
    tokio::select! {
        result = &mut server => {
            result?;
            info!("daemon stopped cleanly");
            Ok(0)
        }
        _ = force => {
            warn!("grace window of {:?} elapsed, forcing exit", opts.grace);
            Ok(1)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to install SIGINT handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("termination signal received");
}
