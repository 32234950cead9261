//! Shared error taxonomy

use std::fmt;
use thiserror::Error;

/// Why a daemon could not be reached. Distinguished in diagnostics; all
/// collapse to "operation not completed" for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachableKind {
    Refused,
    TimedOut,
    Protocol,
}

impl fmt::Display for UnreachableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreachableKind::Refused => write!(f, "connection refused"),
            UnreachableKind::TimedOut => write!(f, "timed out"),
            UnreachableKind::Protocol => write!(f, "protocol error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Port scan exhausted without finding a bindable port. Fatal to the
    /// starting process only.
    #[error("no available port after {attempts} attempts starting at {start}")]
    NoAvailablePort { start: u16, attempts: u16 },

    /// The target daemon did not answer.
    #[error("daemon on port {port} not reachable: {kind}")]
    Unreachable { port: u16, kind: UnreachableKind },

    /// A routed operation failed, locally or remotely.
    #[error("operation failed: {0}")]
    Operation(String),

    /// `get` on a field the snapshot does not contain.
    #[error("field '{0}' not found in state")]
    FieldNotFound(String),

    /// `call` on an operation the descriptor does not declare.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}
