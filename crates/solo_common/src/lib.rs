//! Solo Common - Shared types for the solo daemon framework
//!
//! One application definition serves as both a one-shot command and a
//! persistent localhost daemon. This crate holds everything both roles need:
//! the capability descriptor, the state model, the state store, the wire
//! protocol types, configuration and path resolution.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod paths;
pub mod protocol;
pub mod state;
pub mod store;

pub use config::Config;
pub use descriptor::{Applet, Descriptor, FieldSpec, OperationSpec, ValueKind, DEFAULT_OPERATION};
pub use error::{Error, UnreachableKind};
pub use protocol::{CallReply, ErrorReply, StateReply, STATUS_OK};
pub use state::{apply_update, extract_state, Snapshot, StateMeta, LAST_UPDATED, SERVER_STARTED};
pub use store::StateStore;
