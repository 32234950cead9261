//! CLI - command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic; the command bridge
//! interprets the parsed shape.

use clap::{Parser, Subcommand};
use serde_json::Value;

/// Run or address a solo application.
#[derive(Parser, Debug)]
#[command(about = "Run a solo application as a one-shot command or daemon", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Command to run; without one, the application's `default` operation
    /// is invoked.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Stay resident and serve the application over HTTP.
    #[arg(long, global = true)]
    pub serve: bool,

    /// Target port. Selects the port-keyed state file; 0 means no explicit
    /// port.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Forward a notification hint to the application's `notify` field.
    #[arg(long, global = true)]
    pub notify: bool,

    /// Developer mode: verbose logging.
    #[arg(long, global = true)]
    pub dev: bool,

    /// Print the application's declared fields and operations, then exit.
    #[arg(long, global = true)]
    pub view: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one state field.
    Get { field: String },

    /// Write one state field. The value is parsed as JSON first, falling
    /// back to a raw string.
    Set { field: String, value: String },

    /// Invoke an operation with positional arguments.
    Call {
        operation: String,
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

/// Parse a CLI-supplied value: JSON first, raw string on failure, so
/// `true`, `42` and `"quoted"` become typed values while bare words stay
/// strings.
pub fn parse_cli_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_become_typed() {
        assert_eq!(parse_cli_value("true"), json!(true));
        assert_eq!(parse_cli_value("42"), json!(42));
        assert_eq!(parse_cli_value("\"quoted\""), json!("quoted"));
        assert_eq!(parse_cli_value("[1,2]"), json!([1, 2]));
    }

    #[test]
    fn bare_words_stay_strings() {
        assert_eq!(parse_cli_value("hello"), json!("hello"));
        assert_eq!(parse_cli_value("not{json"), json!("not{json"));
    }
}
