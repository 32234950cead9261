//! Path helpers for solo state files
//!
//! State lives under the XDG state directory by default. `$SOLO_STATE_DIR`
//! overrides it, which is also how tests isolate themselves.

use std::path::{Path, PathBuf};

/// Resolve the directory holding state files.
///
/// Priority:
/// 1. `$SOLO_STATE_DIR`
/// 2. `$XDG_STATE_HOME/solo` (via the platform state dir)
/// 3. `~/.local/state/solo`
/// 4. `/tmp/solo` (last resort, e.g. no home directory)
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SOLO_STATE_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(dir) = dirs::state_dir() {
        return dir.join("solo");
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".local/state/solo");
    }

    PathBuf::from("/tmp/solo")
}

/// State file path for a given port designation. An explicit port gets its
/// own file; no explicit port uses the shared one.
pub fn state_file_path(dir: &Path, explicit_port: Option<u16>) -> PathBuf {
    match explicit_port {
        Some(port) => dir.join(format!("state-{port}.json")),
        None => dir.join("state.json"),
    }
}

/// Config file path (`$XDG_CONFIG_HOME/solo/config.toml`).
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("solo/config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_ports_get_distinct_files() {
        let dir = PathBuf::from("/tmp/solo-test");
        let a = state_file_path(&dir, Some(4000));
        let b = state_file_path(&dir, Some(4001));
        assert_ne!(a, b);
        assert!(a.to_string_lossy().ends_with("state-4000.json"));
    }

    #[test]
    fn no_port_uses_shared_file() {
        let dir = PathBuf::from("/tmp/solo-test");
        assert!(state_file_path(&dir, None)
            .to_string_lossy()
            .ends_with("state.json"));
    }
}
