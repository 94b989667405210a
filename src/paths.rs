use std::path::PathBuf;

/// Returns the root directory for local board state.
///
/// Uses the `MESA_ROOT` environment variable if set, otherwise defaults to `.mesa`
/// in the current directory.
pub fn mesa_root() -> PathBuf {
    if let Ok(root) = std::env::var("MESA_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".mesa")
    }
}

/// Returns the path to the configuration file.
pub fn config_file() -> PathBuf {
    mesa_root().join("config.yaml")
}
