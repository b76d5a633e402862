// SPDX-License-Identifier: MPL-2.0
//! Path resolution for the settings directory.
//!
//! # Resolution Order
//!
//! 1. **Explicit override** - parameter to `_with_override()` functions
//! 2. **CLI argument** (`--config-dir`) - set via [`init_cli_override`]
//! 3. **Environment variable** (`LAYER_LENS_CONFIG_DIR`)
//! 4. **Platform default** - via `dirs` crate

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
pub const APP_NAME: &str = "LayerLens";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "LAYER_LENS_CONFIG_DIR";

static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records the `--config-dir` argument. Only the first call has an effect.
pub fn init_cli_override(config_dir: Option<String>) {
    let _ = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from));
}

fn get_cli_config_dir() -> Option<PathBuf> {
    CLI_CONFIG_DIR.get().and_then(Clone::clone)
}

/// Returns the application config directory path.
///
/// Platform defaults:
///    - Linux: `~/.config/LayerLens/`
///    - macOS: `~/Library/Application Support/LayerLens/`
///    - Windows: `C:\Users\<User>\AppData\Roaming\LayerLens\`
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = get_cli_config_dir() {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the process environment
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn explicit_override_wins() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "/tmp/from-env");
        let dir = get_app_config_dir_with_override(Some(PathBuf::from("/tmp/explicit")));
        std::env::remove_var(ENV_CONFIG_DIR);
        assert_eq!(dir, Some(PathBuf::from("/tmp/explicit")));
    }

    #[test]
    fn env_var_used_when_set() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "/tmp/layer-lens-env");
        let dir = get_app_config_dir_with_override(None);
        std::env::remove_var(ENV_CONFIG_DIR);
        assert_eq!(dir, Some(PathBuf::from("/tmp/layer-lens-env")));
    }

    #[test]
    fn empty_env_var_falls_back_to_platform_dir() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "");
        let dir = get_app_config_dir_with_override(None);
        std::env::remove_var(ENV_CONFIG_DIR);
        if let Some(path) = dir {
            assert!(path.ends_with(APP_NAME));
        }
    }
}
