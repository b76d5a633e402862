// SPDX-License-Identifier: MPL-2.0
//! User preferences stored in a sectioned `settings.toml` file.
//!
//! ```toml
//! [navigation]
//! zoom_in_factor = 0.5
//! fast_pan_step = 50.0
//!
//! [display]
//! pixel_center_offset = 0.5
//!
//! [diagnostics]
//! event_log_capacity = 256
//! ```
//!
//! Every field is optional; missing values fall back to [`defaults`].

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Sections
// =============================================================================

/// Pan and zoom behaviour applied to the whole stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(
        default = "default_zoom_in_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub zoom_in_factor: Option<f64>,
    #[serde(
        default = "default_zoom_out_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub zoom_out_factor: Option<f64>,
    #[serde(default = "default_pan_step", skip_serializing_if = "Option::is_none")]
    pub pan_step: Option<f64>,
    #[serde(
        default = "default_fast_pan_step",
        skip_serializing_if = "Option::is_none"
    )]
    pub fast_pan_step: Option<f64>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            pan_step: default_pan_step(),
            fast_pan_step: default_fast_pan_step(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(
        default = "default_pixel_center_offset",
        skip_serializing_if = "Option::is_none"
    )]
    pub pixel_center_offset: Option<f64>,
    #[serde(
        default = "default_vector_hit_tolerance",
        skip_serializing_if = "Option::is_none"
    )]
    pub vector_hit_tolerance: Option<f64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pixel_center_offset: default_pixel_center_offset(),
            vector_hit_tolerance: default_vector_hit_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(
        default = "default_event_log_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_log_capacity: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: default_event_log_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Zoom-in factor, falling back to the default for missing or invalid values.
    #[must_use]
    pub fn zoom_in_factor(&self) -> f64 {
        positive_or(self.navigation.zoom_in_factor, DEFAULT_ZOOM_IN_FACTOR)
    }

    #[must_use]
    pub fn zoom_out_factor(&self) -> f64 {
        positive_or(self.navigation.zoom_out_factor, DEFAULT_ZOOM_OUT_FACTOR)
    }

    /// Pan step in view pixels, `fast` selecting the accelerated step.
    #[must_use]
    pub fn pan_step(&self, fast: bool) -> f64 {
        if fast {
            positive_or(self.navigation.fast_pan_step, DEFAULT_FAST_PAN_STEP)
        } else {
            positive_or(self.navigation.pan_step, DEFAULT_PAN_STEP)
        }
    }

    #[must_use]
    pub fn pixel_center_offset(&self) -> f64 {
        self.display
            .pixel_center_offset
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_PIXEL_CENTER_OFFSET)
    }

    #[must_use]
    pub fn vector_hit_tolerance(&self) -> f64 {
        positive_or(
            self.display.vector_hit_tolerance,
            DEFAULT_VECTOR_HIT_TOLERANCE,
        )
    }

    #[must_use]
    pub fn event_log_capacity(&self) -> crate::domain::EventCapacity {
        crate::domain::EventCapacity::new(
            self.diagnostics
                .event_log_capacity
                .unwrap_or(DEFAULT_EVENT_LOG_CAPACITY),
        )
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(fallback)
}

fn default_zoom_in_factor() -> Option<f64> {
    Some(DEFAULT_ZOOM_IN_FACTOR)
}

fn default_zoom_out_factor() -> Option<f64> {
    Some(DEFAULT_ZOOM_OUT_FACTOR)
}

fn default_pan_step() -> Option<f64> {
    Some(DEFAULT_PAN_STEP)
}

fn default_fast_pan_step() -> Option<f64> {
    Some(DEFAULT_FAST_PAN_STEP)
}

fn default_pixel_center_offset() -> Option<f64> {
    Some(DEFAULT_PIXEL_CENTER_OFFSET)
}

fn default_vector_hit_tolerance() -> Option<f64> {
    Some(DEFAULT_VECTOR_HIT_TOLERANCE)
}

fn default_event_log_capacity() -> Option<usize> {
    Some(DEFAULT_EVENT_LOG_CAPACITY)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!("{}: {}", path.display(), err)),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.zoom_in_factor(), 0.5);
        assert_eq!(config.zoom_out_factor(), 2.0);
        assert_eq!(config.pan_step(false), 1.0);
        assert_eq!(config.pan_step(true), 50.0);
        assert_eq!(config.pixel_center_offset(), 0.5);
        assert_eq!(
            config.event_log_capacity().value(),
            DEFAULT_EVENT_LOG_CAPACITY
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut config = Config::default();
        config.navigation.fast_pan_step = Some(80.0);
        config.display.pixel_center_offset = Some(0.0);

        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
        assert_eq!(loaded.pan_step(true), 80.0);
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "[navigation]\npan_step = 4.0\n").expect("write");

        let loaded = load_from_path(&path).expect("load");
        assert_eq!(loaded.pan_step(false), 4.0);
        assert_eq!(loaded.zoom_out_factor(), DEFAULT_ZOOM_OUT_FACTOR);
        assert_eq!(loaded.diagnostics, DiagnosticsConfig::default());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let mut config = Config::default();
        config.navigation.zoom_in_factor = Some(-1.0);
        config.navigation.pan_step = Some(f64::NAN);
        assert_eq!(config.zoom_in_factor(), DEFAULT_ZOOM_IN_FACTOR);
        assert_eq!(config.pan_step(false), DEFAULT_PAN_STEP);
    }

    #[test]
    fn load_from_path_rejects_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "[navigation\nzoom_in_factor = ").expect("write");

        let result = load_from_path(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn load_with_override_reports_warning_on_invalid_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "not = [valid").expect("write");

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_some());
    }

    #[test]
    fn load_with_override_missing_file_is_silent() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }
}
