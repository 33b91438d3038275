//! Configuration module.
//!
//! Handles loading, validating, and merging `pixel2svg.toml`. Stock
//! defaults are the base layer; a user file only overrides the keys it
//! names.
//!
//! ## Config File Location
//!
//! - `--config FILE` on the command line (the file must exist), otherwise
//! - `pixel2svg.toml` in the current directory, if present, otherwise
//! - stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! max_file_size_mb = 500        # Largest accepted input file
//! max_dimension = 30000         # Largest accepted image side, after resize
//! max_pixels = 500000000        # Largest accepted width * height
//! max_resize_dimension = 100000 # Largest accepted --width / --height
//!
//! [output]
//! transparency = "omit"         # "omit" or "preserve" fully transparent pixels
//!
//! [progress]
//! interval_ms = 100             # Minimum delay between progress redraws
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::progress::DEFAULT_INTERVAL;
use crate::types::Transparency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "pixel2svg.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Tool configuration loaded from `pixel2svg.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Input and image size limits.
    pub limits: LimitsConfig,
    /// Document output settings.
    pub output: OutputConfig,
    /// Progress display settings.
    pub progress: ProgressConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "limits.max_file_size_mb must be non-zero".into(),
            ));
        }
        if limits.max_dimension == 0 || limits.max_resize_dimension == 0 {
            return Err(ConfigError::Validation(
                "limits.max_dimension and limits.max_resize_dimension must be non-zero".into(),
            ));
        }
        if limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be non-zero".into(),
            ));
        }
        if self.progress.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "progress.interval_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Input and image size limits.
///
/// The grid and the used mask are both `O(width * height)`, so these bound
/// the memory a single conversion can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest accepted input file, in MiB.
    pub max_file_size_mb: u64,
    /// Largest accepted image width or height, after any resize.
    pub max_dimension: u32,
    /// Largest accepted `width * height`, after any resize.
    pub max_pixels: u64,
    /// Largest accepted requested resize width or height.
    pub max_resize_dimension: u32,
}

impl LimitsConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 500,
            max_dimension: 30_000,
            max_pixels: 500_000_000,
            max_resize_dimension: 100_000,
        }
    }
}

/// Document output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// What to do with fully transparent pixels.
    pub transparency: Transparency,
}

/// Progress display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConfig {
    /// Minimum delay between two progress bar redraws, in milliseconds.
    pub interval_ms: u64,
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config file's contents on top of the stock defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value(), overlay);
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Look for [`CONFIG_FILENAME`] in `dir`.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    path.is_file().then_some(path)
}

/// Load the effective configuration.
///
/// An explicit `path` must exist. Without one, `pixel2svg.toml` in the
/// working directory is used when present; otherwise stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.is_file() => return Err(ConfigError::NotFound(p.to_path_buf())),
        Some(p) => Some(p.to_path_buf()),
        None => discover_config(&std::env::current_dir()?),
    };
    match path {
        Some(p) => parse_config(&fs::read_to_string(&p)?),
        None => Ok(Config::default()),
    }
}

/// Returns a fully-commented stock `pixel2svg.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixel2svg configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# pixel2svg reads ./pixel2svg.toml, or the file given with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
# The pixel grid and its bookkeeping both grow with width * height, so these
# limits bound the memory one conversion can use.
[limits]
# Largest accepted input file, in MiB.
max_file_size_mb = 500

# Largest accepted image width or height (after --width/--height).
max_dimension = 30000

# Largest accepted width * height (after --width/--height).
max_pixels = 500000000

# Largest value accepted for --width or --height.
max_resize_dimension = 100000

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Fully transparent pixels:
#   "omit"     - leave them unpainted (smaller file, same look)
#   "preserve" - write them as fill-opacity="0.000" rectangles
transparency = "omit"

# ---------------------------------------------------------------------------
# Progress
# ---------------------------------------------------------------------------
[progress]
# Minimum delay between progress bar redraws, in milliseconds.
interval_ms = 100
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_file_size_mb, 500);
        assert_eq!(config.limits.max_dimension, 30_000);
        assert_eq!(config.limits.max_pixels, 500_000_000);
        assert_eq!(config.limits.max_resize_dimension, 100_000);
        assert_eq!(config.limits.max_file_size_bytes(), 500 * 1024 * 1024);
    }

    #[test]
    fn default_output_and_progress() {
        let config = Config::default();
        assert_eq!(config.output.transparency, Transparency::Omit);
        assert_eq!(config.progress.interval(), Duration::from_millis(100));
        assert_eq!(config.progress.interval(), DEFAULT_INTERVAL);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
[limits]
max_dimension = 4096
"#,
        )
        .unwrap();
        // Overridden value
        assert_eq!(config.limits.max_dimension, 4096);
        // Default values preserved
        assert_eq!(config.limits.max_pixels, 500_000_000);
        assert_eq!(config.output.transparency, Transparency::Omit);
    }

    #[test]
    fn parse_transparency_mode() {
        let config = parse_config(
            r#"
[output]
transparency = "preserve"
"#,
        )
        .unwrap();
        assert_eq!(config.output.transparency, Transparency::Preserve);
    }

    #[test]
    fn parse_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let result = parse_config(
            r#"
[limits]
max_dimensions = 10
"#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(parse_config("[colors]\nbackground = \"#fff\"\n").is_err());
    }

    #[test]
    fn invalid_transparency_rejected() {
        assert!(parse_config("[output]\ntransparency = \"hide\"\n").is_err());
    }

    #[test]
    fn zero_limits_fail_validation() {
        let result = parse_config("[limits]\nmax_pixels = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let result = parse_config("[progress]\ninterval_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_overlay_wins_and_base_survives() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        assert_eq!(parse_config(stock_config_toml()).unwrap(), Config::default());
    }

    #[test]
    fn discover_finds_file_in_dir() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(discover_config(tmp.path()), None);

        fs::write(tmp.path().join(CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            discover_config(tmp.path()),
            Some(tmp.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn load_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[progress]\ninterval_ms = 250\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.progress.interval_ms, 250);
    }

    #[test]
    fn load_missing_explicit_path_errors() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
