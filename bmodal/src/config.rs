//! Configuration for bmodal overlays.
//!
//! Configuration is loaded from `bmodal/bmodal.toml` under the platform config
//! directory and provides overlay option defaults, stacking layers, loading
//! screen behavior and logging settings. Every field has a default, so a
//! missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use etcetera::BaseStrategy;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::loading::STATUS_MESSAGES;

/// Configuration loaded from `bmodal.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BModalConfig {
    /// Partial overlay option record (same keys as the per-overlay
    /// overrides, e.g. `closeEscape`), merged between the built-in defaults
    /// and each caller's own overrides.
    pub overlay: Value,
    pub stacking: StackingConfig,
    pub loading: LoadingConfig,
    pub logging: LoggingConfig,
}

/// Layer values handed out by the stacking tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StackingConfig {
    /// Layer of the first open overlay.
    pub base_layer: i32,
    /// Distance between consecutive overlays.
    pub layer_step: i32,
}

/// Loading screen configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub status_interval_ms: u64,
    pub icon: String,
    pub messages: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub level: String,
    pub suppressed_patterns: Vec<String>,
}

impl Default for BModalConfig {
    fn default() -> Self {
        Self {
            overlay: Value::Object(Map::new()),
            stacking: StackingConfig::default(),
            loading: LoadingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self {
            base_layer: 2050,
            layer_step: 20,
        }
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: 5000,
            icon: "assets/bmodal/img/loading.gif".to_string(),
            messages: STATUS_MESSAGES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: Some(std::env::temp_dir().join("bmodal.log")),
            level: "info".to_string(),
            suppressed_patterns: vec![
                "anchor resync".to_string(),
                "status rotated".to_string(),
            ],
        }
    }
}

impl BModalConfig {
    /// Path of the default configuration file, if a home directory exists.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        etcetera::choose_base_strategy()
            .ok()
            .map(|strategy| strategy.config_dir().join("bmodal").join("bmodal.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the file doesn't exist.
    /// Returns an error only if the file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str::<BModalConfig>(&content)?;
        Ok(config)
    }

    /// Time between two status line changes of a loading screen.
    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.loading.status_interval_ms)
    }

    /// Set the overlay option defaults.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Value) -> Self {
        self.overlay = overlay;
        self
    }

    /// Set the stacking layers.
    #[must_use]
    pub fn with_layers(mut self, base_layer: i32, layer_step: i32) -> Self {
        self.stacking = StackingConfig {
            base_layer,
            layer_step,
        };
        self
    }

    /// Set the status rotation interval.
    #[must_use]
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.loading.status_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the loading icon source.
    #[must_use]
    pub fn with_loading_icon(mut self, icon: impl Into<String>) -> Self {
        self.loading.icon = icon.into();
        self
    }

    /// Replace the status message pool.
    #[must_use]
    pub fn with_status_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loading.messages = messages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging.log_file = Some(path.into());
        self
    }

    /// Set the log level (e.g., "info", "debug", "warn").
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = BModalConfig::default();
        assert_eq!(config.overlay, json!({}));
        assert_eq!(config.stacking.base_layer, 2050);
        assert_eq!(config.stacking.layer_step, 20);
        assert_eq!(config.status_interval(), Duration::from_secs(5));
        assert_eq!(config.loading.messages.len(), 71);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = BModalConfig::default()
            .with_overlay(json!({ "closeEscape": true }))
            .with_layers(1000, 10)
            .with_status_interval(Duration::from_millis(250))
            .with_loading_icon("spinner.svg")
            .with_status_messages(["one", "two"])
            .with_log_level("debug");

        assert_eq!(config.overlay["closeEscape"], true);
        assert_eq!(config.stacking, StackingConfig { base_layer: 1000, layer_step: 10 });
        assert_eq!(config.loading.status_interval_ms, 250);
        assert_eq!(config.loading.icon, "spinner.svg");
        assert_eq!(config.loading.messages, vec!["one", "two"]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn deserialize_partial_config() {
        let toml_str = r#"
[overlay]
closeClick = true
color = "info"

[stacking]
layer_step = 50
"#;
        let config = toml::from_str::<BModalConfig>(toml_str).expect("should deserialize");
        assert_eq!(config.overlay, json!({ "closeClick": true, "color": "info" }));
        // Base layer should be default
        assert_eq!(config.stacking.base_layer, 2050);
        assert_eq!(config.stacking.layer_step, 50);
        assert_eq!(config.loading.status_interval_ms, 5000);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[loading]\nstatus_interval_ms = 1500\nmessages = [\"Working.\"]\n\n[logging]\nlevel = \"trace\""
        )
        .expect("write config");

        let config = BModalConfig::load_from(file.path()).expect("should load");
        assert_eq!(config.status_interval(), Duration::from_millis(1500));
        assert_eq!(config.loading.messages, vec!["Working."]);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[stacking]\nbase_layer = \"high\"").expect("write config");
        assert!(BModalConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn load_from_nonexistent_path_returns_error() {
        let result = BModalConfig::load_from(Path::new("/nonexistent/bmodal.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn default_path_ends_with_bmodal_toml() {
        if let Some(path) = BModalConfig::config_path() {
            assert!(path.ends_with("bmodal/bmodal.toml"));
        }
    }
}
