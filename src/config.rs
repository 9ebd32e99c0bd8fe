//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/roadmapgen/roadmapgen.toml`
//! 3. Explicit config file (`--config`), which must exist
//! 4. Environment variables: `ROADMAPGEN_*` prefix
//! 5. Command-line flags (applied by the CLI via [`Settings::merge_with`])

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};

/// Default inference server (Ollama) address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Path of the non-streaming generate call, relative to the base URL.
pub const GENERATE_PATH: &str = "/api/generate";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "ROADMAPGEN";

/// Unified configuration for roadmapgen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Inference server base URL (default: http://localhost:11434)
    pub base_url: String,
    /// Model identifier sent with every request
    pub model_name: String,
    /// Whole-request timeout in seconds; unset keeps the HTTP client default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Send `"format": "json"` to constrain the model's output
    pub json_format: bool,
    /// Reject a non-array `children` value instead of ignoring it
    pub strict_children: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            request_timeout_secs: None,
            json_format: false,
            strict_children: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawSettings {
    pub base_url: Option<String>,
    pub model_name: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub json_format: Option<bool>,
    pub strict_children: Option<bool>,
}

/// Get the XDG config directory for roadmapgen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "roadmapgen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("roadmapgen.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Full URL of the generate endpoint.
    pub fn generate_endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            model_name: overlay
                .model_name
                .clone()
                .unwrap_or_else(|| self.model_name.clone()),
            request_timeout_secs: overlay.request_timeout_secs.or(self.request_timeout_secs),
            json_format: overlay.json_format.unwrap_or(self.json_format),
            strict_children: overlay.strict_children.unwrap_or(self.strict_children),
        }
    }

    /// Load settings with layered precedence from the real environment.
    ///
    /// Like [`Settings::load_layers`], the result still needs validating.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it is an error if it does not exist
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        let global = global_config_path();
        Self::load_layers(global.as_deref(), config_file, None)
    }

    /// Load settings from explicit layers.
    ///
    /// `env` replaces the process environment as the source of `ROADMAPGEN_*`
    /// overrides when given. The result is not validated: a higher layer
    /// (command-line flags) may still replace a bad value, so callers run
    /// [`Settings::validate`] once every layer is applied.
    pub fn load_layers(
        global: Option<&Path>,
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, skipped when absent
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file, required
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, env)?;

        Ok(current)
    }

    /// Apply ROADMAPGEN_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        source: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let builder = Config::builder().add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(source),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = optional(config.get_string("base_url"))? {
            settings.base_url = val;
        }
        if let Some(val) = optional(config.get_string("model_name"))? {
            settings.model_name = val;
        }
        if let Some(val) = optional(config.get_int("request_timeout_secs"))? {
            let secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("request_timeout_secs must not be negative: {val}"),
            })?;
            settings.request_timeout_secs = Some(secs);
        }
        if let Some(val) = optional(config.get_bool("json_format"))? {
            settings.json_format = val;
        }
        if let Some(val) = optional(config.get_bool("strict_children"))? {
            settings.strict_children = val;
        }

        Ok(settings)
    }

    /// Reject settings that cannot produce a valid request.
    pub fn validate(&self) -> ApplicationResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApplicationError::Config {
                message: format!("base_url must start with http:// or https://: {}", self.base_url),
            });
        }
        if self.model_name.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "model_name must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ApplicationError::Config {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# roadmapgen configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/roadmapgen/roadmapgen.toml
#   File:   --config <FILE>
#   Env:    ROADMAPGEN_* environment variables (e.g. ROADMAPGEN_MODEL_NAME)
#   Flags:  --base-url, --model, --timeout, --json-format, --strict

# Inference server base URL; requests go to <base_url>/api/generate
# base_url = "http://localhost:11434"

# Model identifier
# model_name = "llama3.2:latest"

# Whole-request timeout in seconds (unset: HTTP client default)
# request_timeout_secs = 120

# Ask the server for JSON-constrained output ("format": "json")
# json_format = false

# Fail when a node's "children" is present but not an array
# strict_children = false
"#
        .to_string()
    }
}

/// Missing keys are not errors; malformed values are.
fn optional<T>(result: Result<T, ConfigError>) -> ApplicationResult<Option<T>> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    #[test]
    fn given_no_layers_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, no_env()).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.generate_endpoint(),
            "http://localhost:11434/api/generate"
        );
        assert!(settings.request_timeout().is_none());
    }

    #[test]
    fn given_trailing_slash_when_building_endpoint_then_avoids_double_slash() {
        let settings = Settings {
            base_url: "http://gpu-box:11434/".into(),
            ..Settings::default()
        };
        assert_eq!(settings.generate_endpoint(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            model_name: Some("qwen3".into()),
            strict_children: Some(true),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.model_name, "qwen3");
        assert!(merged.strict_children);
        assert_eq!(merged.base_url, DEFAULT_BASE_URL);
        assert!(!merged.json_format);
    }

    #[test]
    fn given_invalid_base_url_when_validating_then_fails() {
        let settings = Settings {
            base_url: "localhost:11434".into(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_zero_timeout_when_validating_then_fails() {
        let settings = Settings {
            request_timeout_secs: Some(0),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert_eq!(raw, RawSettings::default());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings {
            request_timeout_secs: Some(90),
            json_format: true,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
