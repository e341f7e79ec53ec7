//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/stv/stv.toml`
//! 3. Local config: file given with `--config`
//! 4. Environment variables: `STV_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, FilterDelay, RenderDepth, ViewOptions};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "STV";

/// Unified configuration for stv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Insert labels as markup instead of text
    pub html_labels: bool,
    /// Show the filter box
    pub filter: bool,
    /// Filter debounce in milliseconds, 0 runs the filter on every keystroke
    pub filter_delay_ms: u64,
    /// Default render depth, unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_depth: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            html_labels: false,
            filter: true,
            filter_delay_ms: 500,
            render_depth: None,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub html_labels: Option<bool>,
    pub filter: Option<bool>,
    pub filter_delay_ms: Option<u64>,
    pub render_depth: Option<usize>,
}

/// Get the XDG config directory for stv.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "stv").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("stv.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            html_labels: overlay.html_labels.unwrap_or(self.html_labels),
            filter: overlay.filter.unwrap_or(self.filter),
            filter_delay_ms: overlay.filter_delay_ms.unwrap_or(self.filter_delay_ms),
            render_depth: overlay.render_depth.or(self.render_depth),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; must exist
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from explicit layers. A missing global file is skipped, a
    /// missing local file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            if !local_path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", local_path.display()),
                });
            }
            debug!(path = %local_path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env)
    }

    /// Apply STV_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("html_labels") {
            settings.html_labels = val;
        }
        if let Ok(val) = config.get_bool("filter") {
            settings.filter = val;
        }
        if let Ok(val) = config.get::<u64>("filter_delay_ms") {
            settings.filter_delay_ms = val;
        }
        if let Ok(val) = config.get::<usize>("render_depth") {
            settings.render_depth = Some(val);
        }

        Ok(settings)
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            html_labels: self.html_labels,
            filter: self.filter,
            filter_delay: FilterDelay::from_millis(self.filter_delay_ms),
        }
    }

    pub fn render_depth(&self) -> RenderDepth {
        RenderDepth::from(self.render_depth)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# stv configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/stv/stv.toml  (defines your baseline)
#   Local:  --config <file>         (per invocation)
#   Env:    STV_* environment variables (explicit overrides)

# Insert node labels as markup instead of escaped text
# html_labels = false

# Show the filter box
# filter = true

# Filter debounce in milliseconds (0 = filter on every keystroke)
# filter_delay_ms = 500

# Generations below the root's children to render (unset = everything)
# render_depth = 1
"#
        .to_string()
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
    use std::collections::HashMap;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, no_env()).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.view_options().filter_delay, FilterDelay::default());
        assert_eq!(settings.render_depth(), RenderDepth::Unlimited);
    }

    #[test]
    fn given_env_overrides_when_loading_then_env_wins() {
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::from([
            ("STV_FILTER_DELAY_MS".to_string(), "0".to_string()),
            ("STV_HTML_LABELS".to_string(), "true".to_string()),
        ])));
        let settings = Settings::load_layers(None, None, env).expect("load");
        assert!(settings.html_labels);
        assert_eq!(settings.view_options().filter_delay, FilterDelay::Immediate);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let overlay = RawSettings {
            render_depth: Some(2),
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.render_depth, Some(2));
        assert!(merged.filter);
        assert_eq!(merged.filter_delay_ms, 500);
    }

    #[test]
    fn given_template_when_parsed_then_valid_toml_with_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }
}
