//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nestdnd/nestdnd.toml`
//! 3. Local config: `<project_dir>/.nestdnd.toml`
//! 4. Environment variables: `NESTDND_*` prefix
//!
//! A relative `seed_file` is resolved against the directory of the file
//! that sets it.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::util::path::{expand_env_vars, PathExt};

pub const APP_NAME: &str = "nestdnd";
pub const ENV_PREFIX: &str = "NESTDND";
const LOCAL_CONFIG_FILE: &str = ".nestdnd.toml";

/// Unified configuration for nestdnd.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// TOML seed file loaded instead of the built-in list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
    /// Render `[id]` next to each label
    pub show_ids: bool,
    /// Assign a UUID to seed items without an id
    pub generate_missing_ids: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_file: None,
            show_ids: true,
            generate_missing_ids: true,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub seed_file: Option<PathBuf>,
    pub show_ids: Option<bool>,
    pub generate_missing_ids: Option<bool>,
}

/// Get the XDG config directory for nestdnd.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_CONFIG_FILE)
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay scalars win when specified.
    fn merge_with(&self, overlay: &RawSettings, base_dir: &Path) -> Self {
        Self {
            seed_file: overlay
                .seed_file
                .as_deref()
                .map(|p| p.resolve_from(base_dir))
                .or_else(|| self.seed_file.clone()),
            show_ids: overlay.show_ids.unwrap_or(self.show_ids),
            generate_missing_ids: overlay
                .generate_missing_ids
                .unwrap_or(self.generate_missing_ids),
        }
    }

    fn merge_file(self, path: &Path) -> Result<Self, ApplicationError> {
        if !path.is_file() {
            return Ok(self);
        }
        debug!(path = %path.display(), "merging config file");
        let raw = load_raw_settings(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(self.merge_with(&raw, base_dir))
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory holding `.nestdnd.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            project_dir,
            Environment::with_prefix(ENV_PREFIX),
        )
    }

    /// Load from explicit layer sources.
    #[instrument(level = "debug", skip(env))]
    pub fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            current = current.merge_file(global_path)?;
        }
        if let Some(project_dir) = project_dir {
            current = current.merge_file(&local_config_path(project_dir))?;
        }

        current = Self::apply_env_overrides(current, env)?;
        debug!(?current, "settings loaded");
        Ok(current)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("seed_file") {
            settings.seed_file = Some(PathBuf::from(expand_env_vars(&val)));
        }
        if let Ok(val) = config.get_bool("show_ids") {
            settings.show_ids = val;
        }
        if let Ok(val) = config.get_bool("generate_missing_ids") {
            settings.generate_missing_ids = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# nestdnd configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/nestdnd/nestdnd.toml
#   Local:  <project_dir>/.nestdnd.toml
#   Env:    NESTDND_* environment variables
#
# A relative seed_file is resolved against the directory of the config file
# that sets it. ~ and $VAR are expanded.

# TOML seed file loaded instead of the built-in list
# seed_file = "items.toml"

# Show [id] next to each label
# show_ids = true

# Give seed items without an id a generated UUID (false: reject them)
# generate_missing_ids = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
