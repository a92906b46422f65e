//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tabtree/tabtree.toml`
//! 3. Local config: `<dir>/.tabtree.toml` (working directory by default)
//! 4. Environment variables: `TABTREE_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::ConverterConfig;
use crate::application::{ApplicationError, Format};
use crate::domain::DepthPolicy;

/// Unified configuration for tabtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Cell delimiter, a single ASCII character (default: ",")
    pub delimiter: String,
    /// Raw lines to drop before parsing (default: 1)
    pub skip_header: usize,
    /// Leading columns to drop from every row (default: 0)
    pub skip_columns: usize,
    /// Output format when none is given or inferable (default: json)
    pub format: Format,
    /// Reject depth-0 rows and depth jumps instead of skipping them
    pub strict: bool,
    /// Directory for derived output files (default: next to the input)
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: ",".into(),
            skip_header: 1,
            skip_columns: 0,
            format: Format::default(),
            strict: false,
            output_dir: None,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub delimiter: Option<String>,
    pub skip_header: Option<usize>,
    pub skip_columns: Option<usize>,
    pub format: Option<Format>,
    pub strict: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

/// Get the XDG config directory for tabtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tabtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tabtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".tabtree.toml")
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

/// Expand shell variables and tilde in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            delimiter: overlay
                .delimiter
                .clone()
                .unwrap_or_else(|| self.delimiter.clone()),
            skip_header: overlay.skip_header.unwrap_or(self.skip_header),
            skip_columns: overlay.skip_columns.unwrap_or(self.skip_columns),
            format: overlay.format.unwrap_or(self.format),
            strict: overlay.strict.unwrap_or(self.strict),
            output_dir: overlay
                .output_dir
                .clone()
                .or_else(|| self.output_dir.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.tabtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        Ok(current)
    }

    /// Apply TABTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TABTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("delimiter") {
            settings.delimiter = val;
        }
        if let Ok(val) = config.get_int("skip_header") {
            settings.skip_header = non_negative("TABTREE_SKIP_HEADER", val)?;
        }
        if let Ok(val) = config.get_int("skip_columns") {
            settings.skip_columns = non_negative("TABTREE_SKIP_COLUMNS", val)?;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = self.output_dir.take() {
            self.output_dir = Some(expand_path(&dir));
        }
    }

    pub fn depth_policy(&self) -> DepthPolicy {
        if self.strict {
            DepthPolicy::Strict
        } else {
            DepthPolicy::Permissive
        }
    }

    /// Conversion parameters for `input` under these settings.
    pub fn converter_config(&self, input: impl Into<PathBuf>) -> ConverterConfig {
        ConverterConfig::new(input, self.delimiter.clone(), self.skip_header, self.skip_columns)
            .with_depth_policy(self.depth_policy())
    }

    /// Output path derived from the input name: `<dir>/<stem>.<ext>`.
    pub fn derived_output_path(&self, input: &Path, format: Format) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "forest".into());
        let dir = self
            .output_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        dir.join(format!("{}.{}", stem, format.extension()))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tabtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/tabtree/tabtree.toml
#   Local:  <dir>/.tabtree.toml
#   Env:    TABTREE_* environment variables
#   CLI flags override everything.

# Cell delimiter (single ASCII character)
# delimiter = ","

# Raw lines skipped at the top of the input
# skip_header = 1

# Leading columns skipped in every row
# skip_columns = 0

# Default output format: "json", "xml" or "tree"
# format = "json"

# Fail on depth-0 rows and depth jumps instead of skipping them
# strict = false

# Directory for outputs written with --write
# output_dir = "~/exports"
"#
        .to_string()
    }
}

fn non_negative(name: &str, value: i64) -> Result<usize, ApplicationError> {
    usize::try_from(value).map_err(|_| ApplicationError::Config {
        message: format!("{name} must be a non-negative integer, got {value}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
