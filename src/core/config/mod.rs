//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! specmeta has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Settings for one test suite
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$SPECMETA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/specmeta/config.toml`
//! 3. `~/.specmeta/config.toml`
//!
//! # Project Config Locations
//!
//! Searched in order:
//! 1. `.specmeta/config.toml` (canonical)
//! 2. `.specmeta.toml` (compatibility, warns)
//!
//! # Example
//!
//! ```no_run
//! use specmeta::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! let config = result.config;
//! assert!(!config.framework_patterns().is_empty());
//! ```

pub mod schema;

pub use schema::{
    ConfigFile, DeprecationConfig, DeprecationMode, LocationConfig, LogFormat, LoggingConfig,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::location::{DEFAULT_EPHEMERAL_SENTINELS, DEFAULT_FRAMEWORK_PATTERNS};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: ConfigFile,
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `project_root` is provided, also loads project config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(project_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), project_root)
    }

    /// Load with an explicit global config file instead of searching for one.
    pub fn load_from(
        global_file: Option<&Path>,
        project_root: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_file {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };

        let (project, project_path) = match project_root {
            Some(root) => Self::load_project(root, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path: global_file.map(Path::to_path_buf),
                project_path,
            },
            warnings,
        })
    }

    /// Configuration from already-parsed files, with no paths recorded.
    pub fn from_files(global: ConfigFile, project: Option<ConfigFile>) -> Self {
        Config {
            global,
            project,
            global_path: None,
            project_path: None,
        }
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SPECMETA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("specmeta/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".specmeta/config.toml"))
            .filter(|path| path.exists())
    }

    fn load_project(
        root: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let canonical = Self::project_config_path(root);
        if canonical.exists() {
            let config = Self::read_config(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        let compat = root.join(".specmeta.toml");
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using deprecated config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = Self::read_config(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical project config path under `root`.
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(".specmeta/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<'a, T>(&'a self, field: impl Fn(&'a ConfigFile) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(&field)
            .or_else(|| field(&self.global))
    }

    /// Framework frame patterns.
    ///
    /// Defaults to this crate's own source directory.
    pub fn framework_patterns(&self) -> Vec<String> {
        self.pick(|c| {
            c.location
                .as_ref()
                .and_then(|l| l.framework_patterns.clone())
        })
        .unwrap_or_else(|| {
            DEFAULT_FRAMEWORK_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect()
        })
    }

    /// Ephemeral script sentinels.
    ///
    /// Defaults to `["-e"]`.
    pub fn ephemeral_sentinels(&self) -> Vec<String> {
        self.pick(|c| {
            c.location
                .as_ref()
                .and_then(|l| l.ephemeral_sentinels.clone())
        })
        .unwrap_or_else(|| {
            DEFAULT_EPHEMERAL_SENTINELS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    /// Defaults to [`DeprecationMode::Warn`].
    pub fn deprecation_mode(&self) -> DeprecationMode {
        self.pick(|c| c.deprecations.as_ref().and_then(|d| d.mode))
            .unwrap_or_default()
    }

    /// Defaults to `"warn"`.
    pub fn log_level(&self) -> &str {
        self.pick(|c| c.logging.as_ref().and_then(|l| l.level.as_deref()))
            .unwrap_or("warn")
    }

    /// Defaults to [`LogFormat::Pretty`].
    pub fn log_format(&self) -> LogFormat {
        self.pick(|c| c.logging.as_ref().and_then(|l| l.format))
            .unwrap_or_default()
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
