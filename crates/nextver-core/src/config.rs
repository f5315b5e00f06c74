//! Configuration loading and discovery.
//!
//! Configuration is optional: with no file anywhere, the built-in release
//! rules apply. Discovery works by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from the XDG config directory
//! 3. Merging with defaults
//!
//! # Supported formats
//!
//! TOML (`.toml`), YAML (`.yaml`, `.yml`) and JSON (`.json`).
//!
//! # Config file locations (in order of precedence, highest first):
//! - files passed explicitly via [`ConfigLoader::with_file`]
//! - `.nextver.<ext>` in current directory or any parent
//! - `nextver.<ext>` in current directory or any parent
//! - `~/.config/nextver/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use nextver_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! let rules = config.rule_table();
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::rules::{ReleaseRule, RuleTable};

/// The configuration for nextver.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Overrides for the built-in release rules, applied in order.
    ///
    /// ```toml
    /// [[release_rules]]
    /// type = "perf"
    /// release = "patch"
    /// ```
    pub release_rules: Vec<ReleaseRule>,
    /// Pre-release defaults.
    pub prerelease: Option<PrereleaseConfig>,
    /// Tagging and hosted-release behavior.
    pub release: Option<ReleaseConfig>,
}

impl Config {
    /// The default rule table overlaid with `release_rules`.
    pub fn rule_table(&self) -> RuleTable {
        RuleTable::with_overrides(&self.release_rules)
    }

    /// Configured default channel, if any and non-empty.
    pub fn default_channel(&self) -> Option<&str> {
        self.prerelease
            .as_ref()
            .and_then(|p| p.channel.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Pre-release configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrereleaseConfig {
    /// Channel used when none is given on the command line (e.g. `"beta"`).
    pub channel: Option<String>,
}

/// Tagging and hosted-release configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Remote to push tags to (default: `"origin"`).
    pub remote: Option<String>,
    /// Whether to create a GitHub release after pushing (default: `true`).
    pub github_release: Option<bool>,
    /// Create the GitHub release as a draft (default: `false`).
    pub draft: Option<bool>,
    /// Title format for the GitHub release.
    ///
    /// Supports `{version}`, `{tag}` and `{previous}` interpolation.
    /// Default (when `None`): the tag itself.
    pub title: Option<String>,
}

impl ReleaseConfig {
    /// Remote name, defaulting to `origin`.
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or("origin")
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "nextver";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from the XDG directory.
    include_user_config: bool,
    /// Stop searching above a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files, loaded last.
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that reads user config and stops project search at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/nextver/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop the upward search at a directory containing `marker`.
    ///
    /// The directory holding the marker is still searched; its parents are not.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit files (in order added via `with_file`)
    /// 2. Project config (closest to search root)
    /// 3. User config (`~/.config/nextver/config.<ext>`)
    /// 4. Default values
    ///
    /// `release_rules` accumulate instead: every source contributes its rules,
    /// lowest precedence first, so a later rule for the same type wins when
    /// the table is built.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut layers = Vec::new();

        if self.include_user_config
            && let Some(path) = self.find_user_config()
        {
            tracing::debug!(%path, "merging user config");
            layers.push(path);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(path) = self.find_project_config(root)
        {
            tracing::debug!(%path, "merging project config");
            layers.push(path);
        }

        for path in &self.explicit_files {
            tracing::debug!(%path, "merging explicit config");
            layers.push(path.clone());
        }

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let mut release_rules = Vec::new();
        for path in &layers {
            figment = Self::merge_file(figment, path);
            release_rules.extend(Self::layer_rules(path)?);
        }

        let mut config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        config.release_rules = release_rules;

        let sources = layers.len();
        if sources == 0 {
            tracing::info!("no configuration file found, using default release rules");
        }
        tracing::info!(
            log_level = config.log_level.as_str(),
            release_rules = config.release_rules.len(),
            sources,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Like [`load`](Self::load), but fails when no config file exists anywhere.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        let found = !self.explicit_files.is_empty()
            || (self.include_user_config && self.find_user_config().is_some())
            || self
                .project_search_root
                .as_ref()
                .is_some_and(|root| self.find_project_config(root).is_some());

        if !found {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        for dir in start.ancestors() {
            if let Some(found) = config_in_dir(dir) {
                return Some(found);
            }

            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                tracing::trace!(%dir, %marker, "boundary reached");
                break;
            }
        }
        None
    }

    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }

    /// The `release_rules` declared in a single file, or none.
    fn layer_rules(path: &Utf8Path) -> ConfigResult<Vec<ReleaseRule>> {
        let layer = Self::merge_file(Figment::new(), path);
        if !layer.contains("release_rules") {
            return Ok(Vec::new());
        }
        layer
            .extract_inner("release_rules")
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))
    }
}

/// First config file in `dir`, trying `.nextver.<ext>` before `nextver.<ext>`.
fn config_in_dir(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    CONFIG_EXTENSIONS.iter().find_map(|ext| {
        [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Find the project config file path without loading it.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new()
        .without_boundary_marker()
        .find_project_config(start.as_ref())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// The user config directory (`~/.config/nextver/` on Linux).
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
}

/// The machine-local data directory (`~/.local/share/nextver/` on Linux).
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    let dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(dirs.data_local_dir().to_path_buf()).ok()
}
