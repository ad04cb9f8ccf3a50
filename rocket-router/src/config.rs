//! Configuration management.
//!
//! This module handles loading router settings from `rocket-router.toml`
//! files. Every section is optional and falls back to defaults.

use crate::error::{ConfigError, RouterResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "rocket-router.toml";

/// Default location of the route cache, relative to the project directory.
pub const DEFAULT_CACHE_FILE: &str = "caches/routes.json";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Project settings.
    pub project: ProjectConfig,

    /// Route cache settings.
    pub cache: CacheConfig,

    /// Source scanning settings.
    pub scan: ScanConfig,

    /// Marker expression overrides.
    pub syntax: SyntaxConfig,
}

/// Project configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root directory.
    pub dir: Option<PathBuf>,

    /// Only classes whose identifier starts with this prefix are inspected
    /// by reflective discovery.
    pub namespace_filter: Option<String>,
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file, relative to the project directory unless absolute.
    pub file: PathBuf,
}

/// Source scanning configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extension of scanned source files.
    pub extension: String,

    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// Glob filter on paths relative to the project directory.
    pub filter: Option<String>,
}

/// Overrides for the marker expressions used by source scanning.
///
/// Unset entries keep the built-in expression.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SyntaxConfig {
    pub namespace: Option<String>,
    pub class: Option<String>,
    pub controller: Option<String>,
    pub base_path: Option<String>,
    pub route: Option<String>,
    pub operation: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: crate::scanner::DEFAULT_EXTENSION.to_string(),
            respect_gitignore: false,
            filter: None,
        }
    }
}

impl RouterConfig {
    /// Resolve the cache file location against a project directory.
    pub fn cache_path(&self, project_dir: &Path) -> PathBuf {
        if self.cache.file.is_absolute() {
            self.cache.file.clone()
        } else {
            project_dir.join(&self.cache.file)
        }
    }
}

/// Loads router configuration files.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> RouterResult<RouterConfig> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Ok(RouterConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&content, &config_path)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str, origin: &Path) -> RouterResult<RouterConfig> {
        let config: RouterConfig = toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(origin.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# rocket-router configuration file

[project]
# Project root directory (defaults to the directory given to the builder)
# dir = "./src"

# Only classes whose identifier starts with this prefix are inspected
# namespace_filter = "App\\"

[cache]
# Route cache file, relative to the project directory unless absolute
file = "caches/routes.json"

[scan]
# Extension of scanned source files
extension = "php"

# Whether to respect .gitignore files while scanning
respect_gitignore = false

# Glob filter on paths relative to the project directory
# filter = "Controller/**/*.php"

[syntax]
# Regular expressions overriding the built-in marker patterns
# controller = '#\[ApiController\]'
# route = '#\[(Route(?:Get|Post|Delete|Put|Patch))(?:\([''"]([^''"]*)[''"]?\))?\]'
"#
    }
}
