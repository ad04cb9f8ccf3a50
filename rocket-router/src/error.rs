//! Error types for route discovery, caching and resolution.
//!
//! Every phase has its own error enum carrying the path or identifier that
//! caused it. [`RouterError`] wraps them so callers can use a single
//! [`RouterResult`] across the whole pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Main error type for router operations.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Error while discovering routes in source files.
    #[error("Failed to scan for routes: {0}")]
    Scan(#[from] ScanError),

    /// Error while writing or reading the route cache.
    #[error("Route cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error while binding cached routes to live controllers.
    #[error("Failed to resolve routes: {0}")]
    Resolve(#[from] ResolveError),

    /// Error in router configuration.
    #[error("Invalid router configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Flat classification of [`RouterError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DirectoryNotFound,
    IoError,
    CacheNotFound,
    CacheCorrupt,
    ControllerNotFound,
    OperationNotFound,
    Configuration,
}

impl RouterError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::Scan(ScanError::DirectoryNotFound { .. }) => ErrorKind::DirectoryNotFound,
            RouterError::Scan(_) => ErrorKind::IoError,
            RouterError::Cache(CacheError::NotFound { .. }) => ErrorKind::CacheNotFound,
            RouterError::Cache(CacheError::Corrupt { .. }) => ErrorKind::CacheCorrupt,
            RouterError::Cache(_) => ErrorKind::IoError,
            RouterError::Resolve(ResolveError::ControllerNotFound { .. }) => {
                ErrorKind::ControllerNotFound
            }
            RouterError::Resolve(ResolveError::OperationNotFound { .. }) => {
                ErrorKind::OperationNotFound
            }
            RouterError::Config(_) => ErrorKind::Configuration,
        }
    }
}

/// Error during source discovery.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Discovery root does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Invalid glob filter pattern.
    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Invalid marker expression in the scan syntax.
    #[error("Invalid marker expression for '{name}': {source}")]
    InvalidSyntax {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    /// IO error reading a source file.
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the directory walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error writing or reading the route cache artifact.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No artifact at the expected location.
    #[error("Cache file not found: {path}")]
    NotFound { path: PathBuf },

    /// The artifact exists but does not hold a valid route table.
    #[error("Corrupt cache file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Failed to create the cache directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the cache file.
    #[error("Failed to write cache file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an existing cache file.
    #[error("Failed to read cache file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the route table.
    #[error("Failed to encode route table: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Error binding a cached route to its controller.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The service locator returned nothing for a cached controller.
    #[error("Controller not found: {controller}")]
    ControllerNotFound { controller: String },

    /// The located controller has no operation with the cached name.
    #[error("Operation not found: {controller}::{operation}")]
    OperationNotFound {
        controller: String,
        operation: String,
    },
}

/// Error loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required builder setting was never provided.
    #[error("Missing required setting: {field}")]
    Missing { field: &'static str },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl CacheError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create a corrupt artifact error.
    pub fn corrupt(path: PathBuf, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path,
            message: message.into(),
        }
    }
}

impl ResolveError {
    pub fn controller_not_found(controller: impl Into<String>) -> Self {
        Self::ControllerNotFound {
            controller: controller.into(),
        }
    }

    pub fn operation_not_found(controller: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::OperationNotFound {
            controller: controller.into(),
            operation: operation.into(),
        }
    }
}

impl ConfigError {
    /// Create a missing setting error.
    pub fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }
}
