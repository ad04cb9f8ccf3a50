//! Route cache artifact.
//!
//! The cache is a pretty-printed JSON document so that it can be diffed and
//! inspected by hand:
//!
//! ```json
//! {
//!   "version": 1,
//!   "generated_at": "2026-01-01T00:00:00Z",
//!   "routes": [
//!     { "path": "admin/users", "method": "GET", "controller": "App\\Admin", "operation": "users" }
//!   ]
//! }
//! ```
//!
//! Reading validates every descriptor, so a hand-edited file with an empty
//! controller or an unnormalized path is reported as corrupt instead of
//! reaching the resolver.

use crate::error::{CacheError, RouterResult};
use crate::route::RouteTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Version of the artifact layout. Bumped on incompatible changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheArtifact {
    version: u32,
    generated_at: DateTime<Utc>,
    routes: RouteTable,
}

/// Writes and reads route cache artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStore;

impl CacheStore {
    pub fn new() -> Self {
        Self
    }

    /// Whether an artifact exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Serialize `table` to `path`, creating parent directories as needed.
    pub fn write(&self, table: &RouteTable, path: &Path) -> RouterResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let artifact = CacheArtifact {
            version: CACHE_FORMAT_VERSION,
            generated_at: Utc::now(),
            routes: table.clone(),
        };
        let mut content = serde_json::to_string_pretty(&artifact).map_err(CacheError::Encode)?;
        content.push('\n');

        std::fs::write(path, &content).map_err(|e| CacheError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            path = %path.display(),
            routes = table.len(),
            bytes = content.len(),
            "Route cache written"
        );

        Ok(())
    }

    /// Read the table stored at `path`.
    pub fn read(&self, path: &Path) -> RouterResult<RouteTable> {
        if !path.exists() {
            return Err(CacheError::not_found(path.to_path_buf()).into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| CacheError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let artifact: CacheArtifact = serde_json::from_str(&content)
            .map_err(|e| CacheError::corrupt(path.to_path_buf(), e.to_string()))?;

        if artifact.version != CACHE_FORMAT_VERSION {
            return Err(CacheError::corrupt(
                path.to_path_buf(),
                format!(
                    "unsupported format version {} (expected {})",
                    artifact.version, CACHE_FORMAT_VERSION
                ),
            )
            .into());
        }

        for (index, route) in artifact.routes.iter().enumerate() {
            route.validate().map_err(|reason| {
                CacheError::corrupt(path.to_path_buf(), format!("route #{index}: {reason}"))
            })?;
        }

        debug!(
            path = %path.display(),
            routes = artifact.routes.len(),
            generated_at = %artifact.generated_at,
            "Route cache loaded"
        );

        Ok(artifact.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RouterError};
    use crate::route::{HttpMethod, RouteDescriptor};
    use tempfile::TempDir;

    fn sample_table() -> RouteTable {
        vec![
            RouteDescriptor::new("admin/users", HttpMethod::Get, "App\\Admin", "users"),
            RouteDescriptor::new("admin/users", HttpMethod::Post, "App\\Admin", "create"),
            RouteDescriptor::new("", HttpMethod::Delete, "Home", "reset"),
        ]
        .into()
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        let store = CacheStore::new();

        store.write(&sample_table(), &path).unwrap();
        assert!(store.exists(&path));

        let table = store.read(&path).unwrap();
        assert_eq!(table, sample_table());
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/caches/routes.json");

        CacheStore::new().write(&RouteTable::new(), &path).unwrap();

        assert!(path.exists());
        assert!(CacheStore::new().read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_artifact_is_readable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        CacheStore::new().write(&sample_table(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["generated_at"].is_string());
        assert_eq!(value["routes"][0]["path"], "admin/users");
        assert_eq!(value["routes"][0]["method"], "GET");
        assert_eq!(value["routes"][0]["controller"], "App\\Admin");
        assert_eq!(value["routes"][0]["operation"], "users");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = CacheStore::new()
            .read(&dir.path().join("routes.json"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CacheNotFound);
    }

    #[test]
    fn test_read_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "return [];").unwrap();

        let err = CacheStore::new().read(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CacheCorrupt);
    }

    #[test]
    fn test_read_unknown_method() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"version":1,"generated_at":"2026-01-01T00:00:00Z","routes":[
                {"path":"a","method":"HEAD","controller":"A","operation":"a"}]}"#,
        )
        .unwrap();

        let err = CacheStore::new().read(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CacheCorrupt);
    }

    #[test]
    fn test_read_invalid_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"version":1,"generated_at":"2026-01-01T00:00:00Z","routes":[
                {"path":"/a","method":"GET","controller":"A","operation":"a"}]}"#,
        )
        .unwrap();

        let err = CacheStore::new().read(&path).unwrap_err();
        assert!(matches!(
            err,
            RouterError::Cache(CacheError::Corrupt { ref message, .. }) if message.contains("route #0")
        ));
    }

    #[test]
    fn test_read_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"version":99,"generated_at":"2026-01-01T00:00:00Z","routes":[]}"#,
        )
        .unwrap();

        let err = CacheStore::new().read(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CacheCorrupt);
    }

    #[test]
    fn test_write_to_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = CacheStore::new()
            .write(&RouteTable::new(), &blocker.join("routes.json"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::IoError);
    }
}
