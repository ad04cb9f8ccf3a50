//! Source file discovery.
//!
//! Recursively walks a directory for files with the configured source
//! extension, optionally respecting `.gitignore` files and a glob filter.
//! Entries are visited in file-name order so repeated scans of the same
//! tree produce files in the same order.

use crate::error::{RouterResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Default extension of scanned source files.
pub const DEFAULT_EXTENSION: &str = "php";

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering source files under a root directory.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Extension of files to read, without the dot.
    extension: String,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,

    /// Optional glob filter pattern.
    filter: Option<glob::Pattern>,
}

impl SourceScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            respect_gitignore: false,
            filter: None,
        }
    }

    /// Set the extension of files to scan.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Set a glob filter pattern for files.
    ///
    /// Only files whose path relative to the root matches are included.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan the directory and return all matching source files.
    ///
    /// An existing directory without matching files gives an empty list.
    pub fn scan(&self) -> RouterResult<Vec<SourceFile>> {
        if !self.root.is_dir() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .hidden(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            if path
                .extension()
                .is_none_or(|ext| ext != self.extension.as_str())
            {
                continue;
            }

            if let Some(ref pattern) = self.filter {
                let relative = self.relative_path(path);
                if !pattern.matches_path(&relative) {
                    continue;
                }
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: self.relative_path(path),
                content,
            });
        }

        Ok(files)
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the scanned extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use std::fs;
    use tempfile::TempDir;

    /// A small application tree: controllers, a vendored package and notes.
    fn create_app_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("Http/Controller")).unwrap();
        fs::create_dir_all(root.join("vendor/acme")).unwrap();

        fs::write(root.join("routes.php"), "<?php return [];").unwrap();
        fs::write(root.join("Kernel.php"), "<?php final class Kernel {}").unwrap();
        fs::write(
            root.join("Http/Controller/OrderController.php"),
            "<?php #[ApiController] class OrderController {}",
        )
        .unwrap();
        fs::write(
            root.join("Http/Controller/CartController.php"),
            "<?php #[ApiController] class CartController {}",
        )
        .unwrap();
        fs::write(root.join("vendor/acme/Client.php"), "<?php class Client {}").unwrap();
        fs::write(root.join("NOTES.txt"), "orders before carts").unwrap();

        dir
    }

    fn relative_paths(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_visits_entries_in_file_name_order() {
        let dir = create_app_tree();
        let files = SourceScanner::new(dir.path()).scan().unwrap();

        assert_eq!(
            relative_paths(&files),
            vec![
                "Http/Controller/CartController.php",
                "Http/Controller/OrderController.php",
                "Kernel.php",
                "routes.php",
                "vendor/acme/Client.php",
            ]
        );
    }

    #[test]
    fn test_scan_reads_content_and_absolute_path() {
        let dir = create_app_tree();
        let files = SourceScanner::new(dir.path()).scan().unwrap();

        let kernel = files
            .iter()
            .find(|f| f.relative_path == Path::new("Kernel.php"))
            .unwrap();
        assert_eq!(kernel.path, dir.path().join("Kernel.php"));
        assert_eq!(kernel.content, "<?php final class Kernel {}");
    }

    #[test]
    fn test_scan_with_filter() {
        let dir = create_app_tree();
        let files = SourceScanner::new(dir.path())
            .with_filter("Http/**/*Controller.php")
            .unwrap()
            .scan()
            .unwrap();

        assert_eq!(
            relative_paths(&files),
            vec![
                "Http/Controller/CartController.php",
                "Http/Controller/OrderController.php",
            ]
        );
    }

    #[test]
    fn test_scan_with_custom_extension() {
        let dir = create_app_tree();
        let scanner = SourceScanner::new(dir.path()).with_extension(".txt");
        assert_eq!(scanner.extension(), "txt");

        let files = scanner.scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "orders before carts");
    }

    #[test]
    fn test_gitignore_only_applies_when_enabled() {
        let dir = create_app_tree();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "vendor/\n").unwrap();

        let all = SourceScanner::new(dir.path()).scan().unwrap();
        assert!(relative_paths(&all).contains(&"vendor/acme/Client.php".to_string()));

        let tracked = SourceScanner::new(dir.path())
            .with_gitignore(true)
            .scan()
            .unwrap();
        let paths = relative_paths(&tracked);
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| !p.starts_with("vendor/")));
    }

    #[test]
    fn test_invalid_filter() {
        let result = SourceScanner::new(".").with_filter("Http/[");
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("app");
        let result = SourceScanner::new(&missing).scan();

        assert!(matches!(
            result.unwrap_err(),
            RouterError::Scan(ScanError::DirectoryNotFound { path }) if path == missing
        ));
    }

    #[test]
    fn test_scan_file_as_root_is_not_a_directory() {
        let dir = create_app_tree();
        let result = SourceScanner::new(dir.path().join("Kernel.php")).scan();

        assert!(matches!(
            result.unwrap_err(),
            RouterError::Scan(ScanError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_scan_tree_without_sources() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.css"), "body {}").unwrap();

        let files = SourceScanner::new(dir.path()).scan().unwrap();
        assert!(files.is_empty());
    }
}
