//! Route table compilation.

use crate::cache::CacheStore;
use crate::discovery::DiscoveryStrategy;
use crate::error::RouterResult;
use crate::route::RouteTable;
use std::path::Path;
use tracing::info;

/// Runs a discovery strategy and optionally persists the result.
#[derive(Debug, Clone, Default)]
pub struct RouteCompiler {
    store: CacheStore,
}

impl RouteCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover the route table with `strategy`.
    ///
    /// The table is returned as produced; paths are already normalized by
    /// the strategy.
    pub fn compile(&self, strategy: &dyn DiscoveryStrategy) -> RouterResult<RouteTable> {
        info!(strategy = strategy.name(), "Scanning for API controllers");

        let table = strategy.discover()?;

        info!(
            strategy = strategy.name(),
            routes = table.len(),
            "Route discovery finished"
        );

        Ok(table)
    }

    /// Discover the route table and write it to `cache_path`.
    pub fn compile_to(
        &self,
        strategy: &dyn DiscoveryStrategy,
        cache_path: &Path,
    ) -> RouterResult<RouteTable> {
        let table = self.compile(strategy)?;
        self.store.write(&table, cache_path)?;

        info!(
            routes = table.len(),
            cache = %cache_path.display(),
            "Route cache generated"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::route::{HttpMethod, RouteDescriptor};
    use crate::SourceDiscovery;
    use tempfile::TempDir;

    struct FixedStrategy(RouteTable);

    impl DiscoveryStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn discover(&self) -> RouterResult<RouteTable> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_compile_returns_strategy_table_unchanged() {
        let table: RouteTable = vec![
            RouteDescriptor::new("b", HttpMethod::Get, "B", "b"),
            RouteDescriptor::new("a", HttpMethod::Get, "A", "a"),
        ]
        .into();

        let compiled = RouteCompiler::new()
            .compile(&FixedStrategy(table.clone()))
            .unwrap();

        assert_eq!(compiled, table);
    }

    #[test]
    fn test_compile_to_writes_cache() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("caches/routes.json");
        let table: RouteTable =
            vec![RouteDescriptor::new("ping", HttpMethod::Get, "Health", "ping")].into();

        RouteCompiler::new()
            .compile_to(&FixedStrategy(table.clone()), &cache)
            .unwrap();

        assert_eq!(CacheStore::new().read(&cache).unwrap(), table);
    }

    #[test]
    fn test_compile_missing_directory() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("routes.json");

        let err = RouteCompiler::new()
            .compile_to(&SourceDiscovery::new(dir.path().join("missing")), &cache)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
        assert!(!cache.exists());
    }
}
