//! Configured router facade.
//!
//! [`RouterBuilder`] collects the project directory, cache location, service
//! locator, route registerer and discovery strategy. The resulting
//! [`Router`] runs the three phases:
//!
//! ```rust,ignore
//! let mut router = RouterBuilder::new()
//!     .with_project_dir("./src")
//!     .with_source_discovery()
//!     .with_service_locator(move |id: &str| container.get(id))
//!     .with_route_registerer(move |route, controller| {
//!         http.add(route.method, &route.path, controller.clone(), &route.operation);
//!         Ok(())
//!     })
//!     .build()?;
//!
//! let resolved = router.resolve()?;
//! router.build(&resolved)?;
//! ```

use crate::compiler::RouteCompiler;
use crate::config::RouterConfig;
use crate::discovery::{DiscoveryStrategy, SourceDiscovery};
use crate::error::{ConfigError, RouterResult, ScanError};
use crate::reflect::{ClassUniverse, Introspector, ReflectiveDiscovery};
use crate::registrar::RouteRegistrar;
use crate::resolver::{ControllerRef, ResolvedRouteTable, RouteResolver, ServiceLocator};
use crate::route::{RouteDescriptor, RouteTable};
use std::fmt;
use std::path::{Path, PathBuf};

/// Error returned by a route registerer.
pub type RegisterError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed route registration callback.
pub type RouteRegisterer =
    Box<dyn FnMut(&RouteDescriptor, &ControllerRef) -> Result<(), RegisterError>>;

/// Runs discovery, caching, resolution and registration for one project.
pub struct Router {
    project_dir: PathBuf,
    cache_file: PathBuf,
    locator: Box<dyn ServiceLocator>,
    registerer: RouteRegisterer,
    discovery: Box<dyn DiscoveryStrategy>,
    compiler: RouteCompiler,
    resolver: RouteResolver,
    registrar: RouteRegistrar,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("project_dir", &self.project_dir)
            .field("cache_file", &self.cache_file)
            .field("discovery", &self.discovery.name())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Discover routes and rewrite the cache file.
    pub fn generate(&self) -> RouterResult<RouteTable> {
        self.check_project_dir()?;
        self.compiler.compile_to(&*self.discovery, &self.cache_file)
    }

    /// Load the cached routes and bind them to controllers.
    ///
    /// Generates the cache first when it does not exist yet.
    pub fn resolve(&self) -> RouterResult<ResolvedRouteTable> {
        if !self.cache_file.exists() {
            self.check_project_dir()?;
        }

        self.resolver
            .resolve(&self.cache_file, &*self.discovery, &*self.locator)
    }

    /// Pass every resolved route to the registerer, in order.
    pub fn build(&mut self, resolved: &ResolvedRouteTable) -> Result<(), RegisterError> {
        self.registrar.build(resolved, &mut self.registerer)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    fn check_project_dir(&self) -> RouterResult<()> {
        if !self.project_dir.is_dir() {
            return Err(ScanError::not_found(self.project_dir.clone()).into());
        }
        Ok(())
    }
}

enum DiscoverySetting {
    Source,
    Reflective {
        universe: ClassUniverse,
        introspector: Box<dyn Introspector>,
    },
    Custom(Box<dyn DiscoveryStrategy>),
}

/// Builder for [`Router`].
///
/// Project directory, service locator, route registerer and discovery
/// strategy are required. The cache file defaults to
/// `<project>/caches/routes.json`.
#[derive(Default)]
pub struct RouterBuilder {
    config: RouterConfig,
    project_dir: Option<PathBuf>,
    cache_file: Option<PathBuf>,
    locator: Option<Box<dyn ServiceLocator>>,
    registerer: Option<RouteRegisterer>,
    discovery: Option<DiscoverySetting>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a loaded configuration.
    ///
    /// Settings given explicitly on the builder take precedence.
    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        if self.project_dir.is_none() {
            self.project_dir = config.project.dir.clone();
        }
        self.config = config;
        self
    }

    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_cache_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(file.into());
        self
    }

    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_service_locator<L>(mut self, locator: L) -> Self
    where
        L: ServiceLocator + 'static,
    {
        self.locator = Some(Box::new(locator));
        self
    }

    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_route_registerer<F>(mut self, registerer: F) -> Self
    where
        F: FnMut(&RouteDescriptor, &ControllerRef) -> Result<(), RegisterError> + 'static,
    {
        self.registerer = Some(Box::new(registerer));
        self
    }

    /// Discover routes by scanning source files in the project directory.
    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_source_discovery(mut self) -> Self {
        self.discovery = Some(DiscoverySetting::Source);
        self
    }

    /// Discover routes by introspecting the classes of `universe`.
    ///
    /// The configured namespace filter, if any, limits the inspected classes.
    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_class_universe<I>(mut self, universe: ClassUniverse, introspector: I) -> Self
    where
        I: Introspector + 'static,
    {
        self.discovery = Some(DiscoverySetting::Reflective {
            universe,
            introspector: Box::new(introspector),
        });
        self
    }

    /// Use a custom discovery strategy.
    #[must_use = "This method returns a new RouterBuilder and does not modify self"]
    pub fn with_discovery<D>(mut self, discovery: D) -> Self
    where
        D: DiscoveryStrategy + 'static,
    {
        self.discovery = Some(DiscoverySetting::Custom(Box::new(discovery)));
        self
    }

    /// Build the router, failing on the first missing required setting.
    pub fn build(self) -> RouterResult<Router> {
        let project_dir = self
            .project_dir
            .ok_or_else(|| ConfigError::missing("project_dir"))?;
        let locator = self
            .locator
            .ok_or_else(|| ConfigError::missing("service_locator"))?;
        let registerer = self
            .registerer
            .ok_or_else(|| ConfigError::missing("route_registerer"))?;
        let discovery: Box<dyn DiscoveryStrategy> = match self.discovery {
            Some(DiscoverySetting::Source) => {
                Box::new(SourceDiscovery::from_config(&project_dir, &self.config)?)
            }
            Some(DiscoverySetting::Reflective {
                universe,
                introspector,
            }) => {
                let mut discovery = ReflectiveDiscovery::new(universe, introspector);
                if let Some(filter) = self.config.project.namespace_filter.clone() {
                    discovery = discovery.with_namespace_filter(filter);
                }
                Box::new(discovery)
            }
            Some(DiscoverySetting::Custom(discovery)) => discovery,
            None => return Err(ConfigError::missing("discovery").into()),
        };
        let cache_file = self
            .cache_file
            .unwrap_or_else(|| self.config.cache_path(&project_dir));

        Ok(Router {
            project_dir,
            cache_file,
            locator,
            registerer,
            discovery,
            compiler: RouteCompiler::new(),
            resolver: RouteResolver::new(),
            registrar: RouteRegistrar::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RouterError};
    use crate::reflect::{ClassCatalog, ClassMetadata, OperationMetadata};
    use crate::resolver::Controller;
    use crate::route::HttpMethod;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Users;

    impl Controller for Users {
        fn responds_to(&self, operation: &str) -> bool {
            operation == "list"
        }
    }

    fn locate(id: &str) -> Option<ControllerRef> {
        (id == "App\\Users").then(|| Arc::new(Users) as ControllerRef)
    }

    fn reflective_builder(dir: &Path) -> RouterBuilder {
        let catalog = ClassCatalog::new().with_class(
            ClassMetadata::controller("App\\Users")
                .base_path("api")
                .operation(OperationMetadata::public("list").route(HttpMethod::Get, "users")),
        );
        let universe: ClassUniverse =
            [("App\\Users".to_string(), dir.join("Users.php"))].into_iter().collect();

        RouterBuilder::new()
            .with_project_dir(dir)
            .with_service_locator(locate)
            .with_route_registerer(|_, _| Ok(()))
            .with_class_universe(universe, catalog)
    }

    #[test]
    fn test_missing_settings_fail_fast() {
        let err = RouterBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            RouterError::Config(ConfigError::Missing { field: "project_dir" })
        ));

        let err = RouterBuilder::new()
            .with_project_dir("/tmp")
            .with_service_locator(locate)
            .with_route_registerer(|_, _| Ok(()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Config(ConfigError::Missing { field: "discovery" })
        ));
    }

    #[test]
    fn test_default_cache_file() {
        let router = reflective_builder(Path::new("/project")).build().unwrap();
        assert_eq!(router.cache_file(), Path::new("/project/caches/routes.json"));
    }

    #[test]
    fn test_config_supplies_project_and_cache() {
        let mut config = RouterConfig::default();
        config.project.dir = Some(PathBuf::from("/configured"));
        config.cache.file = PathBuf::from("var/routes.json");

        let router = RouterBuilder::new()
            .with_config(config)
            .with_service_locator(locate)
            .with_route_registerer(|_, _| Ok(()))
            .with_source_discovery()
            .build()
            .unwrap();

        assert_eq!(router.project_dir(), Path::new("/configured"));
        assert_eq!(router.cache_file(), Path::new("/configured/var/routes.json"));
    }

    #[test]
    fn test_resolve_generates_then_build_registers() {
        let dir = TempDir::new().unwrap();
        let registered = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&registered);

        let mut router = reflective_builder(dir.path())
            .with_route_registerer(move |route, _| {
                sink.borrow_mut().push(route.to_string());
                Ok(())
            })
            .build()
            .unwrap();

        assert!(!router.cache_file().exists());
        let resolved = router.resolve().unwrap();
        assert!(router.cache_file().exists());

        router.build(&resolved).unwrap();
        assert_eq!(
            *registered.borrow(),
            vec!["GET /api/users -> App\\Users::list()".to_string()]
        );
    }

    #[test]
    fn test_namespace_filter_from_later_config() {
        let dir = TempDir::new().unwrap();
        let catalog = ClassCatalog::new()
            .with_class(
                ClassMetadata::controller("App\\Users")
                    .operation(OperationMetadata::public("list").route(HttpMethod::Get, "users")),
            )
            .with_class(
                ClassMetadata::controller("Vendor\\Billing")
                    .operation(OperationMetadata::public("charge").route(HttpMethod::Post, "charge")),
            );
        let universe: ClassUniverse = [
            ("App\\Users".to_string(), dir.path().join("Users.php")),
            ("Vendor\\Billing".to_string(), dir.path().join("Billing.php")),
        ]
        .into_iter()
        .collect();

        let mut config = RouterConfig::default();
        config.project.namespace_filter = Some("App\\".to_string());

        let router = RouterBuilder::new()
            .with_project_dir(dir.path())
            .with_service_locator(locate)
            .with_route_registerer(|_, _| Ok(()))
            .with_class_universe(universe, catalog)
            .with_config(config)
            .build()
            .unwrap();

        let table = router.generate().unwrap();
        let controllers: Vec<_> = table.iter().map(|r| r.controller.as_str()).collect();
        assert_eq!(controllers, vec!["App\\Users"]);
    }

    #[test]
    fn test_resolve_requires_project_dir_without_cache() {
        let dir = TempDir::new().unwrap();
        let router = reflective_builder(&dir.path().join("missing")).build().unwrap();

        let err = router.resolve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
        assert!(!router.cache_file().exists());
    }

    #[test]
    fn test_generate_requires_project_dir() {
        let dir = TempDir::new().unwrap();
        let router = reflective_builder(&dir.path().join("missing")).build().unwrap();

        let err = router.generate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }

    #[test]
    fn test_registerer_error_propagates() {
        let dir = TempDir::new().unwrap();
        let mut router = reflective_builder(dir.path())
            .with_route_registerer(|route, _| Err(format!("rejected {}", route.path).into()))
            .build()
            .unwrap();

        let resolved = router.resolve().unwrap();
        let err = router.build(&resolved).unwrap_err();
        assert_eq!(err.to_string(), "rejected api/users");
    }
}
