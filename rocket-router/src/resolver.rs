//! Binding cached routes to live controllers.
//!
//! Resolution reads the route cache (generating it first when it does not
//! exist), asks the service locator for each route's controller and checks
//! that the controller still has the cached operation. A route that cannot
//! be bound fails the whole resolution; nothing is skipped.

use crate::cache::CacheStore;
use crate::compiler::RouteCompiler;
use crate::discovery::DiscoveryStrategy;
use crate::error::{ResolveError, RouterResult};
use crate::route::{RouteDescriptor, RouteTable};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A live request handler instance.
pub trait Controller: Send + Sync {
    /// Whether the controller has a callable operation named `operation`.
    fn responds_to(&self, operation: &str) -> bool;
}

/// Shared reference to a located controller.
pub type ControllerRef = Arc<dyn Controller>;

/// Turns a controller identifier into a live instance.
///
/// Implemented for any `Fn(&str) -> Option<ControllerRef>`.
pub trait ServiceLocator {
    fn locate(&self, controller: &str) -> Option<ControllerRef>;
}

impl<F> ServiceLocator for F
where
    F: Fn(&str) -> Option<ControllerRef>,
{
    fn locate(&self, controller: &str) -> Option<ControllerRef> {
        (self)(controller)
    }
}

/// A route bound to its controller.
#[derive(Clone)]
pub struct ResolvedRoute {
    pub descriptor: RouteDescriptor,
    pub controller: ControllerRef,
}

impl fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Resolved routes in cache order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRouteTable {
    routes: Vec<ResolvedRoute>,
}

impl ResolvedRouteTable {
    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl IntoIterator for ResolvedRouteTable {
    type Item = ResolvedRoute;
    type IntoIter = std::vec::IntoIter<ResolvedRoute>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedRouteTable {
    type Item = &'a ResolvedRoute;
    type IntoIter = std::slice::Iter<'a, ResolvedRoute>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Loads the route cache and binds every route to its controller.
#[derive(Debug, Clone, Default)]
pub struct RouteResolver {
    store: CacheStore,
    compiler: RouteCompiler,
}

impl RouteResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the routes cached at `cache_path`.
    ///
    /// When no cache exists, `discovery` is compiled and written to
    /// `cache_path` once before reading it back.
    pub fn resolve(
        &self,
        cache_path: &Path,
        discovery: &dyn DiscoveryStrategy,
        locator: &dyn ServiceLocator,
    ) -> RouterResult<ResolvedRouteTable> {
        if !self.store.exists(cache_path) {
            warn!(cache = %cache_path.display(), "Route cache missing, generating it");
            self.compiler.compile_to(discovery, cache_path)?;
        }

        let table = self.store.read(cache_path)?;
        self.resolve_table(table, locator)
    }

    /// Bind an already loaded table.
    pub fn resolve_table(
        &self,
        table: RouteTable,
        locator: &dyn ServiceLocator,
    ) -> RouterResult<ResolvedRouteTable> {
        let mut routes = Vec::with_capacity(table.len());

        for descriptor in table {
            let controller = locator
                .locate(&descriptor.controller)
                .ok_or_else(|| ResolveError::controller_not_found(&descriptor.controller))?;

            if !controller.responds_to(&descriptor.operation) {
                return Err(ResolveError::operation_not_found(
                    &descriptor.controller,
                    &descriptor.operation,
                )
                .into());
            }

            debug!(route = %descriptor, "Resolved route");
            routes.push(ResolvedRoute {
                descriptor,
                controller,
            });
        }

        Ok(ResolvedRouteTable { routes })
    }
}
