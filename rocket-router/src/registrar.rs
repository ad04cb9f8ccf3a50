//! Hands resolved routes to the application's request router.

use crate::resolver::{ControllerRef, ResolvedRouteTable};
use crate::route::RouteDescriptor;
use tracing::debug;

/// Registers resolved routes through a callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRegistrar;

impl RouteRegistrar {
    pub fn new() -> Self {
        Self
    }

    /// Call `register` once per route, in table order.
    ///
    /// The first error returned by `register` stops registration and is
    /// returned as is.
    pub fn build<F, E>(&self, resolved: &ResolvedRouteTable, mut register: F) -> Result<(), E>
    where
        F: FnMut(&RouteDescriptor, &ControllerRef) -> Result<(), E>,
    {
        for route in resolved {
            debug!(route = %route.descriptor, "Registering route");
            register(&route.descriptor, &route.controller)?;
        }
        Ok(())
    }
}
