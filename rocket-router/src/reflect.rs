//! Discovery through class introspection.
//!
//! Instead of reading source text, [`ReflectiveDiscovery`] walks a class
//! universe (class identifier to origin file, as reported by the class
//! loader) and asks an [`Introspector`] for the markers attached to each
//! class and its operations. Each route marker carries its own method and
//! path, so no line pairing is needed.

use crate::discovery::DiscoveryStrategy;
use crate::error::RouterResult;
use crate::route::{HttpMethod, Marker, RouteDescriptor, RouteTable};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

/// Known classes mapped to the file that defines them, in load order.
pub type ClassUniverse = IndexMap<String, PathBuf>;

/// Visibility of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// An operation declared on a class, with its markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMetadata {
    pub name: String,
    pub visibility: Visibility,
    pub markers: Vec<Marker>,
}

impl OperationMetadata {
    /// A public operation without markers.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            markers: Vec::new(),
        }
    }

    /// An operation with the given visibility and no markers.
    pub fn with_visibility(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            markers: Vec::new(),
        }
    }

    /// Attach a marker.
    #[must_use = "This method returns a new OperationMetadata and does not modify self"]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Attach a route marker.
    #[must_use = "This method returns a new OperationMetadata and does not modify self"]
    pub fn route(self, method: HttpMethod, path: impl Into<String>) -> Self {
        self.marker(Marker::route(method, path))
    }

    /// Route markers in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = (HttpMethod, &str)> {
        self.markers.iter().filter_map(|marker| match marker {
            Marker::Route { method, path } => Some((*method, path.as_str())),
            _ => None,
        })
    }
}

/// A class and its markers, as reported by an [`Introspector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    pub identifier: String,
    pub markers: Vec<Marker>,
    pub operations: Vec<OperationMetadata>,
}

impl ClassMetadata {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            markers: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Shorthand for a class carrying the controller marker.
    pub fn controller(identifier: impl Into<String>) -> Self {
        Self::new(identifier).marker(Marker::Controller)
    }

    #[must_use = "This method returns a new ClassMetadata and does not modify self"]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    #[must_use = "This method returns a new ClassMetadata and does not modify self"]
    pub fn base_path(self, path: impl Into<String>) -> Self {
        self.marker(Marker::base_path(path))
    }

    #[must_use = "This method returns a new ClassMetadata and does not modify self"]
    pub fn operation(mut self, operation: OperationMetadata) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn is_controller(&self) -> bool {
        self.markers.contains(&Marker::Controller)
    }

    /// The class base path, empty when the class has none.
    pub fn route_prefix(&self) -> &str {
        self.markers
            .iter()
            .find_map(|marker| match marker {
                Marker::BasePath(path) => Some(path.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn public_operations(&self) -> impl Iterator<Item = &OperationMetadata> {
        self.operations
            .iter()
            .filter(|op| op.visibility == Visibility::Public)
    }
}

/// Failure to introspect a class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    /// The class is not known to the introspector.
    #[error("Unknown class: {class}")]
    UnknownClass { class: String },

    /// The class is known but could not be loaded.
    #[error("Cannot load class {class}: {reason}")]
    Unloadable { class: String, reason: String },
}

/// Reports the markers attached to a class.
pub trait Introspector {
    fn introspect(&self, class: &str) -> Result<ClassMetadata, IntrospectError>;
}

impl<T: Introspector + ?Sized> Introspector for &T {
    fn introspect(&self, class: &str) -> Result<ClassMetadata, IntrospectError> {
        (**self).introspect(class)
    }
}

impl<T: Introspector + ?Sized> Introspector for Box<T> {
    fn introspect(&self, class: &str) -> Result<ClassMetadata, IntrospectError> {
        (**self).introspect(class)
    }
}

/// In-memory [`Introspector`] filled by the application at startup.
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: HashMap<String, ClassMetadata>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any earlier entry with the same identifier.
    pub fn register(&mut self, class: ClassMetadata) {
        self.classes.insert(class.identifier.clone(), class);
    }

    #[must_use = "This method returns a new ClassCatalog and does not modify self"]
    pub fn with_class(mut self, class: ClassMetadata) -> Self {
        self.register(class);
        self
    }

    pub fn get(&self, class: &str) -> Option<&ClassMetadata> {
        self.classes.get(class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Introspector for ClassCatalog {
    fn introspect(&self, class: &str) -> Result<ClassMetadata, IntrospectError> {
        self.classes
            .get(class)
            .cloned()
            .ok_or_else(|| IntrospectError::UnknownClass {
                class: class.to_string(),
            })
    }
}

/// Discovers routes by introspecting every class of a universe.
#[derive(Debug, Clone)]
pub struct ReflectiveDiscovery<I> {
    universe: ClassUniverse,
    namespace_filter: String,
    introspector: I,
}

impl<I: Introspector> ReflectiveDiscovery<I> {
    /// Inspect every class of `universe` through `introspector`.
    pub fn new(universe: ClassUniverse, introspector: I) -> Self {
        Self {
            universe,
            namespace_filter: String::new(),
            introspector,
        }
    }

    /// Only inspect classes whose identifier starts with `prefix`.
    #[must_use = "This method returns a new ReflectiveDiscovery and does not modify self"]
    pub fn with_namespace_filter(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_filter = prefix.into();
        self
    }

    pub fn universe(&self) -> &ClassUniverse {
        &self.universe
    }
}

impl<I: Introspector> DiscoveryStrategy for ReflectiveDiscovery<I> {
    fn name(&self) -> &'static str {
        "reflective"
    }

    fn discover(&self) -> RouterResult<RouteTable> {
        let mut table = RouteTable::new();

        for (class, origin) in &self.universe {
            if !class.starts_with(&self.namespace_filter) {
                continue;
            }

            let metadata = match self.introspector.introspect(class) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(class = %class, origin = %origin.display(), error = %e, "Skipping class");
                    continue;
                }
            };

            if !metadata.is_controller() {
                trace!(class = %class, "Class is not an API controller, skipping");
                continue;
            }

            debug!(class = %class, origin = %origin.display(), "Found API controller");

            let prefix = metadata.route_prefix();
            for operation in metadata.public_operations() {
                for (method, path) in operation.routes() {
                    let descriptor =
                        RouteDescriptor::discovered(prefix, path, method, class, &operation.name);
                    debug!(route = %descriptor, "Discovered route");
                    table.push(descriptor);
                }
            }
        }

        Ok(table)
    }
}
