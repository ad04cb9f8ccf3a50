//! Route metadata shared by discovery, the cache and the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Path separator used in route paths.
pub const SEPARATOR: char = '/';

/// HTTP methods a route marker can declare.
///
/// Serialized as the upper-case keyword (`"GET"`, `"POST"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// All supported methods, in declaration order.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Returns the upper-case keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Map a route marker name (`RouteGet`, `RoutePost`, ...) to its method.
    ///
    /// Unrecognized marker names fall back to GET.
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "RoutePost" => Self::Post,
            "RoutePut" => Self::Put,
            "RoutePatch" => Self::Patch,
            "RouteDelete" => Self::Delete,
            _ => Self::Get,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the supported HTTP methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// Metadata attached to a class or an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// The class is an API controller.
    Controller,
    /// Path prefix for every route on the class.
    BasePath(String),
    /// The operation handles `method` requests on `path`.
    Route { method: HttpMethod, path: String },
}

impl Marker {
    /// Route marker with an explicit path.
    pub fn route(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::Route {
            method,
            path: path.into(),
        }
    }

    pub fn base_path(path: impl Into<String>) -> Self {
        Self::BasePath(path.into())
    }
}

/// Join a class base path and a method path into a normalized route path.
///
/// The result has no leading or trailing separator and no runs of
/// consecutive separators. Both discovery strategies build paths through
/// this function so equivalent inputs give identical output.
///
/// ```
/// use rocket_router::normalize_path;
///
/// assert_eq!(normalize_path("/users/", "//create"), "users/create");
/// assert_eq!(normalize_path("admin", ""), "admin");
/// ```
pub fn normalize_path(base: &str, method_path: &str) -> String {
    let method_path = method_path.strip_prefix(SEPARATOR).unwrap_or(method_path);

    let joined = match (base.is_empty(), method_path.is_empty()) {
        (false, false) => format!("{base}{SEPARATOR}{method_path}"),
        (false, true) => base.to_string(),
        (true, _) => method_path.to_string(),
    };

    joined
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// One discovered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Normalized route path.
    pub path: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// Fully qualified identifier of the owning class.
    pub controller: String,

    /// Name of the operation implementing the endpoint.
    pub operation: String,
}

impl RouteDescriptor {
    /// Build a descriptor from already-normalized parts.
    pub fn new(
        path: impl Into<String>,
        method: HttpMethod,
        controller: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            method,
            controller: controller.into(),
            operation: operation.into(),
        }
    }

    /// Build a descriptor from raw marker values, normalizing the path.
    pub fn discovered(
        base_path: &str,
        route_path: &str,
        method: HttpMethod,
        controller: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::new(
            normalize_path(base_path, route_path),
            method,
            controller,
            operation,
        )
    }

    /// Check the descriptor invariants.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.controller.is_empty() {
            return Err("controller identifier is empty");
        }
        if self.operation.is_empty() {
            return Err("operation name is empty");
        }
        if self.path.starts_with(SEPARATOR) || self.path.ends_with(SEPARATOR) {
            return Err("path has a leading or trailing separator");
        }
        if self.path.contains("//") {
            return Err("path has consecutive separators");
        }
        Ok(())
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} /{} -> {}::{}()",
            self.method, self.path, self.controller, self.operation
        )
    }
}

/// Ordered sequence of routes in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, route: RouteDescriptor) {
        self.routes.push(route);
    }

    pub(crate) fn extend(&mut self, routes: impl IntoIterator<Item = RouteDescriptor>) {
        self.routes.extend(routes);
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl From<Vec<RouteDescriptor>> for RouteTable {
    fn from(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }
}

impl FromIterator<RouteDescriptor> for RouteTable {
    fn from_iter<I: IntoIterator<Item = RouteDescriptor>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RouteTable {
    type Item = RouteDescriptor;
    type IntoIter = std::vec::IntoIter<RouteDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDescriptor;
    type IntoIter = std::slice::Iter<'a, RouteDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Lists one route per line: `GET /admin/users -> App\Admin::users()`.
impl fmt::Display for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for route in &self.routes {
            writeln!(f, "{route}")?;
        }
        Ok(())
    }
}
