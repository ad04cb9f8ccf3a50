//! Pattern-based extraction of routes from controller source text.
//!
//! The scanned code is never executed or fully parsed. A file is read as
//! text and matched against the expressions of a [`MarkerSyntax`]:
//!
//! ```text
//! namespace App\Controller;
//!
//! #[ApiController]
//! #[Route('admin')]
//! final class UserController
//! {
//!     #[RouteGet('users')]
//!     public function list(): array { ... }
//! }
//! ```
//!
//! Method markers are paired with operations line by line: a route marker
//! is remembered as pending and the next public operation declaration
//! consumes it. A marker that is never followed by a declaration is
//! dropped without error.

use crate::config::SyntaxConfig;
use crate::error::ScanError;
use crate::route::{HttpMethod, RouteDescriptor};
use crate::scanner::SourceFile;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};

const NAMESPACE_PATTERN: &str = r"namespace\s+([^;]+);";
const CLASS_PATTERN: &str =
    r"(?m)^\s*(?:#\[[^\]]*\]\s*)*(?:(?:final|abstract|readonly)\s+)*class\s+(\w+)";
const CONTROLLER_PATTERN: &str = r"#\[ApiController\]";
const BASE_PATH_PATTERN: &str = r#"#\[Route\(['"]([^'"]+)['"]\)\]"#;
const ROUTE_PATTERN: &str =
    r#"#\[(Route(?:Get|Post|Delete|Put|Patch))(?:\(['"]([^'"]*)['"]?\))?\]"#;
const OPERATION_PATTERN: &str = r"public\s+function\s+(\w+)";

/// Namespace separator used when joining namespace and class name.
pub const NAMESPACE_SEPARATOR: &str = "\\";

static DEFAULT_SYNTAX: LazyLock<MarkerSyntax> = LazyLock::new(|| MarkerSyntax {
    namespace: Regex::new(NAMESPACE_PATTERN).expect("valid namespace pattern"),
    class: Regex::new(CLASS_PATTERN).expect("valid class pattern"),
    controller: Regex::new(CONTROLLER_PATTERN).expect("valid controller pattern"),
    base_path: Regex::new(BASE_PATH_PATTERN).expect("valid base path pattern"),
    route: Regex::new(ROUTE_PATTERN).expect("valid route pattern"),
    operation: Regex::new(OPERATION_PATTERN).expect("valid operation pattern"),
});

/// The expressions recognizing each kind of marker in source text.
///
/// Capture groups:
/// - `namespace`: group 1 is the namespace
/// - `class`: group 1 is the class name
/// - `base_path`: group 1 is the base path
/// - `route`: group 1 is the marker name (see [`HttpMethod::from_marker`]),
///   group 2 the optional path literal
/// - `operation`: group 1 is the operation name
#[derive(Debug, Clone)]
pub struct MarkerSyntax {
    pub namespace: Regex,
    pub class: Regex,
    pub controller: Regex,
    pub base_path: Regex,
    pub route: Regex,
    pub operation: Regex,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        DEFAULT_SYNTAX.clone()
    }
}

impl MarkerSyntax {
    /// Build a syntax from configuration, keeping defaults for unset entries.
    pub fn from_config(config: &SyntaxConfig) -> Result<Self, ScanError> {
        let defaults = Self::default();

        let compile = |name: &'static str, pattern: &Option<String>, default: Regex| {
            match pattern {
                Some(pattern) => {
                    Regex::new(pattern).map_err(|source| ScanError::InvalidSyntax { name, source })
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            namespace: compile("namespace", &config.namespace, defaults.namespace)?,
            class: compile("class", &config.class, defaults.class)?,
            controller: compile("controller", &config.controller, defaults.controller)?,
            base_path: compile("base_path", &config.base_path, defaults.base_path)?,
            route: compile("route", &config.route, defaults.route)?,
            operation: compile("operation", &config.operation, defaults.operation)?,
        })
    }
}

/// Routes extracted from one controller file.
#[derive(Debug, Clone)]
pub struct ParsedController {
    /// Fully qualified class identifier.
    pub controller: String,

    /// Class-level base path, empty when absent.
    pub base_path: String,

    /// Routes in source order.
    pub routes: Vec<RouteDescriptor>,

    /// File the controller was read from.
    pub file: PathBuf,
}

/// A route marker waiting for its operation declaration.
#[derive(Debug, Clone)]
struct PendingRoute {
    method: HttpMethod,
    path: String,
}

/// Extracts controllers and their routes from source text.
#[derive(Debug, Clone, Default)]
pub struct MarkerParser {
    syntax: MarkerSyntax,
}

impl MarkerParser {
    /// Create a parser using the default marker syntax.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser using a custom marker syntax.
    pub fn with_syntax(syntax: MarkerSyntax) -> Self {
        Self { syntax }
    }

    /// Parse a discovered source file.
    pub fn parse_file(&self, source: &SourceFile) -> Option<ParsedController> {
        self.parse_source(&source.content, &source.path)
    }

    /// Parse source text.
    ///
    /// Returns `None` when the text has no class declaration or the class is
    /// not marked as a controller.
    pub fn parse_source(&self, content: &str, file_path: &Path) -> Option<ParsedController> {
        let Some(controller) = self.class_identifier(content) else {
            trace!(file = %file_path.display(), "No class declaration, skipping");
            return None;
        };

        if !self.syntax.controller.is_match(content) {
            trace!(class = %controller, "Class is not an API controller, skipping");
            return None;
        }

        debug!(class = %controller, file = %file_path.display(), "Found API controller");

        let base_path = self.base_path(content);
        let routes = self.method_routes(content, &controller, &base_path);

        Some(ParsedController {
            controller,
            base_path,
            routes,
            file: file_path.to_path_buf(),
        })
    }

    /// Namespace-qualified name of the first class declared in `content`.
    fn class_identifier(&self, content: &str) -> Option<String> {
        let class = self.syntax.class.captures(content)?.get(1)?.as_str();

        let namespace = self
            .syntax
            .namespace
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();

        if namespace.is_empty() {
            Some(class.to_string())
        } else {
            Some(format!("{namespace}{NAMESPACE_SEPARATOR}{class}"))
        }
    }

    fn base_path(&self, content: &str) -> String {
        self.syntax
            .base_path
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Pair route markers with the operation declarations that follow them.
    fn method_routes(&self, content: &str, controller: &str, base_path: &str) -> Vec<RouteDescriptor> {
        let mut routes = Vec::new();
        let mut pending: Option<PendingRoute> = None;

        for line in content.lines() {
            let line = line.trim();

            if let Some(caps) = self.syntax.route.captures(line) {
                let method = caps
                    .get(1)
                    .map(|m| HttpMethod::from_marker(m.as_str()))
                    .unwrap_or_default();
                let path = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();

                pending = Some(PendingRoute { method, path });
            }

            let Some(operation) = self
                .syntax
                .operation
                .captures(line)
                .and_then(|caps| caps.get(1))
            else {
                continue;
            };

            if let Some(route) = pending.take() {
                let descriptor = RouteDescriptor::discovered(
                    base_path,
                    &route.path,
                    route.method,
                    controller,
                    operation.as_str(),
                );
                debug!(route = %descriptor, "Discovered route");
                routes.push(descriptor);
            }
        }

        if let Some(route) = pending {
            trace!(
                class = %controller,
                method = %route.method,
                path = %route.path,
                "Dropping route marker without operation"
            );
        }

        routes
    }
}
