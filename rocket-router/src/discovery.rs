//! Discovery strategies.
//!
//! A [`DiscoveryStrategy`] turns some view of the application code into a
//! [`RouteTable`]. Two implementations ship with the crate:
//!
//! - [`SourceDiscovery`] reads source files under a directory and matches
//!   marker patterns in their text.
//! - [`ReflectiveDiscovery`](crate::reflect::ReflectiveDiscovery) walks a
//!   class universe and reads the markers an [`Introspector`](crate::reflect::Introspector)
//!   reports for each class.
//!
//! Both build every path through [`normalize_path`](crate::normalize_path),
//! so equivalent code yields the same table whichever strategy is used.

use crate::config::RouterConfig;
use crate::error::RouterResult;
use crate::parser::{MarkerParser, MarkerSyntax};
use crate::route::RouteTable;
use crate::scanner::SourceScanner;
use std::path::{Path, PathBuf};

/// Produces a route table from application code.
pub trait DiscoveryStrategy {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Discover every route, in discovery order.
    fn discover(&self) -> RouterResult<RouteTable>;
}

impl<T: DiscoveryStrategy + ?Sized> DiscoveryStrategy for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn discover(&self) -> RouterResult<RouteTable> {
        (**self).discover()
    }
}

impl<T: DiscoveryStrategy + ?Sized> DiscoveryStrategy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn discover(&self) -> RouterResult<RouteTable> {
        (**self).discover()
    }
}

/// Discovers routes by pattern matching source files under a directory.
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    scanner: SourceScanner,
    parser: MarkerParser,
}

impl SourceDiscovery {
    /// Scan `root` with the default extension and marker syntax.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            scanner: SourceScanner::new(root),
            parser: MarkerParser::new(),
        }
    }

    /// Build from explicit scanner and parser.
    pub fn with_parts(scanner: SourceScanner, parser: MarkerParser) -> Self {
        Self { scanner, parser }
    }

    /// Build from a loaded configuration.
    pub fn from_config(root: impl Into<PathBuf>, config: &RouterConfig) -> RouterResult<Self> {
        let mut scanner = SourceScanner::new(root)
            .with_extension(config.scan.extension.as_str())
            .with_gitignore(config.scan.respect_gitignore);
        if let Some(ref filter) = config.scan.filter {
            scanner = scanner.with_filter(filter)?;
        }

        let parser = MarkerParser::with_syntax(MarkerSyntax::from_config(&config.syntax)?);

        Ok(Self { scanner, parser })
    }

    pub fn root(&self) -> &Path {
        self.scanner.root()
    }
}

impl DiscoveryStrategy for SourceDiscovery {
    fn name(&self) -> &'static str {
        "source"
    }

    fn discover(&self) -> RouterResult<RouteTable> {
        let files = self.scanner.scan()?;

        let mut table = RouteTable::new();
        for file in &files {
            if let Some(parsed) = self.parser.parse_file(file) {
                table.extend(parsed.routes);
            }
        }

        Ok(table)
    }
}
