//! # rocket-router
//!
//! Attribute-driven route discovery with a persistent route cache.
//!
//! Controllers declare their endpoints as markers on classes and operations.
//! This crate finds those markers, compiles them into a flat route table,
//! writes the table to a cache file, and at startup binds every cached route
//! to a live controller supplied by the application's service locator.
//!
//! ## Architecture
//!
//! - [`route`] - Route descriptors, HTTP methods, markers and path normalization
//! - [`scanner`] - Source file discovery
//! - [`parser`] - Pattern-based marker extraction from source text
//! - [`reflect`] - Discovery through class introspection
//! - [`discovery`] - The [`DiscoveryStrategy`] trait and source-based discovery
//! - [`compiler`] - Strategy-agnostic route table compilation
//! - [`cache`] - Route cache artifact writer and reader
//! - [`resolver`] - Binding cached routes to controllers
//! - [`registrar`] - Handing resolved routes to the request router
//! - [`router`] - The configured [`Router`] facade and its builder
//! - [`config`] - Configuration management and TOML parsing
//! - [`error`] - Error types and handling

pub mod cache;
pub mod compiler;
pub mod config;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod reflect;
pub mod registrar;
pub mod resolver;
pub mod route;
pub mod router;
pub mod scanner;

// Re-export main types for convenience
pub use cache::CacheStore;
pub use compiler::RouteCompiler;
pub use config::{ConfigManager, RouterConfig};
pub use discovery::{DiscoveryStrategy, SourceDiscovery};
pub use error::{ErrorKind, RouterError, RouterResult};
pub use parser::{MarkerParser, MarkerSyntax};
pub use reflect::{
    ClassCatalog, ClassMetadata, ClassUniverse, Introspector, OperationMetadata,
    ReflectiveDiscovery, Visibility,
};
pub use registrar::RouteRegistrar;
pub use resolver::{
    Controller, ControllerRef, ResolvedRoute, ResolvedRouteTable, RouteResolver, ServiceLocator,
};
pub use route::{normalize_path, HttpMethod, Marker, RouteDescriptor, RouteTable};
pub use router::{Router, RouterBuilder};
pub use scanner::{SourceFile, SourceScanner};
