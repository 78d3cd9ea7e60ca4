#![deny(missing_docs)]

//! # Trellis Core
//!
//! Contract-checked feature framework: discovers feature endpoints, validates
//! each endpoint's contract against its handler source, and binds the routes
//! of a fully valid tree to a router.

/// Shared error types.
pub mod error;

/// Framework configuration.
pub mod config;

/// Feature/endpoint discovery.
pub mod discovery;

/// Contract declarations.
pub mod contract;

/// Handler source analysis.
pub mod parser;

/// Contract validation.
pub mod validation;

/// Validation reporting.
pub mod report;

/// Handler model and dispatch tables.
pub mod handler;

/// Route binding.
pub mod binder;

/// Startup pipeline.
pub mod pipeline;

/// Capabilities offered to feature handlers.
pub mod platform;

pub use binder::{RegisteredRoute, RouteBinder, RouteSink, RouteTable};
pub use config::FrameworkConfig;
pub use contract::{load_contract, parse_contract, Contract, HttpMethod, RouteKey};
pub use discovery::{FeatureDiscoverer, FeatureEndpoint};
pub use error::{AppError, AppResult};
pub use handler::{
    BoundHandler, HandlerError, HandlerRegistry, HandlerRequest, HandlerResult, HandlerTable,
    Reply,
};
pub use parser::{analyze_file, analyze_source, HandlerSurface, SurfaceOptions};
pub use pipeline::{bind_routes, validate_features, PipelineStats, ValidationPass};
pub use report::{print_report, ValidationReport};
pub use validation::{validate_contract, validate_endpoint, ValidationResult};
