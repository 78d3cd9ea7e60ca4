#![deny(missing_docs)]

//! # Parser Module
//!
//! Handles parsing of handler sources using the rust-analyzer syntax library.
//! Extracts the exported handler functions, platform and external imports, and
//! literal event names, so validation works on the syntax tree rather than on
//! raw text. Comments and string contents never match.

mod events;
mod exports;
mod imports;
pub mod models;

pub use models::{Export, ExportKind, HandlerSurface, Import, ImportKind};

use crate::config::FrameworkConfig;
use crate::error::{AppError, AppResult};
use ra_ap_edition::Edition;
use ra_ap_syntax::SourceFile;
use std::fs;
use std::path::Path;

/// Knobs controlling how a handler source is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Platform namespace as path segments (e.g. `["trellis_core", "platform"]`).
    pub platform_namespace: Vec<String>,
    /// Callee names that emit events.
    pub emit_methods: Vec<String>,
    /// Callee names that listen for events.
    pub listen_methods: Vec<String>,
}

impl SurfaceOptions {
    /// Derives the options from the framework configuration.
    pub fn from_config(config: &FrameworkConfig) -> Self {
        Self {
            platform_namespace: config.namespace_segments(),
            emit_methods: config.emit_methods.clone(),
            listen_methods: config.listen_methods.clone(),
        }
    }
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self::from_config(&FrameworkConfig::default())
    }
}

/// Parses `source` and extracts its handler surface.
///
/// The parser is error tolerant: a malformed file still yields whatever items
/// could be recovered, with the diagnostics in `syntax_errors`.
///
/// # Examples
/// ```
/// use trellis_core::parser::{analyze_source, SurfaceOptions};
///
/// let code = r#"
///     use trellis_core::platform::logger;
///     pub async fn list(req: Request) -> Reply { todo!() }
/// "#;
/// let surface = analyze_source(code, &SurfaceOptions::default());
/// assert_eq!(surface.exports[0].name, "list");
/// assert_eq!(surface.imports[0].name, "logger");
/// ```
pub fn analyze_source(source: &str, options: &SurfaceOptions) -> HandlerSurface {
    let parse = SourceFile::parse(source, Edition::Edition2021);
    let syntax_errors = parse.errors().iter().map(|e| e.to_string()).collect();
    let file = parse.tree();

    HandlerSurface {
        exports: exports::collect_exports(&file),
        imports: imports::collect_imports(&file, &options.platform_namespace),
        emits: events::collect_events(&file, &options.emit_methods),
        listens: events::collect_events(&file, &options.listen_methods),
        syntax_errors,
    }
}

/// Reads and analyzes the handler file at `path`.
pub fn analyze_file(path: &Path, options: &SurfaceOptions) -> AppResult<HandlerSurface> {
    let source = fs::read_to_string(path)
        .map_err(|e| AppError::General(format!("Failed to read handler {:?}: {}", path, e)))?;
    Ok(analyze_source(&source, options))
}
