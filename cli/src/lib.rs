#![deny(missing_docs)]

//! # Trellis CLI
//!
//! Command implementations, the actix-web adapter, and the compiled-in
//! bundled features.

/// CLI error types.
pub mod error;

/// Shared configuration flags.
pub mod settings;

/// Logging setup.
pub mod logging;

/// `check` command.
pub mod check;

/// `serve` command.
pub mod serve;

/// Actix-web adapter.
pub mod server;

/// Bundled feature handlers.
pub mod features;
