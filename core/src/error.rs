#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The features root is missing or unreadable. Fatal at startup.
    #[from(ignore)]
    #[display("Discovery Error: {_0}")]
    Discovery(String),

    /// A contract file could not be read or lacks its `contract` declaration.
    #[from(ignore)]
    #[display("Contract Load Error: {_0}")]
    ContractLoad(String),

    /// Invalid framework configuration.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// One or more endpoints failed contract validation.
    #[from(ignore)]
    #[display("Validation Error: {_0} endpoint(s) failed contract validation")]
    ValidationFailed(usize),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
