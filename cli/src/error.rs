#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use trellis_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Failure reported by the core pipeline.
    #[display("{}", _0)]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Report serialization failure.
    #[display("Report Error: {}", _0)]
    Report(serde_json::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// Written by hand because `General(String)` carries no error source.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_displays_unchanged() {
        let err: CliError = AppError::ValidationFailed(2).into();
        assert_eq!(
            err.to_string(),
            "Validation Error: 2 endpoint(s) failed contract validation"
        );
    }

    #[test]
    fn test_string_becomes_general() {
        let err: CliError = String::from("boom").into();
        assert_eq!(err.to_string(), "Operation failed: boom");
    }
}
