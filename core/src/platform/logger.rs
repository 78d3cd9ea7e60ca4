//! # Logger Capability
//!
//! An endpoint-scoped logger. Every record carries `feature` and `endpoint`
//! fields and goes through `tracing`, so it follows whatever subscriber the
//! host installed.

use tracing::{debug, error, info, warn};

/// Logger bound to one feature endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    feature: &'static str,
    endpoint: &'static str,
}

/// Creates a logger for `feature/endpoint`.
pub const fn scoped(feature: &'static str, endpoint: &'static str) -> Logger {
    Logger { feature, endpoint }
}

impl Logger {
    /// Feature name carried on every record.
    pub fn feature(&self) -> &'static str {
        self.feature
    }

    /// Endpoint name carried on every record.
    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Debug-level record.
    pub fn debug(&self, message: &str) {
        debug!(feature = self.feature, endpoint = self.endpoint, "{}", message);
    }

    /// Info-level record.
    pub fn info(&self, message: &str) {
        info!(feature = self.feature, endpoint = self.endpoint, "{}", message);
    }

    /// Warn-level record.
    pub fn warn(&self, message: &str) {
        warn!(feature = self.feature, endpoint = self.endpoint, "{}", message);
    }

    /// Error-level record.
    pub fn error(&self, message: &str) {
        error!(feature = self.feature, endpoint = self.endpoint, "{}", message);
    }
}
