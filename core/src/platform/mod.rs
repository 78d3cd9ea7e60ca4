#![deny(missing_docs)]

//! # Platform Capabilities
//!
//! Services handed to feature handlers. Handlers import them by name
//! (`use trellis_core::platform::logger;`), and contracts list the names under
//! `imports.platform`.

pub mod events;
pub mod logger;
