//! Prelude module - commonly used types for convenient import.
//!
//! Use `use courier_telemetry::prelude::*;` to import all essential types.

// Configuration
pub use crate::{FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, LoggingSetup};

// Setup
pub use crate::{logging_installed, setup_default_logging, setup_logging};

// Errors
pub use crate::{TelemetryError, TelemetryResult};
