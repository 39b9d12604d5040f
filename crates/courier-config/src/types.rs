//! Configuration struct definitions.

use serde::{Deserialize, Serialize};

use courier_events::PublisherConfig;
use courier_telemetry::LogConfig;

/// Complete Courier configuration.
///
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the global publisher.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LogConfig,
}
