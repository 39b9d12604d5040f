#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for Courier.
//!
//! A single [`Config`] holds the global publisher's settings and the logging
//! setup.
//!
//! # Usage
//!
//! ```rust,no_run
//! use courier_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! resolved.config.install().unwrap();
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** passed to [`Config::load`]
//! 2. **User** (`<config dir>/courier/config.toml`)
//! 3. **Environment variables** (`COURIER_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use merge::ConfigLayer;
pub use types::Config;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Install this configuration process-wide: the global publisher's
    /// settings, then the logging subscriber.
    ///
    /// Must run before the global publisher is first used. The logging
    /// subscriber is built, and both one-shot slots are checked, before
    /// either is set, so a failed install leaves the process untouched and
    /// can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Telemetry`] if the logging setup is invalid,
    /// its log directory cannot be created, or a subscriber is already
    /// installed, and [`ConfigError::Events`] if the global publisher was
    /// already configured or used.
    pub fn install(&self) -> ConfigResult<()> {
        let logging = courier_telemetry::LoggingSetup::build(&self.logging)?;
        if courier_telemetry::logging_installed() {
            return Err(courier_telemetry::TelemetryError::InitError(
                "a global logging subscriber is already installed".to_owned(),
            )
            .into());
        }

        courier_events::configure_global(self.publisher.clone())?;
        logging.init()?;
        tracing::debug!(
            failure_policy = ?self.publisher.failure_policy,
            "Configuration installed"
        );
        Ok(())
    }
}
