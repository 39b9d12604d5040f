//! Event error types.

use thiserror::Error;

/// Error raised by a handler or method body.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur with channel operations.
#[derive(Debug, Error)]
pub enum EventsError {
    /// A hitch subscription named a member the object does not expose.
    #[error("lookup error: {type_name} has no callable member '{name}'")]
    Lookup {
        /// The requested member (and channel) name.
        name: String,
        /// The type that was searched.
        type_name: &'static str,
    },

    /// A handler failed and the publisher propagates failures.
    #[error("handler on channel '{channel}' failed: {source}")]
    Handler {
        /// Channel being published.
        channel: String,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },

    /// The global publisher was configured after it had been created.
    #[error("global publisher is already initialized")]
    AlreadyConfigured,
}

/// Result type for channel operations.
pub type EventsResult<T> = Result<T, EventsError>;
