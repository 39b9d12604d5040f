//! Advice error types.

use courier_events::{EventsError, HandlerError};
use thiserror::Error;

/// Errors that can occur when advising or calling methods.
#[derive(Debug, Error)]
pub enum AdviceError {
    /// The target exposes no method with this name.
    #[error("unknown method '{name}' on {type_name}")]
    UnknownMethod {
        /// The requested method name.
        name: String,
        /// The type that was searched.
        type_name: &'static str,
    },

    /// The method body itself failed.
    #[error("method '{name}' failed: {source}")]
    Method {
        /// The method that failed.
        name: String,
        /// The method's error.
        #[source]
        source: HandlerError,
    },

    /// A before or after channel's handler failed.
    #[error(transparent)]
    Publish(#[from] EventsError),
}

/// Result type for advice operations.
pub type AdviceResult<T> = Result<T, AdviceError>;
