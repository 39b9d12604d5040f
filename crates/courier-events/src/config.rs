//! Publisher configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What `publish` does when a handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the first handler error and skip the remaining handlers.
    ///
    /// Handler panics unwind through `publish` unchanged.
    #[default]
    Propagate,
    /// Log each failure (error or panic) and keep invoking the remaining
    /// handlers. Failures are counted in the returned delivery.
    Isolate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagate => write!(f, "propagate"),
            Self::Isolate => write!(f, "isolate"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "isolate" => Ok(Self::Isolate),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'propagate' or 'isolate')"
            )),
        }
    }
}

/// Configuration for a publisher and its channel registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Handler failure policy.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Emit a `trace` event for every handler invocation.
    #[serde(default)]
    pub trace_payloads: bool,
}

impl PublisherConfig {
    /// Create a config with the given failure policy.
    #[must_use]
    pub fn new(failure_policy: FailurePolicy) -> Self {
        Self {
            failure_policy,
            ..Default::default()
        }
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enable per-invocation trace events.
    #[must_use]
    pub fn with_payload_tracing(mut self) -> Self {
        self.trace_payloads = true;
        self
    }
}
