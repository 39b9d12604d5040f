//! Unified prelude for Courier.
//!
//! This crate provides a single import to bring in all commonly used types
//! from across Courier.
//!
//! # Usage
//!
//! ```rust
//! use courier_prelude::*;
//!
//! // Now you have access to types from:
//! // - courier-events (Publisher, Subscription, Args, Value, global)
//! // - courier-advice (Advisor, MethodTable, Advisable)
//! // - courier-telemetry (LogConfig, setup_logging)
//!
//! let publisher = Publisher::new();
//! let _sub = publisher.subscribe("ready", |_, _| {});
//! assert!(publisher.has_subscribers("ready"));
//! ```
//!
//! # Per-Crate Preludes
//!
//! If you only need types from specific crates, use their individual preludes:
//!
//! ```rust
//! use courier_events::prelude::*;
//! use courier_advice::prelude::*;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Re-export all crate preludes
pub use courier_advice::prelude::*;
pub use courier_events::prelude::*;
pub use courier_telemetry::prelude::*;

// Macros live at the crate roots
pub use courier_events::args;
