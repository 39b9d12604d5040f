//! Prelude module - commonly used types for convenient import.
//!
//! Use `use courier_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use courier_events::prelude::*;
//! use courier_events::args;
//!
//! let publisher = Publisher::new();
//! let subscription = publisher.subscribe("ping", |_, _| {});
//!
//! let delivery = publisher.publish("ping", args![]).unwrap();
//! assert_eq!(delivery.map(|d| d.len()), Some(1));
//! assert!(subscription.is_attached());
//! ```

// Publishers
pub use crate::{Courier, EmptyTarget, Publisher, configure_global, global};

// Subscriptions
pub use crate::{Binding, Delivery, Subscription, SubscriptionId};

// Handlers and values
pub use crate::{Args, Handler, HandlerError, HandlerResult, Value, WeakValue, handler};

// Hitching
pub use crate::{Hitch, HitchFn};

// Configuration and errors
pub use crate::{EventsError, EventsResult, FailurePolicy, PublisherConfig};
