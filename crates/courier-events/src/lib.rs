//! Courier Events - In-process publish/subscribe over named channels.
//!
//! This crate provides:
//! - A channel registry mapping channel names to ordered bindings
//! - Publishers that pair a target object with a private registry
//! - Subscription handles that can be detached and re-attached
//! - Hitching, which subscribes an object's own method to a channel
//! - A process-wide default publisher
//!
//! # Architecture
//!
//! Components talk by naming channels instead of holding references to each
//! other. A handler is subscribed to a channel on a [`Publisher`]; publishing
//! the channel invokes every bound handler synchronously, on the calling
//! thread, in subscription order.
//!
//! Each handler runs with a receiver (its *context*). Unless one is given,
//! the receiver is the publisher's target.
//!
//! # Example
//!
//! ```rust
//! use courier_events::{Publisher, args};
//!
//! let publisher = Publisher::new();
//!
//! let subscription = publisher.subscribe("greeting", |_receiver, args| {
//!     assert_eq!(args.get::<&str>(0), Some(&"hello"));
//! });
//!
//! assert!(publisher.publish("greeting", args!["hello"]).unwrap().is_some());
//!
//! subscription.detach();
//! assert!(publisher.publish("greeting", args!["hello"]).unwrap().is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod binding;
mod config;
mod error;
mod global;
mod hitch;
mod publisher;
mod registry;
mod subscription;
mod value;

pub use binding::{
    Binding, Handler, HandlerResult, IntoHandlerResult, SubscriptionId, handler,
};
pub use config::{FailurePolicy, PublisherConfig};
pub use error::{EventsError, EventsResult, HandlerError};
pub use global::{Courier, configure_global, global};
pub use hitch::{Hitch, HitchFn};
pub use publisher::{EmptyTarget, Publisher};
pub use registry::{ChannelRegistry, Delivery};
pub use subscription::Subscription;
pub use value::{Args, Value, WeakValue};
