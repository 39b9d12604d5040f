//! Courier Advice - Before and after channels around method calls.
//!
//! An [`Advisable`] object keeps its advisable behavior in a
//! [`MethodTable`]. An [`Advisor`] wraps named slots of that table so every
//! call publishes:
//!
//! - before the body: the call's arguments followed by the object
//! - after the body: the return value followed by the object
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use courier_advice::{Advisable, Advisor, MethodTable, invoke};
//! use courier_events::{Publisher, Value, args};
//!
//! struct Greeter {
//!     methods: MethodTable,
//! }
//!
//! impl Advisable for Greeter {
//!     fn methods(&self) -> &MethodTable {
//!         &self.methods
//!     }
//! }
//!
//! let greeter = Arc::new(Greeter {
//!     methods: MethodTable::new().with_method("greet", |_, _| Ok(Value::new("hi"))),
//! });
//!
//! let publisher = Publisher::new();
//! let _log = publisher.subscribe("greeted", |_, args| {
//!     assert_eq!(args.get::<&str>(0), Some(&"hi"));
//! });
//!
//! Advisor::with_publisher(&greeter, publisher)
//!     .after("greet", "greeted")
//!     .unwrap();
//!
//! invoke(&greeter, "greet", args![]).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod advised;
mod advisor;
mod error;
mod method;

pub use advised::{AdvisedMethod, Phase};
pub use advisor::{Advisor, advise};
pub use error::{AdviceError, AdviceResult};
pub use method::{Advisable, Method, MethodResult, MethodTable, invoke, method};
