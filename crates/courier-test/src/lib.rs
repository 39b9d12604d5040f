//! Courier Test - Shared test utilities for Courier.
//!
//! This crate provides recording handlers and fixtures that can be used
//! across Courier crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! courier-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust
//! use courier_events::{Publisher, args};
//! use courier_test::Recorder;
//!
//! let publisher = Publisher::new();
//! let recorder = Recorder::new();
//! recorder.subscribe(&publisher, "test");
//!
//! publisher.publish("test", args![1, 2]).unwrap();
//!
//! let call = recorder.last().unwrap();
//! assert_eq!(call.args.get::<i32>(1), Some(&2));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
