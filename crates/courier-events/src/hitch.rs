//! Hitching: subscribing an object's own method to the channel of the same
//! name.
//!
//! Rust has no runtime member lookup, so an object opts in by implementing
//! [`Hitch`] and mapping member names to methods itself. The lookup happens
//! when the subscription is made, not when the channel is published.

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::binding::{Binding, HandlerResult, handler};
use crate::error::{EventsError, EventsResult};
use crate::value::{Args, Value};

/// A method that can be hitched to a channel.
pub type HitchFn<T> = fn(&T, &Args) -> HandlerResult;

/// Objects that expose callable members by name.
///
/// ```rust
/// use courier_events::{Args, HandlerResult, Hitch, HitchFn, Publisher, args};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counter {
///     hits: AtomicUsize,
/// }
///
/// impl Counter {
///     fn tick(&self, _args: &Args) -> HandlerResult {
///         self.hits.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// impl Hitch for Counter {
///     fn hitch_method(&self, name: &str) -> Option<HitchFn<Self>> {
///         match name {
///             "tick" => Some(Self::tick),
///             _ => None,
///         }
///     }
/// }
///
/// let publisher = Publisher::new();
/// let counter = Arc::new(Counter::default());
/// publisher.hitch(&counter, "tick").unwrap();
/// publisher.publish("tick", args![]).unwrap();
/// assert_eq!(counter.hits.load(Ordering::SeqCst), 1);
/// ```
pub trait Hitch: Any + Send + Sync + Sized {
    /// Look up the member called exactly `name`.
    fn hitch_method(&self, name: &str) -> Option<HitchFn<Self>>;
}

/// Resolve `name` on `target` into a binding whose context is `target`.
pub(crate) fn resolve<T: Hitch>(target: &Arc<T>, name: &str) -> EventsResult<Binding> {
    let method = target.hitch_method(name).ok_or_else(|| EventsError::Lookup {
        name: name.to_owned(),
        type_name: type_name::<T>(),
    })?;

    let this = Arc::clone(target);
    let handler = handler(move |_: &Value, args: &Args| method(&this, args));

    Ok(Binding::new(handler, Value::from_arc(Arc::clone(target))))
}
