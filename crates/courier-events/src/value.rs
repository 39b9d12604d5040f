//! Dynamically typed values carried through publish calls.
//!
//! Channels are untyped: any handler may be subscribed to any channel and any
//! publisher may send anything. A [`Value`] is a shared, type-erased payload
//! and [`Args`] is the ordered argument list handed to every handler.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, Weak};

/// A shared, type-erased value.
///
/// Cloning a `Value` clones the pointer, never the payload, so every handler
/// invoked by one publish observes the same instance.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wrap an owned value.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wrap an already shared value without re-allocating it.
    ///
    /// Identity is preserved: [`Value::points_to`] returns `true` for the
    /// original `Arc`.
    #[must_use]
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the payload as `T`, if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Get a new strong reference to the payload as `Arc<T>`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Check whether the payload is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Check whether two values share the same payload allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Check whether this value wraps exactly the given allocation.
    #[must_use]
    pub fn points_to<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(target))
    }

    /// Name of the payload type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// A reference to the payload that does not keep it alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakValue {
        WeakValue {
            inner: Arc::downgrade(&self.inner),
            type_name: self.type_name,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.type_name).finish()
    }
}

/// A non-owning [`Value`].
///
/// Used where an object refers to itself through a value it owns, which
/// would otherwise form an `Arc` cycle.
#[derive(Clone)]
pub struct WeakValue {
    inner: Weak<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl WeakValue {
    /// The value, if its payload is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Value> {
        self.inner.upgrade().map(|inner| Value {
            inner,
            type_name: self.type_name,
        })
    }

    /// Name of the payload type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for WeakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakValue").field(&self.type_name).finish()
    }
}

/// Ordered arguments passed to handlers and methods.
#[derive(Clone, Default)]
pub struct Args(Vec<Value>);

impl Args {
    /// Create an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow argument `index` as `T`.
    ///
    /// Returns `None` if the index is out of range or the type differs.
    #[must_use]
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.0.get(index).and_then(Value::downcast_ref::<T>)
    }

    /// The raw value at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// The last argument, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Value> {
        self.0.last()
    }

    /// Append a value.
    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    /// Return a copy of these arguments with `value` appended.
    #[must_use]
    pub fn with(&self, value: Value) -> Self {
        let mut args = self.clone();
        args.push(value);
        args
    }

    /// Iterate over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(Value::type_name))
            .finish()
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build an [`Args`] list from plain Rust values.
///
/// ```rust
/// use courier_events::args;
///
/// let args = args![1, "two", 3.0_f64];
/// assert_eq!(args.len(), 3);
/// assert_eq!(args.get::<&str>(1), Some(&"two"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Value::new($value)),+])
    };
}
