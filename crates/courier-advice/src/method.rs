//! Replaceable method slots.
//!
//! Rust methods are statically dispatched and cannot be swapped at runtime.
//! Objects that want to be advised keep their advisable behavior in a
//! [`MethodTable`]: named, function-valued slots that can be re-assigned
//! while the object is live.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use courier_events::{Args, HandlerError, Value};

use crate::advised::AdvisedMethod;
use crate::error::{AdviceError, AdviceResult};

/// Outcome of a method call.
pub type MethodResult = Result<Value, HandlerError>;

/// A type-erased method: receiver and arguments in, value out.
pub type Method = Arc<dyn Fn(&Value, &Args) -> MethodResult + Send + Sync>;

/// Erase a method closure into a [`Method`].
pub fn method<F>(func: F) -> Method
where
    F: Fn(&Value, &Args) -> MethodResult + Send + Sync + 'static,
{
    Arc::new(func)
}

struct Slot {
    current: Method,
    advice: Option<Arc<AdvisedMethod>>,
}

/// Named method slots of one object.
#[derive(Default)]
pub struct MethodTable {
    slots: RwLock<HashMap<String, Slot>>,
}

impl std::fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.names())
            .finish()
    }
}

impl MethodTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method while building the table.
    #[must_use]
    pub fn with_method<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(&Value, &Args) -> MethodResult + Send + Sync + 'static,
    {
        self.define(name, func);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.slots.read().unwrap_or_else(|e| {
            warn!("MethodTable read lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.slots.write().unwrap_or_else(|e| {
            warn!("MethodTable lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Assign a method to `name`.
    ///
    /// Re-assigning a slot discards any advice on it, exactly as overwriting
    /// a wrapped function would.
    pub fn define<F>(&self, name: &str, func: F)
    where
        F: Fn(&Value, &Args) -> MethodResult + Send + Sync + 'static,
    {
        let previous = self.write().insert(
            name.to_owned(),
            Slot {
                current: method(func),
                advice: None,
            },
        );
        if previous.is_some_and(|slot| slot.advice.is_some()) {
            debug!(method = name, "Advised method redefined, advice dropped");
        }
    }

    /// The method currently in slot `name`, advice wrapper included.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Method> {
        self.read().get(name).map(|slot| Arc::clone(&slot.current))
    }

    /// Check if a slot named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of all slots, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The advice record for `name`, if it has been advised.
    #[must_use]
    pub fn advice(&self, name: &str) -> Option<Arc<AdvisedMethod>> {
        self.read()
            .get(name)
            .and_then(|slot| slot.advice.as_ref().map(Arc::clone))
    }

    /// Call slot `name` with `receiver` and `args`.
    ///
    /// An advised slot ignores `receiver` and runs on the object it was
    /// advised on; see [`AdvisedMethod::call`].
    ///
    /// The table lock is released before the method runs, so methods may
    /// call or redefine other methods on the same table.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::UnknownMethod`] for a missing slot,
    /// [`AdviceError::Method`] when the body fails, and
    /// [`AdviceError::Publish`] when an advice channel's handler fails.
    pub fn call(&self, receiver: &Value, name: &str, args: &Args) -> AdviceResult<Value> {
        let method = self.get(name).ok_or_else(|| AdviceError::UnknownMethod {
            name: name.to_owned(),
            type_name: receiver.type_name(),
        })?;

        method(receiver, args).map_err(|error| match error.downcast::<AdviceError>() {
            Ok(advice) => *advice,
            Err(source) => AdviceError::Method {
                name: name.to_owned(),
                source,
            },
        })
    }

    /// Wrap slot `name` on first use and return its advice record.
    ///
    /// `owner` is the object this table belongs to. The wrap happens at most
    /// once per slot; later calls return the same record.
    pub(crate) fn advise(&self, name: &str, owner: &Value) -> AdviceResult<Arc<AdvisedMethod>> {
        let mut slots = self.write();
        let slot = slots
            .get_mut(name)
            .ok_or_else(|| AdviceError::UnknownMethod {
                name: name.to_owned(),
                type_name: owner.type_name(),
            })?;

        if let Some(advice) = &slot.advice {
            return Ok(Arc::clone(advice));
        }

        let advised = Arc::new(AdvisedMethod::new(name, Arc::clone(&slot.current), owner));
        let wrapped = Arc::clone(&advised);
        slot.current = Arc::new(move |receiver: &Value, args: &Args| {
            wrapped
                .call(receiver, args)
                .map_err(|e| Box::new(e) as HandlerError)
        });
        slot.advice = Some(Arc::clone(&advised));

        debug!(method = name, owner = owner.type_name(), "Method advised");
        Ok(advised)
    }
}

/// Objects whose methods can be advised.
pub trait Advisable: Any + Send + Sync {
    /// The object's method slots.
    fn methods(&self) -> &MethodTable;
}

/// Call method `name` on `target`, with `target` as receiver.
///
/// # Errors
///
/// See [`MethodTable::call`].
pub fn invoke<T: Advisable>(target: &Arc<T>, name: &str, args: Args) -> AdviceResult<Value> {
    let receiver = Value::from_arc(Arc::clone(target));
    target
        .methods()
        .call(&receiver, name, &args)
        .map_err(|error| match error {
            AdviceError::UnknownMethod { name, .. } => AdviceError::UnknownMethod {
                name,
                type_name: type_name::<T>(),
            },
            other => other,
        })
}
