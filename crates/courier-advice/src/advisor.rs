//! Attaching before and after channels to an object's methods.

use std::any::type_name;
use std::sync::Arc;
use tracing::debug;

use courier_events::{Args, Publisher, Value, global};

use crate::advised::{AdvisedMethod, Phase};
use crate::error::{AdviceError, AdviceResult};
use crate::method::{Advisable, invoke};

/// Advice helper bound to one target and one publisher.
///
/// Registering a channel wraps the named method on first use. Every later
/// call of the method, by anyone holding the target, publishes to the
/// registered channels.
pub struct Advisor<T: Advisable> {
    target: Arc<T>,
    publisher: Publisher,
}

impl<T: Advisable> std::fmt::Debug for Advisor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("target", &type_name::<T>())
            .field("publisher", &self.publisher)
            .finish()
    }
}

impl<T: Advisable> Clone for Advisor<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            publisher: self.publisher.clone(),
        }
    }
}

/// Advise `target`, publishing on the global publisher.
#[must_use]
pub fn advise<T: Advisable>(target: &Arc<T>) -> Advisor<T> {
    Advisor::with_publisher(target, global().clone())
}

impl<T: Advisable> Advisor<T> {
    /// Advise `target`, publishing on `publisher`.
    #[must_use]
    pub fn with_publisher(target: &Arc<T>, publisher: Publisher) -> Self {
        Self {
            target: Arc::clone(target),
            publisher,
        }
    }

    /// The advised object.
    #[must_use]
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// The publisher advice channels are published on.
    #[must_use]
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Publish `channel` before each call of `method`.
    ///
    /// The payload is the call's arguments followed by the target.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::UnknownMethod`] if the target has no such
    /// method.
    pub fn before(&self, method: &str, channel: &str) -> AdviceResult<&Self> {
        self.register(Phase::Before, method, channel)?;
        Ok(self)
    }

    /// Publish `channel` after each call of `method`.
    ///
    /// The payload is the return value followed by the target. Call
    /// arguments are not included.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::UnknownMethod`] if the target has no such
    /// method.
    pub fn after(&self, method: &str, channel: &str) -> AdviceResult<&Self> {
        self.register(Phase::After, method, channel)?;
        Ok(self)
    }

    /// [`before`](Self::before) for each `(method, channel)` pair, in order.
    ///
    /// # Errors
    ///
    /// Every method is checked first; if any is unknown nothing is
    /// registered.
    pub fn before_each<I, M, C>(&self, pairs: I) -> AdviceResult<&Self>
    where
        I: IntoIterator<Item = (M, C)>,
        M: AsRef<str>,
        C: AsRef<str>,
    {
        self.register_each(Phase::Before, pairs)?;
        Ok(self)
    }

    /// [`after`](Self::after) for each `(method, channel)` pair, in order.
    ///
    /// # Errors
    ///
    /// Every method is checked first; if any is unknown nothing is
    /// registered.
    pub fn after_each<I, M, C>(&self, pairs: I) -> AdviceResult<&Self>
    where
        I: IntoIterator<Item = (M, C)>,
        M: AsRef<str>,
        C: AsRef<str>,
    {
        self.register_each(Phase::After, pairs)?;
        Ok(self)
    }

    /// Advice records of the target's advised methods, sorted by name.
    #[must_use]
    pub fn advised_methods(&self) -> Vec<Arc<AdvisedMethod>> {
        let methods = self.target.methods();
        methods
            .names()
            .iter()
            .filter_map(|name| methods.advice(name))
            .collect()
    }

    /// Call `method` on the target.
    ///
    /// # Errors
    ///
    /// See [`MethodTable::call`](crate::MethodTable::call).
    pub fn invoke(&self, method: &str, args: Args) -> AdviceResult<Value> {
        invoke(&self.target, method, args)
    }

    fn register(&self, phase: Phase, method: &str, channel: &str) -> AdviceResult<()> {
        let owner = Value::from_arc(Arc::clone(&self.target));
        let advised = self.target.methods().advise(method, &owner)?;
        advised.register(phase, self.publisher.clone(), channel);
        debug!(
            target_type = type_name::<T>(),
            method,
            channel,
            %phase,
            "Advice registered"
        );
        Ok(())
    }

    fn register_each<I, M, C>(&self, phase: Phase, pairs: I) -> AdviceResult<()>
    where
        I: IntoIterator<Item = (M, C)>,
        M: AsRef<str>,
        C: AsRef<str>,
    {
        let pairs: Vec<(M, C)> = pairs.into_iter().collect();
        let methods = self.target.methods();
        if let Some((missing, _)) = pairs
            .iter()
            .find(|(method, _)| !methods.contains(method.as_ref()))
        {
            return Err(AdviceError::UnknownMethod {
                name: missing.as_ref().to_owned(),
                type_name: type_name::<T>(),
            });
        }

        for (method, channel) in &pairs {
            self.register(phase, method.as_ref(), channel.as_ref())?;
        }
        Ok(())
    }
}
