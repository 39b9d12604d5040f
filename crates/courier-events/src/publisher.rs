//! Publishers: an object paired with a private channel registry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::binding::{Binding, Handler, IntoHandlerResult, handler};
use crate::config::PublisherConfig;
use crate::error::EventsResult;
use crate::hitch::{Hitch, resolve};
use crate::registry::{ChannelRegistry, Delivery};
use crate::subscription::Subscription;
use crate::value::{Args, Value};

/// Target of a publisher created without one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTarget;

/// A target object augmented with `subscribe` and `publish`.
///
/// Every publisher owns exactly one [`ChannelRegistry`]; publishers never
/// share channels. Cloning a `Publisher` yields another handle to the same
/// registry and target.
///
/// Building a second publisher for the same target creates a new, independent
/// registry. Subscriptions made through the first publisher keep working
/// against their own registry but are no longer reachable from the second.
///
/// **WARNING:** the publisher holds its target strongly, and every binding
/// holds its context strongly. Storing a `Publisher` inside its own target
/// creates an `Arc` reference cycle and leaks both. Keep the publisher next to
/// the target instead.
#[derive(Debug, Clone)]
pub struct Publisher {
    registry: Arc<ChannelRegistry>,
    target: Value,
}

impl Publisher {
    /// Create a publisher for a fresh, empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PublisherConfig::default())
    }

    /// Create a publisher for a fresh, empty target with a configuration.
    #[must_use]
    pub fn with_config(config: PublisherConfig) -> Self {
        Self::for_target_with_config(Arc::new(EmptyTarget), config)
    }

    /// Turn `target` into a publisher.
    ///
    /// Handlers subscribed without an explicit context receive `target` as
    /// their receiver.
    #[must_use]
    pub fn for_target<T: Any + Send + Sync>(target: Arc<T>) -> Self {
        Self::for_target_with_config(target, PublisherConfig::default())
    }

    /// Turn `target` into a publisher with a configuration.
    #[must_use]
    pub fn for_target_with_config<T: Any + Send + Sync>(
        target: Arc<T>,
        config: PublisherConfig,
    ) -> Self {
        let target = Value::from_arc(target);
        debug!(
            target = target.type_name(),
            failure_policy = %config.failure_policy,
            "Publisher created"
        );
        Self {
            registry: Arc::new(ChannelRegistry::new(config)),
            target,
        }
    }

    /// The object this publisher was built for.
    #[must_use]
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// The publisher's configuration.
    #[must_use]
    pub fn config(&self) -> &PublisherConfig {
        self.registry.config()
    }

    /// Check whether two handles share a registry.
    #[must_use]
    pub fn same_registry(&self, other: &Publisher) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }

    /// Subscribe `handler` to `channel`.
    ///
    /// The handler's receiver is the publisher's target. The returned
    /// subscription is already attached.
    pub fn subscribe<F, R>(&self, channel: &str, handler_fn: F) -> Subscription
    where
        F: Fn(&Value, &Args) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.subscribe_handler(channel, handler(handler_fn), self.target.clone())
    }

    /// Subscribe `handler` to `channel` with an explicit receiver.
    pub fn subscribe_with_context<F, R>(
        &self,
        channel: &str,
        handler_fn: F,
        context: Value,
    ) -> Subscription
    where
        F: Fn(&Value, &Args) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.subscribe_handler(channel, handler(handler_fn), context)
    }

    /// Subscribe one handler per channel.
    ///
    /// Returns a map from channel to its subscription. If a channel appears
    /// more than once, the last handler given for it wins and the earlier
    /// ones are never subscribed.
    pub fn subscribe_many<I, K>(&self, handlers: I) -> HashMap<String, Subscription>
    where
        I: IntoIterator<Item = (K, Handler)>,
        K: Into<String>,
    {
        let handlers: HashMap<String, Handler> = handlers
            .into_iter()
            .map(|(channel, handler)| (channel.into(), handler))
            .collect();

        handlers
            .into_iter()
            .map(|(channel, handler)| {
                let subscription =
                    self.subscribe_handler(&channel, handler, self.target.clone());
                (channel, subscription)
            })
            .collect()
    }

    /// Subscribe the member of `target` named `channel` to `channel`, with
    /// `target` as receiver.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Lookup`](crate::EventsError::Lookup) if
    /// `target` has no member with that name.
    pub fn hitch<T: Hitch>(
        &self,
        target: &Arc<T>,
        channel: &str,
    ) -> EventsResult<Subscription> {
        let binding = resolve(target, channel)?;
        Ok(Subscription::attached(channel, binding, &self.registry))
    }

    /// Hitch several members of `target`, one per channel name.
    ///
    /// Subscriptions are returned in input order. Every name is resolved
    /// before anything is attached, so a failed lookup leaves no partial
    /// subscriptions behind.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Lookup`](crate::EventsError::Lookup) for the
    /// first name `target` does not expose.
    pub fn hitch_all<T, I, S>(
        &self,
        target: &Arc<T>,
        channels: I,
    ) -> EventsResult<Vec<Subscription>>
    where
        T: Hitch,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolved = channels
            .into_iter()
            .map(|channel| {
                let channel = channel.as_ref();
                resolve(target, channel).map(|binding| (channel.to_owned(), binding))
            })
            .collect::<EventsResult<Vec<(String, Binding)>>>()?;

        Ok(resolved
            .into_iter()
            .map(|(channel, binding)| Subscription::attached(&channel, binding, &self.registry))
            .collect())
    }

    /// Publish `args` on `channel`.
    ///
    /// Returns `Ok(None)` when nothing was invoked because the channel has no
    /// bindings. See [`ChannelRegistry::publish`].
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::Handler`](crate::EventsError::Handler) when a
    /// handler fails and the publisher propagates failures.
    pub fn publish(&self, channel: &str, args: Args) -> EventsResult<Option<Delivery>> {
        self.registry.publish(channel, &args)
    }

    /// Detach every binding on `channel`. Returns how many were removed.
    pub fn clear(&self, channel: &str) -> usize {
        self.registry.clear(channel)
    }

    /// Names of every channel subscribed so far.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.registry.channels()
    }

    /// Number of bindings currently on `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry.len(channel)
    }

    /// Check whether publishing `channel` would invoke anything.
    #[must_use]
    pub fn has_subscribers(&self, channel: &str) -> bool {
        !self.registry.is_empty(channel)
    }

    fn subscribe_handler(&self, channel: &str, handler: Handler, context: Value) -> Subscription {
        Subscription::attached(channel, Binding::new(handler, context), &self.registry)
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}
