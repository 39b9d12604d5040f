//! Subscription handles.

use std::sync::{Arc, Weak};
use tracing::debug;

use crate::binding::{Binding, SubscriptionId};
use crate::registry::ChannelRegistry;
use crate::value::Value;

/// Caller-held token for one (channel, handler, context) binding.
///
/// The handle refers to its registry weakly: once the owning publisher and
/// registry are gone, `attach` and `detach` do nothing.
///
/// `attach` is not idempotent. Attaching an already attached handle appends a
/// second copy of the binding, so the handler fires once per copy until each
/// copy has been detached.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    binding: Arc<Binding>,
    registry: Weak<ChannelRegistry>,
}

impl Subscription {
    /// Create a handle and attach it.
    pub(crate) fn attached(
        channel: &str,
        binding: Binding,
        registry: &Arc<ChannelRegistry>,
    ) -> Self {
        let subscription = Self {
            channel: channel.to_owned(),
            binding: Arc::new(binding),
            registry: Arc::downgrade(registry),
        };
        subscription.attach();
        debug!(
            channel,
            subscription_id = %subscription.id(),
            "Subscribed"
        );
        subscription
    }

    /// Append this binding to the tail of its channel.
    pub fn attach(&self) -> &Self {
        if let Some(registry) = self.registry.upgrade() {
            registry.append(&self.channel, Arc::clone(&self.binding));
        }
        self
    }

    /// Remove one occurrence of this binding from its channel.
    ///
    /// Detaching a handle that is not attached is a no-op.
    pub fn detach(&self) -> &Self {
        if let Some(registry) = self.registry.upgrade()
            && registry.remove(&self.channel, &self.binding)
        {
            debug!(
                channel = %self.channel,
                subscription_id = %self.id(),
                "Detached"
            );
        }
        self
    }

    /// Check whether at least one copy of the binding is on the channel.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attach_count() > 0
    }

    /// Number of copies of this binding currently on the channel.
    #[must_use]
    pub fn attach_count(&self) -> usize {
        self.registry
            .upgrade()
            .map_or(0, |registry| registry.occurrences(&self.channel, &self.binding))
    }

    /// The channel this handle subscribes to.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The receiver the handler is invoked with.
    #[must_use]
    pub fn context(&self) -> &Value {
        self.binding.context()
    }

    /// Identifier of the underlying binding.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.binding.id()
    }
}
