//! Channel registry: the mapping from channel name to ordered bindings.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

use crate::binding::Binding;
use crate::config::{FailurePolicy, PublisherConfig};
use crate::error::{EventsError, EventsResult};
use crate::value::Args;

/// Outcome of a publish that reached at least one binding.
#[derive(Debug, Clone)]
pub struct Delivery {
    channel: String,
    bindings: Vec<Arc<Binding>>,
    failures: usize,
}

impl Delivery {
    /// The channel that was published.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The bindings that were invoked, in invocation order.
    #[must_use]
    pub fn bindings(&self) -> &[Arc<Binding>] {
        &self.bindings
    }

    /// Number of bindings invoked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Always `false`: an empty channel yields no delivery at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of handlers that failed under [`FailurePolicy::Isolate`].
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }
}

/// Registry of channels for one publisher.
///
/// Channels are created on first subscribe and are never removed, even once
/// every binding has been detached.
///
/// Publishing takes a snapshot of the channel's bindings and releases the lock
/// before invoking any handler. Handlers may therefore subscribe, detach or
/// publish (on any channel, including the one being published) without
/// deadlocking; such changes take effect from the next publish.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Vec<Arc<Binding>>>>,
    config: PublisherConfig,
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self.read();
        f.debug_struct("ChannelRegistry")
            .field("channel_count", &channels.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ChannelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: PublisherConfig) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The configuration this registry publishes with.
    #[must_use]
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Arc<Binding>>>> {
        self.channels.read().unwrap_or_else(|e| {
            warn!("ChannelRegistry read lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Arc<Binding>>>> {
        self.channels.write().unwrap_or_else(|e| {
            warn!("ChannelRegistry lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Append a binding to the tail of a channel, creating the channel if
    /// needed.
    pub(crate) fn append(&self, channel: &str, binding: Arc<Binding>) {
        let mut channels = self.write();
        let list = channels.entry(channel.to_owned()).or_default();
        list.push(binding);
        trace!(channel, binding_count = list.len(), "Binding attached");
    }

    /// Remove the first entry that is this exact binding.
    ///
    /// Returns `true` if an entry was removed.
    pub(crate) fn remove(&self, channel: &str, binding: &Arc<Binding>) -> bool {
        let mut channels = self.write();
        let Some(list) = channels.get_mut(channel) else {
            return false;
        };
        let Some(index) = list.iter().position(|b| Arc::ptr_eq(b, binding)) else {
            return false;
        };
        list.remove(index);
        trace!(channel, binding_count = list.len(), "Binding detached");
        true
    }

    /// Number of entries on `channel` that are this exact binding.
    pub(crate) fn occurrences(&self, channel: &str, binding: &Arc<Binding>) -> usize {
        self.read().get(channel).map_or(0, |list| {
            list.iter().filter(|b| Arc::ptr_eq(b, binding)).count()
        })
    }

    /// Copy of the bindings currently on `channel`.
    ///
    /// Returns `None` if the channel does not exist or has no bindings.
    #[must_use]
    pub fn snapshot(&self, channel: &str) -> Option<Vec<Arc<Binding>>> {
        self.read()
            .get(channel)
            .filter(|list| !list.is_empty())
            .cloned()
    }

    /// Invoke every binding on `channel`, in order, with `args`.
    ///
    /// Returns `Ok(None)` without invoking anything when the channel has
    /// never been subscribed or currently has no bindings.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Propagate`], returns [`EventsError::Handler`]
    /// for the first failing handler; the handlers after it are not invoked.
    pub fn publish(&self, channel: &str, args: &Args) -> EventsResult<Option<Delivery>> {
        let Some(bindings) = self.snapshot(channel) else {
            trace!(channel, "No bindings for channel");
            return Ok(None);
        };

        trace!(
            channel,
            binding_count = bindings.len(),
            arg_count = args.len(),
            "Publishing"
        );

        let mut failures: usize = 0;
        for binding in &bindings {
            if self.config.trace_payloads {
                trace!(
                    channel,
                    subscription_id = %binding.id(),
                    receiver = binding.context().type_name(),
                    args = ?args,
                    "Invoking handler"
                );
            }

            match self.config.failure_policy {
                FailurePolicy::Propagate => {
                    binding
                        .invoke(args)
                        .map_err(|source| EventsError::Handler {
                            channel: channel.to_owned(),
                            source,
                        })?;
                },
                FailurePolicy::Isolate => {
                    match catch_unwind(AssertUnwindSafe(|| binding.invoke(args))) {
                        Ok(Ok(())) => {},
                        Ok(Err(error)) => {
                            failures = failures.saturating_add(1);
                            warn!(
                                channel,
                                subscription_id = %binding.id(),
                                error = %error,
                                "Handler failed"
                            );
                        },
                        Err(payload) => {
                            failures = failures.saturating_add(1);
                            warn!(
                                channel,
                                subscription_id = %binding.id(),
                                panic = panic_message(payload.as_ref()),
                                "Handler panicked"
                            );
                        },
                    }
                },
            }
        }

        Ok(Some(Delivery {
            channel: channel.to_owned(),
            bindings,
            failures,
        }))
    }

    /// Detach every binding on `channel`. The channel itself persists.
    ///
    /// Returns the number of bindings removed.
    pub fn clear(&self, channel: &str) -> usize {
        let mut channels = self.write();
        let removed = channels.get_mut(channel).map_or(0, |list| {
            let count = list.len();
            list.clear();
            count
        });
        debug!(channel, removed, "Channel cleared");
        removed
    }

    /// Names of all channels ever subscribed, sorted.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a channel has been created.
    #[must_use]
    pub fn contains(&self, channel: &str) -> bool {
        self.read().contains_key(channel)
    }

    /// Number of bindings currently on `channel`.
    #[must_use]
    pub fn len(&self, channel: &str) -> usize {
        self.read().get(channel).map_or(0, Vec::len)
    }

    /// Check if `channel` currently has no bindings.
    #[must_use]
    pub fn is_empty(&self, channel: &str) -> bool {
        self.len(channel) == 0
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
