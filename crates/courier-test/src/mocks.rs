//! Recording and failing handlers for testing.

use std::sync::{Arc, Mutex};

use courier_events::{Args, Handler, HandlerResult, Publisher, Subscription, Value, handler};

/// One recorded handler invocation.
#[derive(Debug, Clone)]
pub struct Call {
    /// Channel the handler was subscribed to.
    pub channel: String,
    /// Receiver the handler ran with.
    pub receiver: Value,
    /// Arguments it received.
    pub args: Args,
}

/// Captures every invocation of the handlers it hands out.
///
/// Clones share the same record, so a recorder can be moved into handlers
/// and inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records invocations as coming from `channel`.
    #[must_use]
    pub fn handler(&self, channel: &str) -> Handler {
        let calls = Arc::clone(&self.calls);
        let channel = channel.to_owned();
        handler(move |receiver: &Value, args: &Args| {
            if let Ok(mut guard) = calls.lock() {
                guard.push(Call {
                    channel: channel.clone(),
                    receiver: receiver.clone(),
                    args: args.clone(),
                });
            }
        })
    }

    /// Subscribe a recording handler to `channel` on `publisher`.
    pub fn subscribe(&self, publisher: &Publisher, channel: &str) -> Subscription {
        let recording = self.handler(channel);
        publisher.subscribe(channel, move |receiver, args| recording(receiver, args))
    }

    /// Subscribe a recording handler with an explicit receiver.
    pub fn subscribe_with_context(
        &self,
        publisher: &Publisher,
        channel: &str,
        context: Value,
    ) -> Subscription {
        let recording = self.handler(channel);
        publisher.subscribe_with_context(
            channel,
            move |receiver, args| recording(receiver, args),
            context,
        )
    }

    /// All recorded calls, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Channels of the recorded calls, oldest first.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.channel).collect()
    }

    /// The most recent call.
    #[must_use]
    pub fn last(&self) -> Option<Call> {
        self.calls().pop()
    }

    /// Total number of recorded calls.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls().len()
    }

    /// Number of recorded calls for `channel`.
    #[must_use]
    pub fn count_for(&self, channel: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.channel == channel)
            .count()
    }

    /// Forget all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.calls.lock().expect("lock poisoned").clear();
    }
}

/// A handler that always fails with `message`.
#[must_use]
pub fn failing_handler(message: &'static str) -> Handler {
    handler(move |_: &Value, _: &Args| -> HandlerResult { Err(message.into()) })
}

/// A handler that always panics with `message`.
#[must_use]
pub fn panicking_handler(message: &'static str) -> Handler {
    handler(move |_: &Value, _: &Args| -> HandlerResult { panic!("{message}") })
}
