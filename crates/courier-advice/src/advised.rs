//! Advice records for wrapped methods.

use std::sync::{Mutex, MutexGuard};
use tracing::{trace, warn};

use courier_events::{Args, Publisher, Value, WeakValue};

use crate::error::{AdviceError, AdviceResult};
use crate::method::Method;

/// When an advice channel is published relative to the method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Published with the call's arguments, then the receiver.
    Before,
    /// Published with the return value, then the receiver.
    After,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

#[derive(Debug, Clone)]
struct AdviceChannel {
    publisher: Publisher,
    channel: String,
}

#[derive(Debug, Default)]
struct Channels {
    before: Vec<AdviceChannel>,
    after: Vec<AdviceChannel>,
}

/// A method slot that has been wrapped for advice.
///
/// Holds the method that occupied the slot when it was first advised, the
/// object the slot belongs to, and the ordered before and after channels
/// registered since. The object is held weakly since it owns the slot.
pub struct AdvisedMethod {
    name: String,
    original: Method,
    target: WeakValue,
    channels: Mutex<Channels>,
}

impl std::fmt::Debug for AdvisedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisedMethod")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("before", &self.before_channels())
            .field("after", &self.after_channels())
            .finish_non_exhaustive()
    }
}

impl AdvisedMethod {
    pub(crate) fn new(name: &str, original: Method, target: &Value) -> Self {
        Self {
            name: name.to_owned(),
            original,
            target: target.downgrade(),
            channels: Mutex::new(Channels::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(|e| {
            warn!(method = %self.name, "Advice lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Name of the advised slot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method that was wrapped.
    #[must_use]
    pub fn original(&self) -> &Method {
        &self.original
    }

    /// The advised object, if it is still alive.
    #[must_use]
    pub fn target(&self) -> Option<Value> {
        self.target.upgrade()
    }

    /// Before channel names, in publish order.
    #[must_use]
    pub fn before_channels(&self) -> Vec<String> {
        self.lock().before.iter().map(|c| c.channel.clone()).collect()
    }

    /// After channel names, in publish order.
    #[must_use]
    pub fn after_channels(&self) -> Vec<String> {
        self.lock().after.iter().map(|c| c.channel.clone()).collect()
    }

    pub(crate) fn register(&self, phase: Phase, publisher: Publisher, channel: &str) {
        let entry = AdviceChannel {
            publisher,
            channel: channel.to_owned(),
        };
        let mut channels = self.lock();
        match phase {
            Phase::Before => channels.before.push(entry),
            Phase::After => channels.after.push(entry),
        }
    }

    fn phase(&self, phase: Phase) -> Vec<AdviceChannel> {
        let channels = self.lock();
        match phase {
            Phase::Before => channels.before.clone(),
            Phase::After => channels.after.clone(),
        }
    }

    fn publish(&self, phase: Phase, payload: &Args) -> AdviceResult<()> {
        for entry in self.phase(phase) {
            trace!(
                method = %self.name,
                channel = %entry.channel,
                %phase,
                "Publishing advice"
            );
            entry.publisher.publish(&entry.channel, payload.clone())?;
        }
        Ok(())
    }

    /// Run the advised call: before channels, the original method, then
    /// after channels.
    ///
    /// Each phase publishes to the channels registered when that phase
    /// starts. The advised object is the receiver of the original method and
    /// the last payload value of both phases, whatever `receiver` is passed;
    /// `receiver` is only used once that object has been dropped.
    ///
    /// # Errors
    ///
    /// The first failing advice handler aborts the call with
    /// [`AdviceError::Publish`]; a failing body aborts it with
    /// [`AdviceError::Method`] and skips the after phase.
    pub fn call(&self, receiver: &Value, args: &Args) -> AdviceResult<Value> {
        let target = self.target().unwrap_or_else(|| receiver.clone());
        self.publish(Phase::Before, &args.with(target.clone()))?;

        let returned = (self.original)(&target, args).map_err(|error| {
            match error.downcast::<AdviceError>() {
                Ok(advice) => *advice,
                Err(source) => AdviceError::Method {
                    name: self.name.clone(),
                    source,
                },
            }
        })?;

        let payload: Args = vec![returned.clone(), target].into();
        self.publish(Phase::After, &payload)?;
        Ok(returned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::method;
    use courier_events::{HandlerResult, args};
    use courier_test::Recorder;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn doubler(owner: &Value) -> AdvisedMethod {
        AdvisedMethod::new(
            "double",
            method(|_, args| {
                let n = *args.get::<i32>(0).ok_or("double: expected i32")?;
                Ok(Value::new(n.saturating_mul(2)))
            }),
            owner,
        )
    }

    #[test]
    fn test_call_without_channels() {
        let owner = Value::new("owner");
        let advised = doubler(&owner);
        let out = advised.call(&owner, &args![21_i32]).unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn test_phase_payloads() {
        let publisher = Publisher::new();
        let recorder = Recorder::new();
        recorder.subscribe(&publisher, "before");
        recorder.subscribe(&publisher, "after");

        let owner = Value::new("owner");
        let advised = doubler(&owner);
        advised.register(Phase::Before, publisher.clone(), "before");
        advised.register(Phase::After, publisher.clone(), "after");

        advised.call(&owner, &args![4_i32]).unwrap();

        let calls = recorder.calls();
        assert_eq!(recorder.channels(), vec!["before", "after"]);

        let before = &calls[0].args;
        assert_eq!(before.len(), 2);
        assert_eq!(before.get::<i32>(0), Some(&4));
        assert!(before.value(1).unwrap().ptr_eq(&owner));

        let after = &calls[1].args;
        assert_eq!(after.len(), 2);
        assert_eq!(after.get::<i32>(0), Some(&8));
        assert!(after.value(1).unwrap().ptr_eq(&owner));
    }

    #[test]
    fn test_foreign_receiver_is_replaced_by_the_owner() {
        let publisher = Publisher::new();
        let recorder = Recorder::new();
        recorder.subscribe(&publisher, "before");
        recorder.subscribe(&publisher, "after");

        let owner = Value::new("owner");
        let advised = AdvisedMethod::new("me", method(|receiver, _| Ok(receiver.clone())), &owner);
        advised.register(Phase::Before, publisher.clone(), "before");
        advised.register(Phase::After, publisher.clone(), "after");

        let stranger = Value::new("stranger");
        let returned = advised.call(&stranger, &args![]).unwrap();
        assert!(returned.ptr_eq(&owner));

        for call in recorder.calls() {
            let object = call.args.last().unwrap();
            assert!(object.ptr_eq(&owner));
            assert!(!object.ptr_eq(&stranger));
        }
    }

    #[test]
    fn test_dropped_owner_falls_back_to_receiver() {
        let owner = Value::new("owner");
        let advised = AdvisedMethod::new("me", method(|receiver, _| Ok(receiver.clone())), &owner);
        drop(owner);
        assert!(advised.target().is_none());

        let receiver = Value::new("receiver");
        let returned = advised.call(&receiver, &args![]).unwrap();
        assert!(returned.ptr_eq(&receiver));
    }

    #[test]
    fn test_channels_publish_in_registration_order() {
        let publisher = Publisher::new();
        let recorder = Recorder::new();
        for channel in ["b1", "b2", "a1", "a2"] {
            recorder.subscribe(&publisher, channel);
        }

        let owner = Value::new(());
        let advised = doubler(&owner);
        advised.register(Phase::After, publisher.clone(), "a1");
        advised.register(Phase::Before, publisher.clone(), "b1");
        advised.register(Phase::After, publisher.clone(), "a2");
        advised.register(Phase::Before, publisher.clone(), "b2");

        advised.call(&owner, &args![1_i32]).unwrap();
        assert_eq!(recorder.channels(), vec!["b1", "b2", "a1", "a2"]);
        assert_eq!(advised.before_channels(), vec!["b1", "b2"]);
        assert_eq!(advised.after_channels(), vec!["a1", "a2"]);
    }

    #[test]
    fn test_failing_body_skips_after_phase() {
        let publisher = Publisher::new();
        let recorder = Recorder::new();
        recorder.subscribe(&publisher, "before");
        recorder.subscribe(&publisher, "after");

        let owner = Value::new(());
        let advised = doubler(&owner);
        advised.register(Phase::Before, publisher.clone(), "before");
        advised.register(Phase::After, publisher.clone(), "after");

        let err = advised.call(&owner, &args!["nope"]).unwrap_err();
        assert!(matches!(err, AdviceError::Method { ref name, .. } if name == "double"));
        assert_eq!(recorder.channels(), vec!["before"]);
    }

    #[test]
    fn test_failing_before_handler_skips_body() {
        let publisher = Publisher::new();
        let _veto = publisher.subscribe("before", |_: &Value, _: &Args| -> HandlerResult {
            Err("vetoed".into())
        });

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let owner = Value::new(());
        let advised = AdvisedMethod::new(
            "guarded",
            method(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                Ok(Value::new(()))
            }),
            &owner,
        );
        advised.register(Phase::Before, publisher.clone(), "before");

        let err = advised.call(&owner, &args![]).unwrap_err();
        assert!(matches!(err, AdviceError::Publish(_)));
        assert!(!ran.load(Ordering::SeqCst));
    }
}
