//! Handlers and the bindings that tie them to a receiver.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::value::{Args, Value};

/// Outcome of one handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

/// A type-erased handler.
///
/// The first argument is the receiver (the binding's context), the second
/// the arguments passed to `publish`.
pub type Handler = Arc<dyn Fn(&Value, &Args) -> HandlerResult + Send + Sync>;

/// Return types accepted from handler closures.
///
/// Lets infallible handlers return `()` while fallible ones return a
/// `Result`.
pub trait IntoHandlerResult {
    /// Convert into a [`HandlerResult`].
    ///
    /// # Errors
    ///
    /// Returns the handler's own error unchanged.
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E: Into<HandlerError>> IntoHandlerResult for Result<(), E> {
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// Erase a handler closure into a [`Handler`].
///
/// Needed where closures of different types must share one collection, as
/// with [`Publisher::subscribe_many`](crate::Publisher::subscribe_many).
pub fn handler<F, R>(func: F) -> Handler
where
    F: Fn(&Value, &Args) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    Arc::new(move |receiver: &Value, args: &Args| func(receiver, args).into_handler_result())
}

/// Identifier of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One registered (handler, context) pair.
///
/// Bindings are compared by identity: two bindings built from the same
/// handler and context are still distinct entries.
pub struct Binding {
    id: SubscriptionId,
    handler: Handler,
    context: Value,
}

impl Binding {
    pub(crate) fn new(handler: Handler, context: Value) -> Self {
        Self {
            id: SubscriptionId::new(),
            handler,
            context,
        }
    }

    /// The subscription this binding belongs to.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The receiver handed to the handler.
    #[must_use]
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Invoke the handler with this binding's context as receiver.
    ///
    /// # Errors
    ///
    /// Returns whatever error the handler returns.
    pub fn invoke(&self, args: &Args) -> HandlerResult {
        (self.handler)(&self.context, args)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
