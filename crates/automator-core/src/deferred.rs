//! Deferred values returned by action handlers
//!
//! A handler either produces its value immediately ([`HandlerResult::Ready`])
//! or hands back a [`Deferred`] that settles later. A Deferred settles at most
//! once, either resolved or rejected, and can have continuations chained on
//! it before it is awaited.

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio::sync::oneshot;

/// Outcome of a settled [`Deferred`]
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Completed successfully
    Resolved(Value),
    /// Completed with a failure
    Rejected(Value),
}

impl Settlement {
    /// Check if the deferred resolved successfully
    pub fn is_resolved(&self) -> bool {
        matches!(self, Settlement::Resolved(_))
    }

    /// Borrow the carried value, whatever the outcome
    pub fn value(&self) -> &Value {
        match self {
            Settlement::Resolved(v) | Settlement::Rejected(v) => v,
        }
    }

    /// Take the carried value, whatever the outcome
    pub fn into_value(self) -> Value {
        match self {
            Settlement::Resolved(v) | Settlement::Rejected(v) => v,
        }
    }
}

impl From<Result<Value, Value>> for Settlement {
    fn from(result: Result<Value, Value>) -> Self {
        match result {
            Ok(v) => Settlement::Resolved(v),
            Err(v) => Settlement::Rejected(v),
        }
    }
}

/// A value that becomes available later
///
/// Awaiting a Deferred yields its [`Settlement`]. `done`, `fail` and `always`
/// register callbacks for the matching outcome; `then` chains a
/// transformation. Each returns a new Deferred that settles with the
/// (possibly transformed) outcome.
#[must_use = "a Deferred does nothing unless it is awaited"]
pub struct Deferred {
    inner: BoxFuture<'static, Settlement>,
}

impl Deferred {
    /// Wrap any future producing a settlement
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Settlement> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// Wrap a fallible future; `Err` rejects
    pub fn from_result<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        Self::new(future.map(Settlement::from))
    }

    /// An already resolved deferred
    pub fn resolved(value: Value) -> Self {
        Self::new(futures::future::ready(Settlement::Resolved(value)))
    }

    /// An already rejected deferred
    pub fn rejected(value: Value) -> Self {
        Self::new(futures::future::ready(Settlement::Rejected(value)))
    }

    /// Create a deferred settled through the returned [`Resolver`]
    ///
    /// If the resolver is dropped without settling, the deferred never
    /// settles.
    pub fn channel() -> (Resolver, Deferred) {
        let (tx, rx) = oneshot::channel();
        let resolver = Resolver::new(move |settlement| {
            // Receiver gone means nobody is waiting any more
            let _ = tx.send(settlement);
        });
        let deferred = Deferred::new(async move {
            match rx.await {
                Ok(settlement) => settlement,
                Err(_) => std::future::pending().await,
            }
        });
        (resolver, deferred)
    }

    /// Chain a transformation of the outcome
    pub fn then<F>(self, f: F) -> Deferred
    where
        F: FnOnce(Settlement) -> Settlement + Send + 'static,
    {
        Deferred::new(self.inner.map(f))
    }

    /// Run `f` with the value if the deferred resolves
    pub fn done<F>(self, f: F) -> Deferred
    where
        F: FnOnce(&Value) + Send + 'static,
    {
        self.then(move |settlement| {
            if let Settlement::Resolved(v) = &settlement {
                f(v);
            }
            settlement
        })
    }

    /// Run `f` with the value if the deferred rejects
    pub fn fail<F>(self, f: F) -> Deferred
    where
        F: FnOnce(&Value) + Send + 'static,
    {
        self.then(move |settlement| {
            if let Settlement::Rejected(v) = &settlement {
                f(v);
            }
            settlement
        })
    }

    /// Run `f` once the deferred settles, whatever the outcome
    pub fn always<F>(self, f: F) -> Deferred
    where
        F: FnOnce(&Settlement) + Send + 'static,
    {
        self.then(move |settlement| {
            f(&settlement);
            settlement
        })
    }
}

impl Future for Deferred {
    type Output = Settlement;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// Settles the [`Deferred`] it was created with
pub struct Resolver {
    settle: Box<dyn FnOnce(Settlement) + Send>,
}

impl Resolver {
    /// Create a resolver from a settle function
    pub fn new<F>(settle: F) -> Self
    where
        F: FnOnce(Settlement) + Send + 'static,
    {
        Self {
            settle: Box::new(settle),
        }
    }

    /// Settle with the given outcome
    pub fn settle(self, settlement: Settlement) {
        (self.settle)(settlement);
    }

    /// Resolve successfully
    pub fn resolve(self, value: Value) {
        self.settle(Settlement::Resolved(value));
    }

    /// Reject
    pub fn reject(self, value: Value) {
        self.settle(Settlement::Rejected(value));
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

/// What a handler hands back to the scheduler
#[derive(Debug)]
pub enum HandlerResult {
    /// Value available now; the sequence continues immediately
    Ready(Value),
    /// Value available later; the sequence waits for it to settle
    Pending(Deferred),
}

impl HandlerResult {
    /// A ready result carrying no value
    pub fn none() -> Self {
        HandlerResult::Ready(Value::Null)
    }

    /// Check if the result still has to settle
    pub fn is_pending(&self) -> bool {
        matches!(self, HandlerResult::Pending(_))
    }
}

impl Default for HandlerResult {
    fn default() -> Self {
        Self::none()
    }
}

impl From<Value> for HandlerResult {
    fn from(value: Value) -> Self {
        HandlerResult::Ready(value)
    }
}

impl From<()> for HandlerResult {
    fn from(_: ()) -> Self {
        HandlerResult::none()
    }
}

impl From<Deferred> for HandlerResult {
    fn from(deferred: Deferred) -> Self {
        HandlerResult::Pending(deferred)
    }
}
