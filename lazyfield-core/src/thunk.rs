//! Module for deferred computations, [`Thunk`].
use std::{fmt::Debug, sync::Arc};

use anyhow::Result;

use crate::{recover::recover, value::Value};

/// The capability of being a deferred value: a callable that takes nothing
/// and produces a value or an error.
///
/// Every matching closure implements it, so resolvers don't need to name
/// [`Thunk`] to return one.
pub trait Deferred: Send + Sync {
    fn call(&self) -> Result<Value>;
}
impl<F> Deferred for F
where
    F: Fn() -> Result<Value> + Send + Sync,
{
    fn call(&self) -> Result<Value> {
        self()
    }
}

/// A bare shared callable. Recognized as deferred when passed as a
/// [`Value::Host`] payload.
pub type DeferredFn = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

type OnValue = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;
type OnError = Arc<dyn Fn(anyhow::Error) -> Result<Value> + Send + Sync>;

/// A pure-by-convention suspended computation.
///
/// Unlike a lazy cell, a `Thunk` remembers nothing: every [`Thunk::force`]
/// runs the computation again, including every step of a chain built with
/// [`Thunk::then`] and [`Thunk::catch`]. Cloning shares the computation.
#[derive(Clone)]
pub struct Thunk {
    deferred: Arc<dyn Deferred>,
}
impl Thunk {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Thunk {
            deferred: Arc::new(f),
        }
    }

    pub fn from_deferred(deferred: Arc<dyn Deferred>) -> Self {
        Thunk { deferred }
    }

    /// A thunk that yields `value` (which may itself be deferred).
    pub fn ready(value: Value) -> Self {
        Thunk::new(move || Ok(value.clone()))
    }

    /// Run the computation and return its final value.
    ///
    /// Panics are turned into errors. If the result is another deferred value,
    /// that is forced as well, until something that is not deferred comes out.
    pub fn force(&self) -> Result<Value> {
        let _span = tracing::trace_span!("force").entered();
        flatten(recover(|| self.deferred.call()))
    }

    /// Continue with `next` once this thunk produced a value.
    /// Errors are passed on without calling `next`.
    pub fn then<F>(&self, next: F) -> Thunk
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.done(Some(Arc::new(next)), None)
    }

    /// Handle an error of this thunk with `next`, which may produce a
    /// replacement value or another error. Values are passed on without
    /// calling `next`.
    pub fn catch<F>(&self, next: F) -> Thunk
    where
        F: Fn(anyhow::Error) -> Result<Value> + Send + Sync + 'static,
    {
        self.done(None, Some(Arc::new(next)))
    }

    fn done(&self, on_value: Option<OnValue>, on_error: Option<OnError>) -> Thunk {
        let this = self.clone();
        Thunk::new(move || {
            let outcome = match (this.force(), &on_value, &on_error) {
                (Ok(value), Some(on_value), _) => recover(|| on_value(value)),
                (Err(err), _, Some(on_error)) => {
                    tracing::debug!(error = %err, "handling error of deferred value");
                    recover(|| on_error(err))
                }
                // no handler for this outcome
                (outcome, _, _) => return outcome,
            };
            flatten(outcome)
        })
    }

    /// Whether both handles share the same computation.
    pub fn ptr_eq(&self, other: &Thunk) -> bool {
        Arc::ptr_eq(&self.deferred, &other.deferred)
    }
}
impl Debug for Thunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thunk(..)")
    }
}

/// Force deferred results until a plain value or an error is reached.
fn flatten(outcome: Result<Value>) -> Result<Value> {
    let mut value = outcome?;
    while let Some(thunk) = get_thunk(&value) {
        value = recover(|| thunk.deferred.call())?;
    }
    Ok(value)
}

/// Determine whether `value` is a deferred computation, and if so, return it
/// as a [`Thunk`].
///
/// Besides [`Value::Deferred`], host payloads that are callables of the right
/// shape qualify: a [`Thunk`], an `Arc<dyn Deferred>`, a [`DeferredFn`], or a
/// plain `fn() -> Result<Value>`.
pub fn get_thunk(value: &Value) -> Option<Thunk> {
    match value {
        Value::Deferred(thunk) => Some(thunk.clone()),
        Value::Host(payload) => {
            if let Some(thunk) = payload.downcast_ref::<Thunk>() {
                Some(thunk.clone())
            } else if let Some(deferred) = payload.downcast_ref::<Arc<dyn Deferred>>() {
                Some(Thunk::from_deferred(deferred.clone()))
            } else if let Some(f) = payload.downcast_ref::<DeferredFn>() {
                let f = f.clone();
                Some(Thunk::new(move || f()))
            } else {
                payload
                    .downcast_ref::<fn() -> Result<Value>>()
                    .map(|f| Thunk::new(*f))
            }
        }
        _ => None,
    }
}
