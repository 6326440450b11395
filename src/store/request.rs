//! What can be dispatched, and what a dispatch gives back.

use super::engine::{Dispatcher, StateReader};
use super::error::StoreError;
use crate::core::Action;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type alias for the body of a deferred request.
type DeferredFn<S> =
    Box<dyn FnOnce(&Dispatcher<S>, &StateReader<S>, &Extra) -> Result<Outcome, StoreError> + Send>;

/// A request entering the dispatch pipeline.
///
/// The core store only accepts [`Request::Plain`]. A [`Request::Deferred`]
/// must be handled by a middleware such as
/// [`Thunk`](crate::middleware::thunk::Thunk) before it reaches the core.
pub enum Request<S> {
    /// A plain action, reduced by the store.
    Plain(Action),
    /// A computation given access to dispatch and read instead of data.
    Deferred(Deferred<S>),
}

impl<S> Request<S> {
    /// Wrap a computation as a deferred request.
    ///
    /// The computation receives the full dispatch pipeline, a state reader,
    /// and the extra context bound by the middleware that runs it.
    pub fn deferred<F>(computation: F) -> Self
    where
        F: FnOnce(&Dispatcher<S>, &StateReader<S>, &Extra) -> Result<Outcome, StoreError>
            + Send
            + 'static,
    {
        Self::Deferred(Deferred {
            run: Box::new(computation),
        })
    }

    /// The action type of a plain request.
    pub fn action_type(&self) -> Option<&str> {
        match self {
            Self::Plain(action) => Some(action.action_type()),
            Self::Deferred(_) => None,
        }
    }
}

impl<S> From<Action> for Request<S> {
    fn from(action: Action) -> Self {
        Self::Plain(action)
    }
}

impl<S> fmt::Debug for Request<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(action) => f.debug_tuple("Plain").field(action).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A deferred computation, run at most once.
pub struct Deferred<S> {
    run: DeferredFn<S>,
}

impl<S> Deferred<S> {
    /// Run the computation.
    pub fn run(
        self,
        dispatcher: &Dispatcher<S>,
        reader: &StateReader<S>,
        extra: &Extra,
    ) -> Result<Outcome, StoreError> {
        (self.run)(dispatcher, reader, extra)
    }
}

/// The value handed back by a dispatch.
///
/// A plain dispatch that reaches the store returns the action itself.
/// Middleware and deferred computations may return something else: a JSON
/// value, nothing, or any typed value through [`Outcome::other`].
///
/// Typed values compare equal only when they are the same allocation.
#[derive(Clone)]
pub enum Outcome {
    Action(Action),
    Value(Value),
    Other(Arc<dyn Any + Send + Sync>),
    Empty,
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Other(_) => f.write_str("Other(..)"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl PartialEq for Outcome {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Action(a), Self::Action(b)) => a == b,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Other(a), Self::Other(b)) => Arc::ptr_eq(a, b),
            (Self::Empty, Self::Empty) => true,
            _ => false,
        }
    }
}

impl Outcome {
    pub fn action(&self) -> Option<&Action> {
        match self {
            Self::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn into_action(self) -> Option<Action> {
        match self {
            Self::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Wrap a typed result, e.g. the record a deferred fetch produced.
    pub fn other<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Other(Arc::new(value))
    }

    /// Borrow a typed result as `T`, if that is its type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Other(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take a typed result out as a shared `T`, if that is its type.
    pub fn downcast<T: Send + Sync + 'static>(self) -> Option<Arc<T>> {
        match self {
            Self::Other(value) => value.downcast::<T>().ok(),
            _ => None,
        }
    }
}

/// Context bound once when a deferred-request middleware is created and
/// handed to every deferred computation it runs.
#[derive(Clone)]
pub struct Extra {
    value: Arc<dyn Any + Send + Sync>,
}

impl Extra {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Context carrying nothing (`()`).
    pub fn none() -> Self {
        Self::new(())
    }

    /// Borrow the context as `T`, if that is its type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl Default for Extra {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Extra(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_converts_into_plain_request() {
        let request: Request<()> = Action::new("PING").into();

        assert_eq!(request.action_type(), Some("PING"));
        assert!(matches!(request, Request::Plain(_)));
    }

    #[test]
    fn deferred_request_has_no_type() {
        let request: Request<()> = Request::deferred(|_, _, _| Ok(Outcome::Empty));

        assert_eq!(request.action_type(), None);
        assert_eq!(format!("{request:?}"), "Deferred(..)");
    }

    #[test]
    fn outcome_accessors() {
        let outcome = Outcome::Action(Action::new("PING"));
        assert_eq!(outcome.action().map(Action::action_type), Some("PING"));
        assert!(outcome.value().is_none());
        assert!(outcome.into_action().is_some());

        let outcome = Outcome::Value(serde_json::json!(7));
        assert_eq!(outcome.value(), Some(&serde_json::json!(7)));
        assert!(outcome.action().is_none());
    }

    #[test]
    fn typed_outcome_downcasts_and_compares_by_identity() {
        #[derive(Debug, PartialEq)]
        struct Page {
            items: Vec<u32>,
        }

        let outcome = Outcome::other(Page { items: vec![1, 2] });
        assert_eq!(
            outcome.downcast_ref::<Page>(),
            Some(&Page { items: vec![1, 2] })
        );
        assert!(outcome.downcast_ref::<String>().is_none());
        assert!(outcome.value().is_none());
        assert_eq!(format!("{outcome:?}"), "Other(..)");

        assert_eq!(outcome.clone(), outcome);
        assert_ne!(outcome, Outcome::other(Page { items: vec![1, 2] }));

        let page = outcome.downcast::<Page>().unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert!(Outcome::Empty.downcast::<Page>().is_none());
    }

    #[test]
    fn extra_downcasts_to_bound_type() {
        let extra = Extra::new("api-client".to_string());

        assert_eq!(extra.get::<String>().map(String::as_str), Some("api-client"));
        assert!(extra.get::<u32>().is_none());
        assert!(Extra::none().get::<()>().is_some());
    }
}
