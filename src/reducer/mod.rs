//! Reducers: pure functions from previous state and action to next state.
//!
//! A reducer is total. Given no state it returns the initial state; given
//! an action it does not recognise it returns the previous state
//! unchanged (the same `Arc`). Several reducers that each own one field
//! of a compound state are combined with [`ReducerMap`].

mod combine;
pub mod error;
mod record;

pub use combine::{combine_reducers, CombinedReducer, ReducerMap};
pub use error::ReducerError;
pub use record::{Record, Slice};

use crate::core::Action;
use std::sync::Arc;

/// Computes the next state from the previous state and an action.
///
/// Closures of the form `Fn(Option<Arc<S>>, &Action) -> Option<Arc<S>>`
/// implement this trait; returning `None` is a contract violation that
/// surfaces as [`ReducerError::ReturnedNone`].
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::reducer::Reducer;
/// use std::sync::Arc;
///
/// let counter = |state: Option<Arc<i64>>, action: &Action| {
///     let count = state.unwrap_or_else(|| Arc::new(0));
///     match action.action_type() {
///         "INC" => Some(Arc::new(*count + 1)),
///         _ => Some(count),
///     }
/// };
///
/// let initial = counter.reduce(None, &Action::new("UNKNOWN")).unwrap();
/// let next = counter.reduce(Some(initial), &Action::new("INC")).unwrap();
/// assert_eq!(*next, 1);
/// ```
pub trait Reducer<S>: Send + Sync {
    /// Reduce one action.
    ///
    /// `state` is `None` only before the state has been initialised.
    fn reduce(&self, state: Option<Arc<S>>, action: &Action) -> Result<Arc<S>, ReducerError>;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(Option<Arc<S>>, &Action) -> Option<Arc<S>> + Send + Sync,
{
    fn reduce(&self, state: Option<Arc<S>>, action: &Action) -> Result<Arc<S>, ReducerError> {
        self(state, action).ok_or_else(|| ReducerError::ReturnedNone {
            action_type: action.action_type().to_string(),
        })
    }
}

/// A reducer shared between the store and anything that replaces it.
pub type SharedReducer<S> = Arc<dyn Reducer<S>>;

/// Build a reducer from an initial-state constructor and a step function.
///
/// `step` returns `Some(next)` for actions it handles and `None` to keep
/// the previous state, which is then returned with its identity intact.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::reducer::{with_default, Reducer};
/// use std::sync::Arc;
///
/// let counter = with_default(|| 0_i64, |count: &i64, action: &Action| {
///     action.is("INC").then(|| count + 1)
/// });
///
/// let initial = counter.reduce(None, &Action::new("NOOP")).unwrap();
/// let same = counter.reduce(Some(Arc::clone(&initial)), &Action::new("NOOP")).unwrap();
/// assert!(Arc::ptr_eq(&initial, &same));
/// ```
pub fn with_default<S, I, F>(initial: I, step: F) -> impl Reducer<S>
where
    S: Send + Sync + 'static,
    I: Fn() -> S + Send + Sync,
    F: Fn(&S, &Action) -> Option<S> + Send + Sync,
{
    move |state: Option<Arc<S>>, action: &Action| {
        let state = state.unwrap_or_else(|| Arc::new(initial()));
        Some(match step(&state, action) {
            Some(next) => Arc::new(next),
            None => state,
        })
    }
}
