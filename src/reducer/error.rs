//! Reducer contract violations.

use thiserror::Error;

/// Errors raised when a reducer breaks its contract.
///
/// A reducer must always produce a state: the initial state when it is
/// given none, and the previous state for actions it does not handle.
#[derive(Debug, Error)]
pub enum ReducerError {
    #[error(
        "Reducer returned no state for action \"{action_type}\". To ignore an action, \
         return the previous state"
    )]
    ReturnedNone { action_type: String },

    #[error(
        "Given action \"{action_type}\", reducer \"{key}\" returned no state. To ignore an \
         action, you must explicitly return the previous state"
    )]
    UndefinedSlice { key: String, action_type: String },

    #[error(
        "Reducer \"{key}\" returned no state during initialization. If the state passed to \
         the reducer is absent, you must explicitly return the initial state"
    )]
    UndefinedDuringInit { key: String },

    #[error(
        "Reducer \"{key}\" returned no state when probed with a random type. Don't try to \
         handle the store's private action types; return the current state for any unknown \
         action, or the initial state if there is none"
    )]
    UndefinedOnProbe { key: String },

    #[error("State slice \"{key}\" does not hold a value of type {expected}")]
    SliceTypeMismatch { key: String, expected: &'static str },
}
