//! Errors raised by the store's dispatch protocol.

use crate::reducer::ReducerError;
use thiserror::Error;

/// Errors that can occur when building or using a store.
///
/// All of them describe programming defects rather than transient
/// conditions: they are reported immediately and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(
        "Several store enhancers were supplied. This is not supported; compose them into a \
         single enhancer instead"
    )]
    MultipleEnhancers,

    #[error(
        "You may not read the state while the reducer is executing. The reducer has already \
         received the state as an argument"
    )]
    ReadWhileDispatching,

    #[error(
        "You may not subscribe while the reducer is executing. Subscribe from outside and \
         read the state in the listener instead"
    )]
    SubscribeWhileDispatching,

    #[error("You may not unsubscribe from a store listener while the reducer is executing")]
    UnsubscribeWhileDispatching,

    #[error("Reducers may not dispatch actions")]
    DispatchWhileDispatching,

    #[error("Actions must be plain records, got {kind}")]
    NotPlainRecord { kind: &'static str },

    #[error("Actions may not have a missing \"type\" field. Have you misspelled a constant?")]
    MissingActionType,

    #[error(
        "Actions must be plain records. Install a middleware that handles deferred requests \
         before dispatching one"
    )]
    NotPlainRequest,

    #[error(
        "Dispatching while constructing your middleware is not allowed. Other middleware \
         would not be applied to this dispatch"
    )]
    DispatchDuringMiddlewareConstruction,

    #[error("The store behind this handle has been dropped")]
    StoreDropped,

    #[error(transparent)]
    Reducer(#[from] ReducerError),
}
