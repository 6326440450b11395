//! Middleware that runs deferred requests instead of passing them on.
//!
//! A [`Request::Deferred`] carries a computation rather than an action.
//! [`Thunk`] calls it with the chain's dispatcher, a state reader and the
//! extra context given at construction, and returns whatever it returns.
//! Plain actions pass through untouched.
//!
//! # Example
//!
//! ```rust
//! use cairn::core::Action;
//! use cairn::middleware::{apply_middleware, thunk::thunk_with_extra};
//! use cairn::reducer::with_default;
//! use cairn::store::{Outcome, Request, StoreBuilder};
//!
//! let store = StoreBuilder::new(with_default(|| 0_i64, |n: &i64, a: &Action| {
//!         a.get("by").and_then(|by| by.as_i64()).map(|by| n + by)
//!     }))
//!     .enhancer(apply_middleware(vec![thunk_with_extra(3_i64)]))
//!     .build()
//!     .unwrap();
//!
//! let add_step = Request::<i64>::deferred(|dispatch, _read, extra| {
//!     let step = extra.get::<i64>().copied().unwrap_or(1);
//!     dispatch.dispatch(Action::new("ADD").with("by", step))?;
//!     Ok(Outcome::Value(serde_json::json!(step)))
//! });
//!
//! assert_eq!(store.dispatch(add_step).unwrap(), Outcome::Value(serde_json::json!(3)));
//! assert_eq!(*store.read().unwrap(), 3);
//! ```

use super::{Middleware, MiddlewareApi, Next, SharedMiddleware};
use crate::store::{Extra, Outcome, Request, StoreError};
use std::sync::Arc;

/// Runs deferred requests; forwards everything else.
#[derive(Clone, Debug, Default)]
pub struct Thunk {
    extra: Extra,
}

impl Thunk {
    pub fn new(extra: Extra) -> Self {
        Self { extra }
    }

    /// The context handed to every deferred computation.
    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}

impl<S: Send + Sync + 'static> Middleware<S> for Thunk {
    fn handle(
        &self,
        api: &MiddlewareApi<S>,
        request: Request<S>,
        next: Next<'_, S>,
    ) -> Result<Outcome, StoreError> {
        match request {
            Request::Deferred(deferred) => {
                tracing::trace!("running deferred request");
                deferred.run(api.dispatcher(), api.reader(), &self.extra)
            }
            plain => next.run(plain),
        }
    }
}

/// The deferred-request middleware with no extra context.
pub fn thunk<S: Send + Sync + 'static>() -> SharedMiddleware<S> {
    Arc::new(Thunk::default())
}

/// The deferred-request middleware, handing `extra` to every computation.
pub fn thunk_with_extra<S, T>(extra: T) -> SharedMiddleware<S>
where
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    Arc::new(Thunk::new(Extra::new(extra)))
}
