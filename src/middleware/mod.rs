//! Middleware: ordered interceptors in front of the store's dispatch.
//!
//! Each middleware sees a request before the store does. It may inspect
//! it, rewrite it, answer it without passing it on, or hand it to the next
//! stage via [`Next::run`]. The store's own dispatch is the last stage.
//!
//! Middleware is installed with the [`apply_middleware`] enhancer.
//! Through [`MiddlewareApi`] a middleware can read the state and dispatch
//! new requests, which then travel through the whole chain again.
//!
//! # Example
//!
//! ```rust
//! use cairn::core::Action;
//! use cairn::middleware::{apply_middleware, middleware_fn, MiddlewareApi};
//! use cairn::reducer::with_default;
//! use cairn::store::StoreBuilder;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&seen);
//! let logger = middleware_fn(move |_api: &MiddlewareApi<i64>, request, next| {
//!     if let Some(action_type) = request.action_type() {
//!         log.lock().unwrap().push(action_type.to_string());
//!     }
//!     next.run(request)
//! });
//!
//! let store = StoreBuilder::new(with_default(|| 0_i64, |n: &i64, a: &Action| {
//!         a.is("INC").then(|| n + 1)
//!     }))
//!     .enhancer(apply_middleware(vec![logger]))
//!     .build()
//!     .unwrap();
//!
//! store.dispatch(Action::new("INC")).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec!["INC"]);
//! ```

pub mod thunk;

use crate::reducer::SharedReducer;
use crate::store::{
    DispatchFn, Dispatcher, Enhancer, Outcome, Request, StateReader, Store, StoreCreator,
    StoreError,
};
use std::sync::{Arc, OnceLock, Weak};

/// An interceptor placed in front of the store's dispatch.
pub trait Middleware<S>: Send + Sync {
    /// Called once while the chain is being built.
    ///
    /// Dispatching from here fails with
    /// [`StoreError::DispatchDuringMiddlewareConstruction`], since the
    /// request would bypass every middleware.
    fn setup(&self, _api: &MiddlewareApi<S>) -> Result<(), StoreError> {
        Ok(())
    }

    /// Handle one request. Call `next.run(request)` to pass it on.
    fn handle(
        &self,
        api: &MiddlewareApi<S>,
        request: Request<S>,
        next: Next<'_, S>,
    ) -> Result<Outcome, StoreError>;
}

/// A middleware shared by every store its enhancer creates.
pub type SharedMiddleware<S> = Arc<dyn Middleware<S>>;

struct FnMiddleware<F> {
    handle: F,
}

impl<S, F> Middleware<S> for FnMiddleware<F>
where
    F: for<'a> Fn(&MiddlewareApi<S>, Request<S>, Next<'a, S>) -> Result<Outcome, StoreError>
        + Send
        + Sync,
{
    fn handle(
        &self,
        api: &MiddlewareApi<S>,
        request: Request<S>,
        next: Next<'_, S>,
    ) -> Result<Outcome, StoreError> {
        (self.handle)(api, request, next)
    }
}

/// Build a middleware from a closure.
pub fn middleware_fn<S, F>(handle: F) -> SharedMiddleware<S>
where
    S: Send + Sync + 'static,
    F: for<'a> Fn(&MiddlewareApi<S>, Request<S>, Next<'a, S>) -> Result<Outcome, StoreError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware { handle })
}

/// What a middleware can do with the store besides passing requests on.
pub struct MiddlewareApi<S> {
    reader: StateReader<S>,
    dispatcher: Dispatcher<S>,
}

impl<S: Send + Sync + 'static> MiddlewareApi<S> {
    /// Read the current state.
    pub fn read(&self) -> Result<Arc<S>, StoreError> {
        self.reader.read()
    }

    /// Dispatch from the top of the chain, through every middleware.
    pub fn dispatch(&self, request: impl Into<Request<S>>) -> Result<Outcome, StoreError> {
        self.dispatcher.dispatch(request)
    }

    pub fn reader(&self) -> &StateReader<S> {
        &self.reader
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }
}

/// The rest of the chain after the current middleware.
pub struct Next<'a, S> {
    chain: &'a Chain<S>,
    index: usize,
}

impl<S: Send + Sync + 'static> Next<'_, S> {
    /// Pass the request to the next middleware, or to the store if none is left.
    pub fn run(self, request: Request<S>) -> Result<Outcome, StoreError> {
        match self.chain.stages.get(self.index) {
            Some(stage) => stage.handle(
                &self.chain.api,
                request,
                Next {
                    chain: self.chain,
                    index: self.index + 1,
                },
            ),
            None => self.chain.terminal.dispatch(request),
        }
    }
}

struct Chain<S> {
    stages: Vec<SharedMiddleware<S>>,
    api: MiddlewareApi<S>,
    terminal: Store<S>,
}

impl<S: Send + Sync + 'static> DispatchFn<S> for Chain<S> {
    fn dispatch(&self, request: Request<S>) -> Result<Outcome, StoreError> {
        Next {
            chain: self,
            index: 0,
        }
        .run(request)
    }
}

/// Stand-in for the chain's entry point until the chain exists.
struct Forward<S> {
    chain: OnceLock<Weak<Chain<S>>>,
}

impl<S: Send + Sync + 'static> DispatchFn<S> for Forward<S> {
    fn dispatch(&self, request: Request<S>) -> Result<Outcome, StoreError> {
        let chain = self
            .chain
            .get()
            .ok_or(StoreError::DispatchDuringMiddlewareConstruction)?
            .upgrade()
            .ok_or(StoreError::StoreDropped)?;
        chain.dispatch(request)
    }
}

/// Enhancer that puts `middlewares` in front of the store's dispatch.
///
/// The first middleware in the list sees each request first. Only
/// `dispatch` changes; reading, subscribing and replacing the reducer go
/// straight to the underlying store.
pub fn apply_middleware<S>(middlewares: Vec<SharedMiddleware<S>>) -> Enhancer<S>
where
    S: Send + Sync + 'static,
{
    Arc::new(move |create: StoreCreator<S>| {
        let middlewares = middlewares.clone();
        let creator: StoreCreator<S> = Arc::new(
            move |reducer: SharedReducer<S>,
                  preloaded: Option<Arc<S>>|
                  -> Result<Store<S>, StoreError> {
                let store = create(reducer, preloaded)?;

                let forward = Arc::new(Forward {
                    chain: OnceLock::new(),
                });
                let entry: Arc<dyn DispatchFn<S>> = forward.clone();
                let api = MiddlewareApi {
                    reader: store.reader(),
                    dispatcher: Dispatcher::new(entry),
                };

                for middleware in &middlewares {
                    middleware.setup(&api)?;
                }

                let chain = Arc::new(Chain {
                    stages: middlewares.clone(),
                    api,
                    terminal: store.clone(),
                });
                // The slot is filled exactly once, here.
                let _ = forward.chain.set(Arc::downgrade(&chain));
                tracing::debug!(stages = chain.stages.len(), "middleware installed");

                Ok(store.with_dispatch(chain))
            },
        );
        creator
    })
}
