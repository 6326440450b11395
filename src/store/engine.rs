//! The transition engine: state, reducer, listeners and the dispatch protocol.

use super::error::StoreError;
use super::request::{Outcome, Request};
use super::subscription::{Listener, ListenerRegistry, Observable, Subscription};
use crate::core::Action;
use crate::reducer::{Reducer, SharedReducer};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

/// Anything that can take a request through (part of) the dispatch pipeline.
pub(crate) trait DispatchFn<S>: Send + Sync {
    fn dispatch(&self, request: Request<S>) -> Result<Outcome, StoreError>;
}

/// Who may use the engine right now.
///
/// A dispatch owns the engine from the start of its reduce until its last
/// listener returns. Listeners may dispatch again on the owning thread,
/// which nests (`depth`); other threads wait until the owner is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Owned {
        owner: ThreadId,
        depth: usize,
        reducing: bool,
    },
}

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    callback: Listener,
}

struct Inner<S> {
    state: Arc<S>,
    reducer: SharedReducer<S>,
    // Copy-on-write: a dispatch notifies from a clone of this Arc, so
    // subscribing mid-notification never alters the pass in flight.
    listeners: Arc<Vec<ListenerEntry>>,
    next_listener_id: u64,
    phase: Phase,
}

pub(crate) struct Core<S> {
    inner: Mutex<Inner<S>>,
    idle: Condvar,
}

/// Releases one level of ownership on every exit path of a dispatch,
/// unwinding included.
struct OwnershipGuard<'a, S> {
    core: &'a Core<S>,
}

impl<S> Drop for OwnershipGuard<'_, S> {
    fn drop(&mut self) {
        let mut inner = self.core.lock();
        inner.phase = match inner.phase {
            Phase::Owned { owner, depth, .. } if depth > 1 => Phase::Owned {
                owner,
                depth: depth - 1,
                reducing: false,
            },
            _ => Phase::Idle,
        };
        if inner.phase == Phase::Idle {
            self.core.idle.notify_all();
        }
    }
}

impl<S> Core<S> {
    // User code never runs under this lock, so a poisoned lock still holds
    // consistent data.
    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock once the calling thread may use the engine.
    ///
    /// Other threads wait until the running dispatch and its listeners are
    /// done. The owning thread may proceed from a listener but gets
    /// `reentrant` back while its reducer runs.
    fn lock_available(
        &self,
        reentrant: StoreError,
    ) -> Result<MutexGuard<'_, Inner<S>>, StoreError> {
        let current = thread::current().id();
        let mut inner = self.lock();
        loop {
            match inner.phase {
                Phase::Idle => return Ok(inner),
                Phase::Owned {
                    owner, reducing, ..
                } if owner == current => {
                    return if reducing { Err(reentrant) } else { Ok(inner) };
                }
                Phase::Owned { .. } => {
                    inner = self
                        .idle
                        .wait(inner)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

impl<S: Send + Sync + 'static> Core<S> {
    fn create(
        reducer: SharedReducer<S>,
        preloaded: Option<Arc<S>>,
    ) -> Result<Arc<Self>, StoreError> {
        // Nothing can observe the store before it exists, so the init
        // dispatch reduces directly.
        let state = reducer.reduce(preloaded, &Action::init())?;
        Ok(Arc::new(Self {
            inner: Mutex::new(Inner {
                state,
                reducer,
                listeners: Arc::new(Vec::new()),
                next_listener_id: 0,
                phase: Phase::Idle,
            }),
            idle: Condvar::new(),
        }))
    }

    pub(crate) fn read(&self) -> Result<Arc<S>, StoreError> {
        let inner = self.lock_available(StoreError::ReadWhileDispatching)?;
        Ok(Arc::clone(&inner.state))
    }

    pub(crate) fn subscribe(core: &Arc<Self>, callback: Listener) -> Result<Subscription, StoreError> {
        let id = {
            let mut inner = core.lock_available(StoreError::SubscribeWhileDispatching)?;
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            Arc::make_mut(&mut inner.listeners).push(ListenerEntry { id, callback });
            id
        };

        let weak: Weak<Self> = Arc::downgrade(core);
        let registry: Weak<dyn ListenerRegistry> = weak;
        Ok(Subscription::new(registry, id))
    }

    fn dispatch(&self, action: Action) -> Result<Action, StoreError> {
        self.run_dispatch(action, None)
    }

    /// Reduce `action` and notify listeners, all within one ownership window.
    ///
    /// A `replacement` reducer is swapped in inside the same window, so no
    /// other thread's action reaches it before `action` does.
    fn run_dispatch(
        &self,
        action: Action,
        replacement: Option<SharedReducer<S>>,
    ) -> Result<Action, StoreError> {
        let (reducer, state) = {
            let mut inner = self.lock_available(StoreError::DispatchWhileDispatching)?;
            inner.phase = match inner.phase {
                Phase::Owned { owner, depth, .. } => Phase::Owned {
                    owner,
                    depth: depth + 1,
                    reducing: true,
                },
                Phase::Idle => Phase::Owned {
                    owner: thread::current().id(),
                    depth: 1,
                    reducing: true,
                },
            };
            if let Some(reducer) = replacement {
                inner.reducer = reducer;
            }
            (Arc::clone(&inner.reducer), Arc::clone(&inner.state))
        };
        let _owned = OwnershipGuard { core: self };

        tracing::trace!(action_type = action.action_type(), "dispatching action");

        let next = reducer.reduce(Some(state), &action)?;
        let listeners = {
            let mut inner = self.lock();
            inner.state = next;
            if let Phase::Owned { reducing, .. } = &mut inner.phase {
                *reducing = false;
            }
            Arc::clone(&inner.listeners)
        };

        for listener in listeners.iter() {
            (listener.callback)();
        }

        Ok(action)
    }

    fn replace_reducer(&self, reducer: SharedReducer<S>) -> Result<(), StoreError> {
        tracing::debug!("replacing reducer, recomputing state");
        self.run_dispatch(Action::replace(), Some(reducer)).map(|_| ())
    }
}

impl<S: Send + Sync + 'static> ListenerRegistry for Core<S> {
    fn remove_listener(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.lock_available(StoreError::UnsubscribeWhileDispatching)?;
        Arc::make_mut(&mut inner.listeners).retain(|entry| entry.id != id);
        Ok(())
    }
}

/// Terminal stage of every pipeline: hands plain actions to the engine.
struct CoreDispatch<S> {
    core: Arc<Core<S>>,
}

impl<S: Send + Sync + 'static> DispatchFn<S> for CoreDispatch<S> {
    fn dispatch(&self, request: Request<S>) -> Result<Outcome, StoreError> {
        match request {
            Request::Plain(action) => self.core.dispatch(action).map(Outcome::Action),
            Request::Deferred(_) => Err(StoreError::NotPlainRequest),
        }
    }
}

/// Handle to a store holding a single state value.
///
/// The state changes only when an action is dispatched: the reducer
/// computes the next state from the current one, the store keeps it, and
/// every subscribed listener is then called in subscription order.
///
/// `Store` is a cheap, cloneable handle; clones share the same state.
///
/// # Threads
///
/// A dispatch owns the store until its last listener returns. Calls from
/// other threads wait for it, so listener passes never overlap. Listeners
/// may read and dispatch again on the dispatching thread. Calls made by a
/// reducer into its own store are rejected.
///
/// # Blocking
///
/// Never block a reducer or listener on another thread that uses the same
/// store. That thread waits for the running dispatch, which waits for it,
/// and neither returns. Hand the work off and let it finish after the
/// dispatch instead.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::reducer::with_default;
/// use cairn::store::Store;
///
/// let store = Store::new(
///     with_default(|| 0_i64, |count: &i64, action: &Action| action.is("INC").then(|| count + 1)),
///     None,
/// )
/// .unwrap();
///
/// assert_eq!(*store.read().unwrap(), 0);
/// store.dispatch(Action::new("INC")).unwrap();
/// assert_eq!(*store.read().unwrap(), 1);
/// ```
pub struct Store<S> {
    core: Arc<Core<S>>,
    dispatch: Arc<dyn DispatchFn<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl<S: Send + Sync + 'static> Store<S> {
    /// Create a store and initialise its state.
    ///
    /// The reducer is immediately run with the store's private init action
    /// and either the preloaded state or no state at all.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Reducer`] if the reducer fails on init.
    pub fn new<R>(reducer: R, preloaded: Option<S>) -> Result<Self, StoreError>
    where
        R: Reducer<S> + 'static,
    {
        Self::from_shared(Arc::new(reducer), preloaded.map(Arc::new))
    }

    pub(crate) fn from_shared(
        reducer: SharedReducer<S>,
        preloaded: Option<Arc<S>>,
    ) -> Result<Self, StoreError> {
        let core = Core::create(reducer, preloaded)?;
        let dispatch: Arc<dyn DispatchFn<S>> = Arc::new(CoreDispatch {
            core: Arc::clone(&core),
        });
        Ok(Self { core, dispatch })
    }

    /// Same store, different entry point for dispatch.
    pub(crate) fn with_dispatch(&self, dispatch: Arc<dyn DispatchFn<S>>) -> Self {
        Self {
            core: Arc::clone(&self.core),
            dispatch,
        }
    }

    /// Read the current state.
    ///
    /// # Errors
    ///
    /// [`StoreError::ReadWhileDispatching`] when called from inside the reducer.
    /// Other threads wait until the running dispatch has notified its listeners.
    pub fn read(&self) -> Result<Arc<S>, StoreError> {
        self.core.read()
    }

    /// Register a listener called after every dispatch.
    ///
    /// A listener added while listeners are being notified is first called
    /// on the next dispatch. It may read the state and dispatch again; a
    /// nested dispatch notifies everyone before the outer pass continues.
    ///
    /// # Errors
    ///
    /// [`StoreError::SubscribeWhileDispatching`] when called from inside the reducer.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription, StoreError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Core::subscribe(&self.core, Arc::new(listener))
    }

    /// Dispatch a request through the pipeline.
    ///
    /// Without middleware only plain actions are accepted, and the result
    /// is the dispatched action itself.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DispatchWhileDispatching`] when called from inside the reducer
    /// - [`StoreError::NotPlainRequest`] for a deferred request no middleware handled
    /// - [`StoreError::Reducer`] if the reducer breaks its contract; the state is
    ///   left unchanged
    pub fn dispatch(&self, request: impl Into<Request<S>>) -> Result<Outcome, StoreError> {
        self.dispatch.dispatch(request.into())
    }

    /// Validate an untyped value as an action and dispatch it.
    pub fn dispatch_json(&self, value: Value) -> Result<Outcome, StoreError> {
        self.dispatch(Action::from_json(value)?)
    }

    /// Swap the reducer, then dispatch the private replace action.
    ///
    /// The replace action goes straight to the engine, not through
    /// middleware, and notifies listeners like any other dispatch. The swap
    /// and the replace action happen under one dispatch, so the new reducer
    /// always sees the replace action first.
    pub fn replace_reducer<R>(&self, reducer: R) -> Result<(), StoreError>
    where
        R: Reducer<S> + 'static,
    {
        self.core.replace_reducer(Arc::new(reducer))
    }

    /// Observable view of the state for reactive consumers.
    pub fn observable(&self) -> Observable<S> {
        Observable::new(Arc::clone(&self.core))
    }

    /// A handle that can only read the state.
    pub fn reader(&self) -> StateReader<S> {
        StateReader {
            core: Arc::clone(&self.core),
        }
    }

    /// A handle that can only dispatch, through the full pipeline.
    pub fn dispatcher(&self) -> Dispatcher<S> {
        Dispatcher {
            target: Arc::clone(&self.dispatch),
        }
    }

    /// A handle that does not keep the store alive, e.g. for listeners.
    pub fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            core: Arc::downgrade(&self.core),
            dispatch: Arc::downgrade(&self.dispatch),
        }
    }
}

/// Read-only access to a store's state.
pub struct StateReader<S> {
    core: Arc<Core<S>>,
}

impl<S> Clone for StateReader<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<S: Send + Sync + 'static> StateReader<S> {
    pub fn read(&self) -> Result<Arc<S>, StoreError> {
        self.core.read()
    }
}

/// Dispatch-only access to a store's pipeline.
pub struct Dispatcher<S> {
    target: Arc<dyn DispatchFn<S>>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<S: Send + Sync + 'static> Dispatcher<S> {
    pub(crate) fn new(target: Arc<dyn DispatchFn<S>>) -> Self {
        Self { target }
    }

    pub fn dispatch(&self, request: impl Into<Request<S>>) -> Result<Outcome, StoreError> {
        self.target.dispatch(request.into())
    }
}

/// A store handle that does not keep the store alive.
pub struct WeakStore<S> {
    core: Weak<Core<S>>,
    dispatch: Weak<dyn DispatchFn<S>>,
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
            dispatch: Weak::clone(&self.dispatch),
        }
    }
}

impl<S: Send + Sync + 'static> WeakStore<S> {
    /// Recover a full handle if the store is still alive.
    pub fn upgrade(&self) -> Option<Store<S>> {
        Some(Store {
            core: self.core.upgrade()?,
            dispatch: self.dispatch.upgrade()?,
        })
    }
}
