//! Listener registration handles and the observable adapter.

use super::engine::Core;
use super::error::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A change listener. Called with no arguments after every dispatch.
pub(crate) type Listener = Arc<dyn Fn() + Send + Sync>;

/// Something listeners can be removed from.
pub(crate) trait ListenerRegistry: Send + Sync {
    fn remove_listener(&self, id: u64) -> Result<(), StoreError>;
}

/// Handle returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Dropping the handle does not unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe) explicitly.
pub struct Subscription {
    registry: Weak<dyn ListenerRegistry>,
    id: u64,
    active: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(registry: Weak<dyn ListenerRegistry>, id: u64) -> Self {
        Self {
            registry,
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Stop calling the listener on future dispatches.
    ///
    /// Calling this more than once is a no-op. A dispatch whose listeners
    /// are already being notified still calls this listener.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnsubscribeWhileDispatching`] when called from inside the
    /// reducer. The listener stays registered.
    pub fn unsubscribe(&self) -> Result<(), StoreError> {
        if !self.active.load(Ordering::Acquire) {
            return Ok(());
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.remove_listener(self.id)?;
        }
        self.active.store(false, Ordering::Release);
        Ok(())
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Receives state values from an [`Observable`].
pub trait Observer<S>: Send + Sync {
    fn next(&self, state: Arc<S>);
}

impl<S, F> Observer<S> for F
where
    F: Fn(Arc<S>) + Send + Sync,
{
    fn next(&self, state: Arc<S>) {
        self(state)
    }
}

/// Minimal observable over a store's state, for reactive libraries.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::reducer::with_default;
/// use cairn::store::Store;
/// use std::sync::{Arc, Mutex};
///
/// let store = Store::new(
///     with_default(|| 0_i64, |n: &i64, a: &Action| a.is("INC").then(|| n + 1)),
///     None,
/// )
/// .unwrap();
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let subscription = store
///     .observable()
///     .subscribe(move |state: Arc<i64>| sink.lock().unwrap().push(*state))
///     .unwrap();
///
/// store.dispatch(Action::new("INC")).unwrap();
/// subscription.unsubscribe().unwrap();
/// store.dispatch(Action::new("INC")).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
/// ```
pub struct Observable<S> {
    core: Arc<Core<S>>,
}

impl<S: Send + Sync + 'static> Observable<S> {
    pub(crate) fn new(core: Arc<Core<S>>) -> Self {
        Self { core }
    }

    /// Deliver the current state now, then again after every dispatch,
    /// until the returned subscription is cancelled.
    pub fn subscribe<O>(&self, observer: O) -> Result<Subscription, StoreError>
    where
        O: Observer<S> + 'static,
    {
        let observer = Arc::new(observer);
        let core = Arc::downgrade(&self.core);
        let observe_state = move || {
            if let Some(state) = core.upgrade().and_then(|core| core.read().ok()) {
                observer.next(state);
            }
        };

        let listener: Listener = Arc::new(observe_state);
        let subscription = Core::subscribe(&self.core, Arc::clone(&listener))?;
        listener();
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use crate::reducer::with_default;
    use crate::store::Store;
    use std::sync::Mutex;

    fn counter_store() -> Store<i64> {
        Store::new(
            with_default(|| 0_i64, |count: &i64, action: &Action| {
                action.is("INC").then(|| count + 1)
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn observer_gets_current_state_immediately() {
        let store = counter_store();
        store.dispatch(Action::new("INC")).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .observable()
            .subscribe(move |state: Arc<i64>| sink.lock().unwrap().push(*state))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn observer_follows_every_dispatch_until_unsubscribed() {
        let store = counter_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let subscription = store
            .observable()
            .subscribe(move |state: Arc<i64>| sink.lock().unwrap().push(*state))
            .unwrap();

        store.dispatch(Action::new("INC")).unwrap();
        store.dispatch(Action::new("NOOP")).unwrap();
        subscription.unsubscribe().unwrap();
        store.dispatch(Action::new("INC")).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 1]);
    }

    #[test]
    fn subscription_outliving_store_is_inert() {
        let store = counter_store();
        let subscription = store.subscribe(|| {}).unwrap();
        assert!(subscription.is_active());

        drop(store);
        assert!(!subscription.is_active());
        assert!(subscription.unsubscribe().is_ok());
    }
}
