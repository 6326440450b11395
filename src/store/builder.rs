//! Store construction and enhancers.

use super::engine::Store;
use super::error::StoreError;
use crate::core::{compose, Composable};
use crate::reducer::{Reducer, SharedReducer};
use std::sync::Arc;

/// A function that creates a store from a reducer and optional preloaded state.
pub type StoreCreator<S> =
    Arc<dyn Fn(SharedReducer<S>, Option<Arc<S>>) -> Result<Store<S>, StoreError> + Send + Sync>;

/// Wraps a store creator to add capabilities, e.g. middleware.
///
/// The enhanced creator must return a store whose operations behave like
/// the plain store's, except for whatever the enhancer changes.
pub type Enhancer<S> = Composable<StoreCreator<S>>;

/// The unenhanced creator.
pub fn base_creator<S: Send + Sync + 'static>() -> StoreCreator<S> {
    Arc::new(|reducer: SharedReducer<S>, preloaded: Option<Arc<S>>| {
        Store::from_shared(reducer, preloaded)
    })
}

/// Fold several enhancers into one, the leftmost being the outermost.
pub fn compose_enhancers<S: Send + Sync + 'static>(enhancers: Vec<Enhancer<S>>) -> Enhancer<S> {
    compose(enhancers)
}

/// Create a plain store. Shorthand for [`Store::new`].
pub fn create_store<S, R>(reducer: R, preloaded: Option<S>) -> Result<Store<S>, StoreError>
where
    S: Send + Sync + 'static,
    R: Reducer<S> + 'static,
{
    Store::new(reducer, preloaded)
}

/// Builder for stores with preloaded state and an enhancer.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::middleware::{apply_middleware, thunk::thunk};
/// use cairn::reducer::with_default;
/// use cairn::store::StoreBuilder;
///
/// let store = StoreBuilder::new(with_default(|| 0_i64, |n: &i64, a: &Action| {
///         a.is("INC").then(|| n + 1)
///     }))
///     .preloaded_state(10)
///     .enhancer(apply_middleware(vec![thunk()]))
///     .build()
///     .unwrap();
///
/// store.dispatch(Action::new("INC")).unwrap();
/// assert_eq!(*store.read().unwrap(), 11);
/// ```
pub struct StoreBuilder<S> {
    reducer: SharedReducer<S>,
    preloaded: Option<Arc<S>>,
    enhancers: Vec<Enhancer<S>>,
}

impl<S: Send + Sync + 'static> StoreBuilder<S> {
    /// Start building a store around `reducer` (required).
    pub fn new<R>(reducer: R) -> Self
    where
        R: Reducer<S> + 'static,
    {
        Self {
            reducer: Arc::new(reducer),
            preloaded: None,
            enhancers: Vec::new(),
        }
    }

    /// State handed to the reducer on init instead of nothing (optional).
    pub fn preloaded_state(mut self, state: S) -> Self {
        self.preloaded = Some(Arc::new(state));
        self
    }

    /// Enhance the store (optional, at most once).
    ///
    /// To use several enhancers, combine them with [`compose_enhancers`]
    /// and pass the result here.
    pub fn enhancer(mut self, enhancer: Enhancer<S>) -> Self {
        self.enhancers.push(enhancer);
        self
    }

    /// Build the store.
    ///
    /// # Errors
    ///
    /// - [`StoreError::MultipleEnhancers`] if `enhancer` was called more than once
    /// - Any error raised by the reducer on init or by the enhancer
    pub fn build(self) -> Result<Store<S>, StoreError> {
        if self.enhancers.len() > 1 {
            return Err(StoreError::MultipleEnhancers);
        }

        let creator = match self.enhancers.into_iter().next() {
            Some(enhancer) => enhancer(base_creator()),
            None => base_creator(),
        };
        creator(self.reducer, self.preloaded)
    }
}
