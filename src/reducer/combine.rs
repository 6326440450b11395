//! Combining slice reducers into one reducer over a [`Record`].

use super::error::ReducerError;
use super::record::{same_slice, Record, Slice};
use super::Reducer;
use crate::core::Action;
use std::any::type_name;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Type alias for a slice reducer with its state type erased.
type ErasedReducer =
    Arc<dyn Fn(Option<Slice>, &Action) -> Result<Slice, ReducerError> + Send + Sync>;

fn erase<T, R>(key: &str, reducer: R) -> ErasedReducer
where
    T: Send + Sync + 'static,
    R: Reducer<T> + 'static,
{
    let key = key.to_string();
    Arc::new(move |slice: Option<Slice>, action: &Action| -> Result<Slice, ReducerError> {
        let previous = slice
            .map(|slice| {
                slice
                    .downcast::<T>()
                    .map_err(|_| ReducerError::SliceTypeMismatch {
                        key: key.clone(),
                        expected: type_name::<T>(),
                    })
            })
            .transpose()?;
        let next: Slice = reducer.reduce(previous, action)?;
        Ok(next)
    })
}

/// Mapping from state key to the reducer that owns that key.
///
/// Keys keep their registration order; registering a key twice replaces
/// the earlier reducer.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use cairn::reducer::{with_default, Record, Reducer, ReducerMap};
///
/// let reducer = ReducerMap::new()
///     .slice("count", with_default(|| 0_i64, |n: &i64, a: &Action| a.is("INC").then(|| n + 1)))
///     .slice("log", with_default(Vec::<String>::new, |log: &Vec<String>, a: &Action| {
///         a.is("LOG").then(|| {
///             let mut log = log.clone();
///             log.push("entry".to_string());
///             log
///         })
///     }))
///     .combine()
///     .unwrap();
///
/// let state = reducer.reduce(None, &Action::new("INC")).unwrap();
/// assert_eq!(state.get::<i64>("count").as_deref(), Some(&1));
/// assert_eq!(state.get::<Vec<String>>("log").map(|log| log.len()), Some(0));
/// ```
pub struct ReducerMap {
    entries: Vec<(String, Option<ErasedReducer>)>,
    validate: bool,
}

impl ReducerMap {
    /// Create an empty mapping. Construction-time validation is enabled.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            validate: true,
        }
    }

    /// Register the reducer owning `key`.
    pub fn slice<T, R>(mut self, key: impl Into<String>, reducer: R) -> Self
    where
        T: Send + Sync + 'static,
        R: Reducer<T> + 'static,
    {
        let key = key.into();
        let erased = erase(&key, reducer);
        self.upsert(key, Some(erased));
        self
    }

    /// Declare a key whose reducer is not available yet.
    ///
    /// Pending keys are reported and left out of the combined reducer. A
    /// later [`Store::replace_reducer`](crate::store::Store::replace_reducer)
    /// can supply the full mapping once the reducer has been loaded.
    pub fn pending(mut self, key: impl Into<String>) -> Self {
        self.upsert(key.into(), None);
        self
    }

    /// Skip probing every slice reducer when combining.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Build the combined reducer.
    ///
    /// Unless validation was skipped, every slice reducer is invoked with no
    /// state and the store's init action, then with no state and a random
    /// unknown action. Both calls must produce a state.
    ///
    /// # Errors
    ///
    /// - [`ReducerError::UndefinedDuringInit`] if a reducer returns nothing on init
    /// - [`ReducerError::UndefinedOnProbe`] if a reducer returns nothing for an
    ///   unknown action
    pub fn combine(self) -> Result<CombinedReducer, ReducerError> {
        let mut slices = Vec::with_capacity(self.entries.len());
        for (key, reducer) in self.entries {
            match reducer {
                Some(reducer) => slices.push((key, reducer)),
                None => tracing::warn!(key = %key, "No reducer provided for key \"{key}\""),
            }
        }

        if self.validate {
            assert_slice_shapes(&slices)?;
        }

        Ok(CombinedReducer {
            slices,
            reported_keys: Mutex::new(HashSet::new()),
        })
    }

    fn upsert(&mut self, key: String, reducer: Option<ErasedReducer>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = reducer,
            None => self.entries.push((key, reducer)),
        }
    }
}

impl Default for ReducerMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Combine a mapping of slice reducers into one reducer.
pub fn combine_reducers(map: ReducerMap) -> Result<CombinedReducer, ReducerError> {
    map.combine()
}

fn assert_slice_shapes(slices: &[(String, ErasedReducer)]) -> Result<(), ReducerError> {
    for (key, reducer) in slices {
        match reducer(None, &Action::init()) {
            Err(ReducerError::ReturnedNone { .. }) => {
                return Err(ReducerError::UndefinedDuringInit { key: key.clone() })
            }
            Err(other) => return Err(other),
            Ok(_) => {}
        }

        match reducer(None, &Action::probe_unknown()) {
            Err(ReducerError::ReturnedNone { .. }) => {
                return Err(ReducerError::UndefinedOnProbe { key: key.clone() })
            }
            Err(other) => return Err(other),
            Ok(_) => {}
        }
    }
    Ok(())
}

/// A reducer over a [`Record`] that delegates each key to its own reducer.
///
/// When no slice changes identity the previous record is returned as-is,
/// so callers can detect "nothing happened" with `Arc::ptr_eq`.
pub struct CombinedReducer {
    slices: Vec<(String, ErasedReducer)>,
    reported_keys: Mutex<HashSet<String>>,
}

impl CombinedReducer {
    /// Keys owned by this reducer, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|(key, _)| key.as_str())
    }

    fn owns(&self, key: &str) -> bool {
        self.slices.iter().any(|(owned, _)| owned == key)
    }

    fn warn_unexpected_shape(&self, state: &Record, action: &Action) {
        let argument = if action.is_init() {
            "preloaded state passed to the store"
        } else {
            "previous state received by the reducer"
        };

        if self.slices.is_empty() {
            tracing::warn!(
                "Store does not have a valid reducer. Make sure the map passed to \
                 combine_reducers registers at least one slice reducer"
            );
            return;
        }

        let unexpected: Vec<String> = {
            let mut reported = self
                .reported_keys
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state
                .keys()
                .filter(|key| !self.owns(key))
                .filter(|key| reported.insert((*key).to_string()))
                .map(str::to_string)
                .collect()
        };

        if action.is_replace() || unexpected.is_empty() {
            return;
        }

        let expected: Vec<&str> = self.keys().collect();
        tracing::warn!(
            keys = ?unexpected,
            "Unexpected {} \"{}\" found in {argument}. Expected to find one of the known \
             reducer keys instead: \"{}\". Unexpected keys will be ignored.",
            if unexpected.len() > 1 { "keys" } else { "key" },
            unexpected.join("\", \""),
            expected.join("\", \""),
        );
    }
}

impl Reducer<Record> for CombinedReducer {
    fn reduce(
        &self,
        state: Option<Arc<Record>>,
        action: &Action,
    ) -> Result<Arc<Record>, ReducerError> {
        let state = state.unwrap_or_default();
        self.warn_unexpected_shape(&state, action);

        let mut changed = false;
        let mut next = Record::new();
        for (key, reducer) in &self.slices {
            let previous = state.slice(key).cloned();
            let result = reducer(previous.clone(), action).map_err(|err| match err {
                ReducerError::ReturnedNone { action_type } => ReducerError::UndefinedSlice {
                    key: key.clone(),
                    action_type,
                },
                other => other,
            })?;

            changed = changed || previous.is_none_or(|previous| !same_slice(&previous, &result));
            next.insert_slice(key.clone(), result);
        }

        // Keys no slice owns are dropped, which is a change too.
        changed = changed || next.len() != state.len();
        Ok(if changed { Arc::new(next) } else { state })
    }
}
