//! Action-creator binding.
//!
//! An action creator builds a request from some arguments. Binding it to
//! a [`Dispatcher`] gives a callable that builds the request and
//! dispatches it in one step, so callers need not see the store.
//!
//! # Example
//!
//! ```rust
//! use cairn::bind::{action_creator, bind_action_creators};
//! use cairn::core::Action;
//! use cairn::reducer::with_default;
//! use cairn::store::Store;
//! use std::collections::BTreeMap;
//!
//! let store = Store::new(
//!     with_default(|| 0_i64, |n: &i64, a: &Action| {
//!         let by = a.get("by").and_then(|by| by.as_i64()).unwrap_or(1);
//!         match a.action_type() {
//!             "INC" => Some(n + by),
//!             "DEC" => Some(n - by),
//!             _ => None,
//!         }
//!     }),
//!     None,
//! )
//! .unwrap();
//!
//! let mut creators = BTreeMap::new();
//! creators.insert("increment", action_creator(|by: i64| Action::new("INC").with("by", by)));
//! creators.insert("decrement", action_creator(|by: i64| Action::new("DEC").with("by", by)));
//!
//! let bound = bind_action_creators(creators, &store.dispatcher());
//! bound["increment"].call(5).unwrap();
//! bound["decrement"].call(2).unwrap();
//! assert_eq!(*store.read().unwrap(), 3);
//! ```

use crate::store::{Dispatcher, Outcome, Request, StoreError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a request from `A`.
pub type ActionCreator<S, A> = Arc<dyn Fn(A) -> Request<S> + Send + Sync>;

/// Turn a closure returning an action (or any request) into an [`ActionCreator`].
pub fn action_creator<S, A, R, F>(creator: F) -> ActionCreator<S, A>
where
    S: 'static,
    A: 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
    R: Into<Request<S>> + 'static,
{
    Arc::new(move |args: A| -> Request<S> { creator(args).into() })
}

/// An action creator that dispatches what it creates.
pub struct BoundActionCreator<S, A> {
    creator: ActionCreator<S, A>,
    dispatcher: Dispatcher<S>,
}

impl<S, A> Clone for BoundActionCreator<S, A> {
    fn clone(&self) -> Self {
        Self {
            creator: Arc::clone(&self.creator),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S, A> fmt::Debug for BoundActionCreator<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundActionCreator").finish_non_exhaustive()
    }
}

impl<S: Send + Sync + 'static, A> BoundActionCreator<S, A> {
    /// Create the request and dispatch it, returning the dispatch result.
    pub fn call(&self, args: A) -> Result<Outcome, StoreError> {
        self.dispatcher.dispatch((self.creator)(args))
    }
}

/// Bind one action creator to `dispatcher`.
pub fn bind_action_creator<S, A, R, F>(
    creator: F,
    dispatcher: &Dispatcher<S>,
) -> BoundActionCreator<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
    R: Into<Request<S>> + 'static,
{
    BoundActionCreator {
        creator: action_creator(creator),
        dispatcher: dispatcher.clone(),
    }
}

/// Bind every creator in `creators`, keeping their keys.
pub fn bind_action_creators<K, S, A>(
    creators: BTreeMap<K, ActionCreator<S, A>>,
    dispatcher: &Dispatcher<S>,
) -> BTreeMap<K, BoundActionCreator<S, A>>
where
    K: Ord,
    S: Send + Sync + 'static,
{
    creators
        .into_iter()
        .map(|(key, creator)| {
            let bound = BoundActionCreator {
                creator,
                dispatcher: dispatcher.clone(),
            };
            (key, bound)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use crate::middleware::{apply_middleware, thunk::thunk};
    use crate::reducer::with_default;
    use crate::store::{Store, StoreBuilder};
    use serde_json::Value;

    #[derive(Debug, Default, PartialEq)]
    struct Todos {
        items: Vec<String>,
    }

    fn todo_reducer() -> impl crate::reducer::Reducer<Todos> {
        with_default(Todos::default, |todos: &Todos, action: &Action| {
            match action.action_type() {
                "ADD_TODO" => {
                    let text = action.get("text").and_then(Value::as_str)?;
                    let mut items = todos.items.clone();
                    items.push(text.to_string());
                    Some(Todos { items })
                }
                "CLEAR" => Some(Todos::default()),
                _ => None,
            }
        })
    }

    fn add_todo(text: &str) -> Action {
        Action::new("ADD_TODO").with("text", text)
    }

    #[test]
    fn bound_creator_dispatches_and_returns_the_action() {
        let store = Store::new(todo_reducer(), None).unwrap();
        let add = bind_action_creator(|text: &'static str| add_todo(text), &store.dispatcher());

        let outcome = add.call("write docs").unwrap();

        assert_eq!(outcome, Outcome::Action(add_todo("write docs")));
        assert_eq!(store.read().unwrap().items, vec!["write docs"]);
    }

    #[test]
    fn bound_map_keeps_keys_and_dispatches_each() {
        let store = Store::new(todo_reducer(), None).unwrap();
        let mut creators: BTreeMap<&str, ActionCreator<Todos, String>> = BTreeMap::new();
        creators.insert(
            "add",
            action_creator(|text: String| add_todo(&text)),
        );
        creators.insert("clear", action_creator(|_: String| Action::new("CLEAR")));

        let bound = bind_action_creators(creators, &store.dispatcher());

        assert_eq!(bound.keys().copied().collect::<Vec<_>>(), vec!["add", "clear"]);

        bound["add"].call("one".to_string()).unwrap();
        bound["add"].call("two".to_string()).unwrap();
        assert_eq!(store.read().unwrap().items, vec!["one", "two"]);

        bound["clear"].call(String::new()).unwrap();
        assert!(store.read().unwrap().items.is_empty());
    }

    #[test]
    fn creator_may_return_a_deferred_request() {
        let store = StoreBuilder::new(todo_reducer())
            .enhancer(apply_middleware(vec![thunk()]))
            .build()
            .unwrap();

        let add_twice = bind_action_creator(
            |text: &'static str| {
                Request::<Todos>::deferred(move |dispatch, _read, _extra| {
                    dispatch.dispatch(add_todo(text))?;
                    dispatch.dispatch(add_todo(text))
                })
            },
            &store.dispatcher(),
        );

        add_twice.call("again").unwrap();
        assert_eq!(store.read().unwrap().items, vec!["again", "again"]);
    }

    #[test]
    fn errors_reach_the_caller() {
        let store = Store::new(todo_reducer(), None).unwrap();
        let deferred = bind_action_creator(
            |_: ()| Request::<Todos>::deferred(|_, _, _| Ok(Outcome::Empty)),
            &store.dispatcher(),
        );

        assert!(matches!(deferred.call(()), Err(StoreError::NotPlainRequest)));
    }
}
