//! Cairn: a predictable single-value state container
//!
//! A store holds one state value. The only way to change it is to dispatch
//! an action; a pure reducer computes the next state from the previous
//! state and the action, and subscribed listeners are told afterwards.
//!
//! # Core Concepts
//!
//! - **Actions**: Plain records with a string `type`, see [`core::Action`]
//! - **Reducers**: Pure `(state, action) -> state` functions, composable per
//!   key with [`reducer::ReducerMap`]
//! - **Store**: Owns the state and runs the dispatch protocol, see [`store::Store`]
//! - **Middleware**: Interceptors in front of dispatch, installed as an
//!   enhancer with [`middleware::apply_middleware`]
//! - **Deferred requests**: Computations dispatched instead of actions, run
//!   by [`middleware::thunk::Thunk`]
//!
//! # Example
//!
//! ```rust
//! use cairn::core::Action;
//! use cairn::reducer::{with_default, Record, ReducerMap};
//! use cairn::store::Store;
//!
//! let reducer = ReducerMap::new()
//!     .slice("count", with_default(|| 0_i64, |n: &i64, a: &Action| {
//!         a.is("INC").then(|| n + 1)
//!     }))
//!     .slice("log", with_default(Vec::<String>::new, |log: &Vec<String>, a: &Action| {
//!         a.is("INC").then(|| {
//!             let mut log = log.clone();
//!             log.push("incremented".to_string());
//!             log
//!         })
//!     }))
//!     .combine()
//!     .unwrap();
//!
//! let store = Store::<Record>::new(reducer, None).unwrap();
//! store.subscribe(|| println!("state changed")).unwrap();
//!
//! store.dispatch(Action::new("INC")).unwrap();
//!
//! let state = store.read().unwrap();
//! assert_eq!(*state.get::<i64>("count").unwrap(), 1);
//! assert_eq!(state.get::<Vec<String>>("log").unwrap().len(), 1);
//! ```

pub mod bind;
pub mod core;
pub mod middleware;
pub mod reducer;
pub mod store;

// Re-export commonly used types
pub use crate::core::Action;
pub use middleware::{apply_middleware, Middleware};
pub use reducer::{combine_reducers, Reducer, ReducerError, ReducerMap};
pub use store::{Outcome, Request, Store, StoreBuilder, StoreError};
