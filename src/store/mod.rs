//! The store: one state value, changed only by dispatching actions.
//!
//! # Key Concepts
//!
//! - **Store**: Owns the state, the reducer and the listener list
//! - **Dispatch**: The only way to change the state; synchronous and
//!   never reentrant from inside the reducer
//! - **Subscriptions**: Listeners called after each dispatch, in order
//! - **Enhancers**: Wrap store creation to change dispatch, e.g. with middleware
//!
//! # Reentrancy
//!
//! A dispatch owns the store from the start of its reduce until its last
//! listener returns. From the reducer, reading, subscribing, unsubscribing
//! and dispatching all fail. Listeners run on the owning thread and may do
//! all of the above; a dispatch from a listener nests inside the outer one.
//! Other threads block until the outermost dispatch is done.

mod builder;
mod engine;
mod error;
mod request;
mod subscription;

pub use builder::{
    base_creator, compose_enhancers, create_store, Enhancer, StoreBuilder, StoreCreator,
};
pub(crate) use engine::DispatchFn;
pub use engine::{Dispatcher, StateReader, Store, WeakStore};
pub use error::StoreError;
pub use request::{Deferred, Extra, Outcome, Request};
pub use subscription::{Observable, Observer, Subscription};
