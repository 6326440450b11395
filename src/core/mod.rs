//! Pure building blocks shared by the store, reducers and middleware.
//!
//! This module contains the parts with no state of their own:
//! - The `Action` transition request and its reserved internal types
//! - Plain-record shape checks for untyped input
//! - Right-to-left function composition
//!
//! Nothing in here performs side effects.

mod action;
pub(crate) mod action_types;
mod compose;
mod shape;

pub use action::Action;
pub use compose::{compose, Composable};
pub use shape::{is_plain_record, kind_of};
