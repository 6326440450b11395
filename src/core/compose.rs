//! Right-to-left function composition.
//!
//! Composition is purely structural: no state, no side effects. It is used
//! to fold several store enhancers into the single one a store accepts.

use std::sync::Arc;

/// A shareable unary function that can take part in a composition.
pub type Composable<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Compose unary functions from right to left.
///
/// `compose(vec![f, g, h])` behaves like `|x| f(g(h(x)))`. Only the
/// rightmost function sees the caller's argument; when several arguments
/// are needed, make `T` a tuple.
///
/// With no functions the identity is returned. With exactly one function
/// that same function is returned, not a wrapper around it.
///
/// # Example
///
/// ```rust
/// use cairn::core::{compose, Composable};
/// use std::sync::Arc;
///
/// let double: Composable<i64> = Arc::new(|x| x * 2);
/// let increment: Composable<i64> = Arc::new(|x| x + 1);
///
/// // increment runs first, then double
/// let composed = compose(vec![double, increment]);
/// assert_eq!(composed(5), 12);
/// ```
pub fn compose<T: 'static>(funcs: Vec<Composable<T>>) -> Composable<T> {
    if funcs.len() <= 1 {
        return funcs
            .into_iter()
            .next()
            .unwrap_or_else(|| Arc::new(|value| value));
    }

    Arc::new(move |value| funcs.iter().rev().fold(value, |acc, func| func(acc)))
}
