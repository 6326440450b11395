//! Reserved action types used by the store itself.
//!
//! Reducers must return the current state for any unknown action and the
//! initial state when given no state. They must never match on these
//! types; the random suffix keeps them from colliding with application
//! types and from being hard-coded.

use std::sync::OnceLock;
use uuid::Uuid;

const NAMESPACE: &str = "@@cairn/";

fn random_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    let chars: Vec<String> = id.chars().take(6).map(String::from).collect();
    chars.join(".")
}

/// Type of the synthetic action dispatched when a store is created.
pub(crate) fn init() -> &'static str {
    static INIT: OnceLock<String> = OnceLock::new();
    INIT.get_or_init(|| format!("{NAMESPACE}INIT{}", random_suffix()))
}

/// Type of the synthetic action dispatched after a reducer is replaced.
pub(crate) fn replace() -> &'static str {
    static REPLACE: OnceLock<String> = OnceLock::new();
    REPLACE.get_or_init(|| format!("{NAMESPACE}REPLACE{}", random_suffix()))
}

/// A fresh, unpredictable type for probing reducers with an unknown action.
pub(crate) fn probe_unknown_action() -> String {
    format!("{NAMESPACE}PROBE_UNKNOWN_ACTION{}", random_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_types_are_namespaced() {
        assert!(init().starts_with("@@cairn/INIT"));
        assert!(replace().starts_with("@@cairn/REPLACE"));
        assert!(probe_unknown_action().starts_with("@@cairn/PROBE_UNKNOWN_ACTION"));
    }

    #[test]
    fn init_and_replace_are_stable_within_a_process() {
        assert_eq!(init(), init());
        assert_eq!(replace(), replace());
        assert_ne!(init(), replace());
    }

    #[test]
    fn probe_types_differ_between_calls() {
        assert_ne!(probe_unknown_action(), probe_unknown_action());
    }
}
