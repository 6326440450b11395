//! Property-based tests for the store, reducers and composition helpers.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use cairn::core::{compose, is_plain_record, kind_of, Action, Composable};
use cairn::reducer::{with_default, Record, ReducerMap};
use cairn::store::{Store, StoreError};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn counter_store() -> Store<i64> {
    Store::new(
        with_default(|| 0_i64, |count: &i64, action: &Action| {
            match action.action_type() {
                "INC" => Some(count + 1),
                "DEC" => Some(count - 1),
                _ => None,
            }
        }),
        None,
    )
    .unwrap()
}

prop_compose! {
    fn arbitrary_op()(variant in 0..3u8) -> &'static str {
        match variant {
            0 => "INC",
            1 => "DEC",
            _ => "NOOP",
        }
    }
}

prop_compose! {
    fn arbitrary_json()(variant in 0..6u8, n in any::<i64>(), s in "[a-z]{0,8}") -> Value {
        match variant {
            0 => Value::Null,
            1 => json!(n % 2 == 0),
            2 => json!(n),
            3 => json!(s),
            4 => json!([n, s]),
            _ => json!({ "type": s, "n": n }),
        }
    }
}

proptest! {
    #[test]
    fn state_matches_a_fold_over_the_dispatched_actions(
        ops in prop::collection::vec(arbitrary_op(), 0..40)
    ) {
        let store = counter_store();
        for op in &ops {
            store.dispatch(Action::new(*op)).unwrap();
        }

        let expected: i64 = ops
            .iter()
            .map(|op| match *op {
                "INC" => 1,
                "DEC" => -1,
                _ => 0,
            })
            .sum();
        prop_assert_eq!(*store.read().unwrap(), expected);
    }

    #[test]
    fn listeners_fire_in_subscription_order(count in 1usize..12, dispatches in 1usize..5) {
        let store = counter_store();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for id in 0..count {
            let calls = Arc::clone(&calls);
            store.subscribe(move || calls.lock().unwrap().push(id)).unwrap();
        }
        for _ in 0..dispatches {
            store.dispatch(Action::new("INC")).unwrap();
        }

        let expected: Vec<usize> = (0..dispatches).flat_map(|_| 0..count).collect();
        prop_assert_eq!(calls.lock().unwrap().clone(), expected);
    }

    #[test]
    fn unknown_action_types_keep_the_same_state(action_type in "[A-Z_]{1,16}") {
        prop_assume!(action_type != "INC" && action_type != "DEC");

        let store = counter_store();
        store.dispatch(Action::new("INC")).unwrap();
        let before = store.read().unwrap();

        store.dispatch(Action::new(action_type)).unwrap();
        prop_assert!(Arc::ptr_eq(&before, &store.read().unwrap()));
    }

    #[test]
    fn combined_state_is_stable_for_unknown_actions(action_type in "[a-z]{1,12}") {
        let reducer = ReducerMap::new()
            .slice("count", with_default(|| 0_i64, |n: &i64, a: &Action| a.is("INC").then(|| n + 1)))
            .slice("flag", with_default(|| false, |_: &bool, a: &Action| a.is("FLAG").then_some(true)))
            .combine()
            .unwrap();
        let store = Store::<Record>::new(reducer, None).unwrap();
        let before = store.read().unwrap();

        store.dispatch(Action::new(action_type)).unwrap();
        prop_assert!(Arc::ptr_eq(&before, &store.read().unwrap()));
    }

    #[test]
    fn compose_applies_right_to_left(adds in prop::collection::vec(-100i64..100, 0..8), seed in -1000i64..1000) {
        let funcs: Vec<Composable<Vec<i64>>> = adds
            .iter()
            .map(|add| {
                let add = *add;
                let f: Composable<Vec<i64>> = Arc::new(move |mut trail: Vec<i64>| {
                    trail.push(add);
                    trail
                });
                f
            })
            .collect();

        let trail = compose(funcs)(vec![seed]);

        let mut expected = vec![seed];
        expected.extend(adds.iter().rev());
        prop_assert_eq!(trail, expected);
    }

    #[test]
    fn only_objects_are_plain_records(value in arbitrary_json()) {
        prop_assert_eq!(is_plain_record(&value), kind_of(&value) == "object");
    }

    #[test]
    fn json_dispatch_accepts_only_typed_objects(value in arbitrary_json()) {
        let store = counter_store();
        let result = store.dispatch_json(value.clone());

        match &value {
            Value::Object(_) => prop_assert!(result.is_ok()),
            _ => {
                let is_shape_error = matches!(result, Err(StoreError::NotPlainRecord { .. }));
                prop_assert!(is_shape_error);
            }
        }
    }
}
