//! Todo List with Combined Reducers
//!
//! This example demonstrates splitting state into independently owned slices.
//!
//! Key concepts:
//! - One reducer per key, combined with `ReducerMap`
//! - Untouched slices keep their identity across dispatches
//! - Preloaded state
//! - Binding action creators to a dispatcher
//!
//! Run with: cargo run --example todo_slices

use cairn::bind::{action_creator, bind_action_creators, ActionCreator};
use cairn::core::Action;
use cairn::reducer::{with_default, Record, ReducerMap};
use cairn::store::Store;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Todo {
    text: String,
    completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Filter {
    All,
    Active,
    Completed,
}

fn main() {
    println!("=== Todo List with Combined Reducers ===\n");

    let reducer = ReducerMap::new()
        .slice(
            "todos",
            with_default(Vec::<Todo>::new, |todos: &Vec<Todo>, action: &Action| {
                match action.action_type() {
                    "ADD_TODO" => {
                        let text = action.get("text").and_then(Value::as_str)?;
                        let mut next = todos.clone();
                        next.push(Todo {
                            text: text.to_string(),
                            completed: false,
                        });
                        Some(next)
                    }
                    "TOGGLE_TODO" => {
                        let index = action.get("index").and_then(Value::as_u64)? as usize;
                        let mut next = todos.clone();
                        let todo = next.get_mut(index)?;
                        todo.completed = !todo.completed;
                        Some(next)
                    }
                    _ => None,
                }
            }),
        )
        .slice(
            "filter",
            with_default(|| Filter::All, |_: &Filter, action: &Action| {
                match action.get("filter").and_then(Value::as_str) {
                    Some("active") if action.is("SET_FILTER") => Some(Filter::Active),
                    Some("completed") if action.is("SET_FILTER") => Some(Filter::Completed),
                    Some("all") if action.is("SET_FILTER") => Some(Filter::All),
                    _ => None,
                }
            }),
        )
        .combine()
        .unwrap();

    let preloaded = Record::new().with(
        "todos",
        vec![Todo {
            text: "Read the docs".to_string(),
            completed: true,
        }],
    );
    let store = Store::<Record>::new(reducer, Some(preloaded)).unwrap();

    let mut creators: BTreeMap<&str, ActionCreator<Record, Value>> = BTreeMap::new();
    creators.insert(
        "add",
        action_creator(|text: Value| Action::new("ADD_TODO").with("text", text)),
    );
    creators.insert(
        "toggle",
        action_creator(|index: Value| Action::new("TOGGLE_TODO").with("index", index)),
    );
    creators.insert(
        "filter",
        action_creator(|filter: Value| Action::new("SET_FILTER").with("filter", filter)),
    );
    let actions = bind_action_creators(creators, &store.dispatcher());

    println!("Bound action creators: {:?}\n", actions.keys().collect::<Vec<_>>());

    let before = store.read().unwrap();
    actions["add"].call("Write a reducer".into()).unwrap();
    actions["add"].call("Combine reducers".into()).unwrap();
    actions["toggle"].call(1.into()).unwrap();

    let after = store.read().unwrap();
    let filter_kept = Arc::ptr_eq(
        &before.get::<Filter>("filter").unwrap(),
        &after.get::<Filter>("filter").unwrap(),
    );
    println!("Filter slice untouched by todo actions: {filter_kept}");

    actions["filter"].call("active".into()).unwrap();

    let state = store.read().unwrap();
    let filter = *state.get::<Filter>("filter").unwrap();
    println!("\nVisible todos ({filter:?}):");
    for todo in state.get::<Vec<Todo>>("todos").unwrap().iter() {
        let visible = match filter {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        };
        if visible {
            println!("  [ ] {}", todo.text);
        }
    }

    let unchanged = store.read().unwrap();
    store.dispatch(Action::new("UNKNOWN")).unwrap();
    println!(
        "\nUnknown action keeps the same state object: {}",
        Arc::ptr_eq(&unchanged, &store.read().unwrap())
    );

    println!("\n=== Example Complete ===");
}
