//! Counter Store
//!
//! This example demonstrates the smallest useful store.
//!
//! Key concepts:
//! - A reducer built from an initial value and a step function
//! - Dispatching plain actions
//! - Listeners called after every dispatch
//! - Unsubscribing
//!
//! Run with: cargo run --example counter

use cairn::core::Action;
use cairn::reducer::with_default;
use cairn::store::Store;
use serde_json::json;

fn main() {
    println!("=== Counter Store ===\n");

    let store = Store::new(
        with_default(|| 0_i64, |count: &i64, action: &Action| {
            match action.action_type() {
                "INCREMENT" => Some(count + 1),
                "DECREMENT" => Some(count - 1),
                "ADD" => action
                    .get("amount")
                    .and_then(|amount| amount.as_i64())
                    .map(|amount| count + amount),
                _ => None,
            }
        }),
        None,
    )
    .unwrap();

    println!("Initial state: {}\n", store.read().unwrap());

    let reader = store.reader();
    let subscription = store
        .subscribe(move || {
            if let Ok(count) = reader.read() {
                println!("  listener: count is now {count}");
            }
        })
        .unwrap();

    println!("Dispatching INCREMENT twice:");
    store.dispatch(Action::new("INCREMENT")).unwrap();
    store.dispatch(Action::new("INCREMENT")).unwrap();

    println!("\nDispatching ADD with amount 10 (from JSON):");
    store
        .dispatch_json(json!({ "type": "ADD", "amount": 10 }))
        .unwrap();

    println!("\nRejected input:");
    match store.dispatch_json(json!(["INCREMENT"])) {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(err) => println!("  {err}"),
    }

    subscription.unsubscribe().unwrap();
    println!("\nListener removed; dispatching DECREMENT silently");
    store.dispatch(Action::new("DECREMENT")).unwrap();

    println!("\nFinal state: {}", store.read().unwrap());
    println!("\n=== Example Complete ===");
}
