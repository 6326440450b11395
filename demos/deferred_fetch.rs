//! Deferred Fetch with Middleware
//!
//! This example demonstrates deferred requests and custom middleware.
//!
//! Key concepts:
//! - A logging middleware that wraps every dispatch
//! - The thunk middleware running deferred requests
//! - Extra context (a fake API client) handed to every deferred request
//! - Dispatching later from an async task
//!
//! Run with: cargo run --example deferred_fetch

use cairn::core::Action;
use cairn::middleware::thunk::thunk_with_extra;
use cairn::middleware::{apply_middleware, middleware_fn, MiddlewareApi};
use cairn::reducer::with_default;
use cairn::store::{Outcome, Request, StoreBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, Default)]
struct Users {
    loading: bool,
    names: Vec<String>,
    error: Option<String>,
}

struct FakeApi {
    latency: Duration,
}

impl FakeApi {
    async fn fetch_users(&self) -> Result<Vec<String>, String> {
        tokio::time::sleep(self.latency).await;
        Ok(vec!["ada".to_string(), "grace".to_string()])
    }
}

fn users_reducer(users: &Users, action: &Action) -> Option<Users> {
    match action.action_type() {
        "FETCH_STARTED" => Some(Users {
            loading: true,
            ..users.clone()
        }),
        "FETCH_SUCCEEDED" => {
            let names = action
                .get("names")?
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            Some(Users {
                loading: false,
                names,
                error: None,
            })
        }
        "FETCH_FAILED" => Some(Users {
            loading: false,
            error: action.get("error").and_then(Value::as_str).map(str::to_string),
            ..users.clone()
        }),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    println!("=== Deferred Fetch with Middleware ===\n");

    let logger = middleware_fn(|api: &MiddlewareApi<Users>, request, next| {
        let label = request.action_type().unwrap_or("<deferred>").to_string();
        println!("  -> {label}");
        let outcome = next.run(request)?;
        if let Ok(state) = api.read() {
            println!("  <- {label}: loading={} users={:?}", state.loading, state.names);
        }
        Ok(outcome)
    });

    let api = Arc::new(FakeApi {
        latency: Duration::from_millis(50),
    });
    let store = StoreBuilder::new(with_default(Users::default, users_reducer))
        .enhancer(apply_middleware(vec![logger, thunk_with_extra(api)]))
        .build()
        .unwrap();

    let (finished, done) = tokio::sync::oneshot::channel();
    let fetch_users = Request::<Users>::deferred(move |dispatch, _read, extra| {
        dispatch.dispatch(Action::new("FETCH_STARTED"))?;

        let Some(api) = extra.get::<Arc<FakeApi>>().cloned() else {
            return Ok(Outcome::Value(json!("no api client configured")));
        };
        let dispatch = dispatch.clone();
        tokio::spawn(async move {
            let action = match api.fetch_users().await {
                Ok(names) => Action::new("FETCH_SUCCEEDED").with("names", names),
                Err(error) => Action::new("FETCH_FAILED").with("error", error),
            };
            let _ = finished.send(dispatch.dispatch(action));
        });

        Ok(Outcome::Value(json!("fetch started")))
    });

    println!("Dispatching deferred fetch:");
    let outcome = store.dispatch(fetch_users).unwrap();
    println!("Dispatch returned: {outcome:?}\n");

    println!("Waiting for the fake API...");
    done.await.unwrap().unwrap();

    let users = store.read().unwrap();
    match &users.error {
        Some(error) => println!("\nFetch failed: {error}"),
        None => println!("\nFetched users: {:?}", users.names),
    }
    println!("\n=== Example Complete ===");
}
