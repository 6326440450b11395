//! Advisory warnings emitted through `tracing` while combining and reducing.

use cairn::core::Action;
use cairn::reducer::{with_default, Record, Reducer, ReducerMap};
use cairn::store::Store;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_warnings<T>(run: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, run);
    (result, captured.contents())
}

fn counter() -> impl Reducer<i64> {
    with_default(|| 0_i64, |count: &i64, action: &Action| {
        action.is("INC").then(|| count + 1)
    })
}

fn flag() -> impl Reducer<bool> {
    with_default(|| false, |_: &bool, action: &Action| action.is("FLAG").then_some(true))
}

#[test]
fn unexpected_key_is_reported_once() {
    let reducer = ReducerMap::new()
        .slice("count", counter())
        .combine()
        .unwrap();
    let state = Arc::new(Record::new().with("count", 1_i64).with("legacy", "old"));

    let (_, output) = capture_warnings(|| {
        reducer
            .reduce(Some(Arc::clone(&state)), &Action::new("ANY"))
            .unwrap();
        reducer
            .reduce(Some(Arc::clone(&state)), &Action::new("ANY"))
            .unwrap();
    });

    assert_eq!(output.matches("Unexpected key \"legacy\"").count(), 1);
    assert!(output.contains("previous state received by the reducer"));
    assert!(output.contains("\"count\""));
}

#[test]
fn preloaded_state_with_unknown_keys_is_named_as_such() {
    let reducer = ReducerMap::new()
        .slice("count", counter())
        .combine()
        .unwrap();
    let preloaded = Record::new()
        .with("count", 5_i64)
        .with("session", true)
        .with("theme", "dark");

    let (store, output) = capture_warnings(|| Store::<Record>::new(reducer, Some(preloaded)));
    let store = store.unwrap();

    assert!(output.contains("Unexpected keys \"session\", \"theme\""));
    assert!(output.contains("preloaded state passed to the store"));

    let state = store.read().unwrap();
    assert_eq!(state.get::<i64>("count").as_deref(), Some(&5));
    assert!(!state.contains_key("session"));
}

#[test]
fn replacing_the_reducer_does_not_warn_about_dropped_keys() {
    let full = ReducerMap::new()
        .slice("count", counter())
        .slice("flag", flag())
        .combine()
        .unwrap();
    let store = Store::<Record>::new(full, None).unwrap();

    let smaller = ReducerMap::new()
        .slice("count", counter())
        .combine()
        .unwrap();
    let (_, output) = capture_warnings(|| {
        store.replace_reducer(smaller).unwrap();
        store.dispatch(Action::new("INC")).unwrap();
    });

    assert!(!output.contains("Unexpected"), "unexpected output: {output}");
    assert!(!store.read().unwrap().contains_key("flag"));
}

#[test]
fn pending_and_empty_maps_are_reported() {
    let (pending, pending_output) = capture_warnings(|| {
        ReducerMap::new()
            .slice("count", counter())
            .pending("profile")
            .combine()
    });
    assert!(pending.is_ok());
    assert!(pending_output.contains("No reducer provided for key \"profile\""));

    let (_, empty_output) = capture_warnings(|| {
        let reducer = ReducerMap::new().combine().unwrap();
        Store::<Record>::new(reducer, None).unwrap();
    });
    assert!(empty_output.contains("Store does not have a valid reducer"));
}
