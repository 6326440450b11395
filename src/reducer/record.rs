//! Compound state owned slice-by-slice by independent reducers.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased, shared piece of a [`Record`].
pub type Slice = Arc<dyn Any + Send + Sync>;

/// Record-shaped state produced by a [`CombinedReducer`](super::CombinedReducer).
///
/// Each key holds one slice, owned by the reducer registered under that
/// key. Slices are stored behind `Arc`, so an unchanged slice keeps its
/// identity from one state to the next.
///
/// # Example
///
/// ```rust
/// use cairn::reducer::Record;
///
/// let record = Record::new().with("count", 3_i64).with("label", String::from("clicks"));
///
/// assert_eq!(record.get::<i64>("count").as_deref(), Some(&3));
/// assert_eq!(record.get::<String>("label").as_deref().map(String::as_str), Some("clicks"));
/// assert!(record.get::<u8>("count").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Record {
    slices: BTreeMap<String, Slice>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slice, returning the extended record.
    pub fn with<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a slice.
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.slices.insert(key.into(), Arc::new(value));
    }

    /// Typed access to a slice. `None` if the key is absent or holds another type.
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.slices
            .get(key)
            .and_then(|slice| Arc::clone(slice).downcast::<T>().ok())
    }

    /// Untyped access to a slice.
    pub fn slice(&self, key: &str) -> Option<&Slice> {
        self.slices.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub(crate) fn insert_slice(&mut self, key: String, slice: Slice) {
        self.slices.insert(key, slice);
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("keys", &self.slices.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Identity comparison of two slices, ignoring vtable pointers.
pub(crate) fn same_slice(a: &Slice, b: &Slice) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}
