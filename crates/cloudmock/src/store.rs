use std::collections::HashMap;

/// In-memory store for one resource kind, keyed by identifier.
///
/// The store does no locking of its own. Every access goes through
/// [`CloudState`](crate::state::CloudState), which only exists behind the
/// emulator-wide mutex. Lookups by anything other than the identifier are
/// full scans over [`Store::list`].
#[derive(Debug, Clone)]
pub struct Store<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    /// Insert or replace the resource stored under `id`.
    pub fn put(&mut self, id: impl Into<String>, resource: T) {
        self.entries.insert(id.into(), resource);
    }

    /// Insert only when nothing is stored under `id` yet. Returns whether an
    /// insert happened.
    pub fn put_if_absent(&mut self, id: impl Into<String>, resource: T) -> bool {
        let mut inserted = false;
        self.entries.entry(id.into()).or_insert_with(|| {
            inserted = true;
            resource
        });
        inserted
    }

    /// Erase the entry, returning it. `None` means the identifier was unknown.
    pub fn delete(&mut self, id: &str) -> Option<T> {
        self.entries.remove(id)
    }

    /// All stored resources, in no particular order.
    pub fn list(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
