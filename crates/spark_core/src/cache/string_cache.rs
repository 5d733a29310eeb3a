//! String-keyed model cache with an explicit "confirmed absent" state.
//!
//! # Invariants
//! - A missing key means "not queried yet"; `CacheEntry::Absent` means
//!   "queried, does not exist".
//! - Population is first-write-wins; only `invalidate`/`clear` remove keys.
//! - No TTL or eviction; entries live as long as the owning service.

use std::collections::HashMap;
use std::rc::Rc;

/// Stored value for one key.
#[derive(Debug)]
pub enum CacheEntry<M> {
    Found(Rc<M>),
    Absent,
}

/// Tri-state answer of a cache probe.
#[derive(Debug)]
pub enum CacheLookup<M> {
    /// Key was never resolved; the caller must query storage.
    Miss,
    /// Key was resolved and confirmed not to exist.
    Absent,
    Hit(Rc<M>),
}

impl<M> CacheLookup<M> {
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the cached model, if any.
    pub fn into_model(self) -> Option<Rc<M>> {
        match self {
            Self::Hit(model) => Some(model),
            Self::Miss | Self::Absent => None,
        }
    }
}

/// Unbounded, unsynchronized `String -> CacheEntry` map.
#[derive(Debug)]
pub struct StringCache<M> {
    entries: HashMap<String, CacheEntry<M>>,
}

impl<M> StringCache<M> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn lookup(&self, key: &str) -> CacheLookup<M> {
        match self.entries.get(key) {
            None => CacheLookup::Miss,
            Some(CacheEntry::Absent) => CacheLookup::Absent,
            Some(CacheEntry::Found(model)) => CacheLookup::Hit(Rc::clone(model)),
        }
    }

    /// Caches `model` under `key` unless the key is already resolved.
    ///
    /// Returns whether the entry was written.
    pub fn insert_found(&mut self, key: impl Into<String>, model: Rc<M>) -> bool {
        self.insert(key.into(), CacheEntry::Found(model))
    }

    /// Marks `key` as confirmed absent unless the key is already resolved.
    pub fn insert_absent(&mut self, key: impl Into<String>) -> bool {
        self.insert(key.into(), CacheEntry::Absent)
    }

    /// Forgets `key` so the next lookup queries storage again.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, entry: CacheEntry<M>) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }
}

impl<M> Default for StringCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheLookup, StringCache};
    use std::rc::Rc;

    #[test]
    fn unknown_absent_and_found_are_distinct() {
        let mut cache: StringCache<String> = StringCache::new();
        assert!(cache.lookup("news").is_miss());

        cache.insert_absent("news");
        assert!(cache.lookup("news").is_absent());

        cache.insert_found("blog", Rc::new("Blog".to_string()));
        match cache.lookup("blog") {
            CacheLookup::Hit(model) => assert_eq!(model.as_str(), "Blog"),
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[test]
    fn first_write_wins() {
        let mut cache = StringCache::new();
        let first = Rc::new(1);
        assert!(cache.insert_found("key", Rc::clone(&first)));
        assert!(!cache.insert_found("key", Rc::new(2)));
        assert!(!cache.insert_absent("key"));

        let cached = cache.lookup("key").into_model().expect("cached value");
        assert!(Rc::ptr_eq(&cached, &first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear_forget_keys() {
        let mut cache: StringCache<u8> = StringCache::new();
        cache.insert_absent("a");
        cache.insert_absent("b");

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert!(cache.lookup("a").is_miss());

        cache.clear();
        assert!(cache.is_empty());
    }
}
