//! In-process lookup caches owned by services.

pub mod string_cache;

pub use string_cache::{CacheEntry, CacheLookup, StringCache};
