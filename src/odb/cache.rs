//! Bounded LRU cache for parsed objects, keyed by [`Oid`].

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::hash::Oid;
use crate::object::Object;

/// Default capacity of the parsed-object cache. Chosen as a round number
/// comfortably larger than a typical working set of recently touched
/// objects without holding unbounded memory for large repositories.
pub const DEFAULT_CAPACITY: usize = 1000;

pub struct ObjectCache {
    inner: Mutex<LruCache<Oid, Object>>,
}

impl ObjectCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        ObjectCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, oid: &Oid) -> Option<Object> {
        self.inner.lock().expect("object cache poisoned").get(oid).cloned()
    }

    pub fn insert(&self, oid: Oid, object: Object) {
        self.inner.lock().expect("object cache poisoned").put(oid, object);
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        ObjectCache::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn caches_and_evicts() {
        let cache = ObjectCache::new(1);
        let a = Object::blob(b"a".to_vec());
        let b = Object::blob(b"b".to_vec());
        let a_id = a.id();
        let b_id = b.id();
        cache.insert(a_id, a);
        assert!(cache.get(&a_id).is_some());
        cache.insert(b_id, b);
        assert!(cache.get(&a_id).is_none());
        assert!(cache.get(&b_id).is_some());
    }
}
