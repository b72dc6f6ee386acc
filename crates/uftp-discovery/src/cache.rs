//! A small TTL cache for discovery results.
//!
//! Discovery records change rarely; every lookup is cached for one hour
//! (keyed by the full argument tuple), so repeated sends to the same peer
//! cost one DNS round-trip per hour per record kind.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The cache lifetime used for all discovery records.
pub const DISCOVERY_TTL: Duration = Duration::from_secs(3600);

/// Map from lookup arguments to a cached value that expires `ttl` after
/// insertion. Reads of an expired entry remove it.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key, dropping the entry if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some((expires, value)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, replacing any previous entry for the key.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key, (Instant::now() + self.ttl, value));
    }

    /// Number of live and expired entries currently held.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_lookup<'a>(
        cache: &'a TtlCache<(String, u32), u32>,
        calls: &'a AtomicU32,
    ) -> impl Fn(&str, u32) -> u32 + 'a {
        move |domain, port| {
            let key = (domain.to_string(), port);
            if let Some(value) = cache.get(&key) {
                return value;
            }
            let value = calls.fetch_add(1, Ordering::SeqCst);
            cache.insert(key, value);
            value
        }
    }

    #[test]
    fn test_repeat_calls_within_ttl_hit_the_cache() {
        let cache = TtlCache::new(Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let lookup = counting_lookup(&cache, &calls);

        let first = lookup("agr.dev", 1);
        std::thread::sleep(Duration::from_millis(50));
        let second = lookup("agr.dev", 1);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_entries_are_refreshed() {
        let cache = TtlCache::new(Duration::from_millis(50));
        let calls = AtomicU32::new(0);
        let lookup = counting_lookup(&cache, &calls);

        let first = lookup("agr.dev", 1);
        std::thread::sleep(Duration::from_millis(60));
        let second = lookup("agr.dev", 1);
        assert_ne!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_keys_include_all_arguments() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);
        let lookup = counting_lookup(&cache, &calls);

        let a = lookup("agr.dev", 1);
        let b = lookup("agr.dev", 2);
        let c = lookup("cro.dev", 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert_eq!(lookup("agr.dev", 1), a);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
