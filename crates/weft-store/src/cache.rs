//! Bounded, invalidation-aware read cache for per-file queries
//!
//! Sits in front of `get_for_file`: hits within the TTL are served from
//! memory, misses fall through to the store and repopulate. Every store
//! mutation invalidates the affected paths synchronously before the
//! mutating call returns - a stale read after a completed write is a
//! correctness bug here, not an acceptable staleness window. Eviction is
//! least-recently-used once the entry ceiling is reached, independent of
//! TTL expiry.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;
use weft_domain::{Direction, Relationship, RelationshipId, RelationshipStore, RelationshipType};

/// Cache tuning knobs
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached (path, direction) entries
    pub capacity: usize,

    /// Entries older than this are treated as misses
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Hit/miss counters, for diagnostics
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    /// Cache hits served so far
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Misses (including TTL expiries) so far
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

struct CacheEntry {
    relationships: Vec<Relationship>,
    inserted_at: Instant,
}

/// A bounded LRU cache of resolved per-file relationship lists.
///
/// Keys are (path, direction) pairs; invalidation is by path and clears
/// all three direction variants. The cache degrades rather than fails:
/// a poisoned lock turns every operation into a no-op, so callers always
/// fall through to the store.
pub struct RelationshipCache {
    entries: Mutex<LruCache<(String, Direction), CacheEntry>>,
    ttl: Duration,
    stats: CacheStats,
}

impl RelationshipCache {
    /// Create a cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity.max(1)).expect("capacity is at least 1");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            stats: CacheStats::default(),
        }
    }

    /// Look up a fresh entry; expired entries are dropped on access
    pub fn get(&self, path: &str, direction: Direction) -> Option<Vec<Relationship>> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        let key = (path.to_string(), direction);
        let fresh = match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                Some(entry.relationships.clone())
            }
            _ => None,
        };
        match fresh {
            Some(relationships) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(relationships)
            }
            None => {
                // Expired or absent either way; popping an absent key is
                // a no-op
                entries.pop(&key);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a resolved list
    pub fn insert(&self, path: &str, direction: Direction, relationships: Vec<Relationship>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                (path.to_string(), direction),
                CacheEntry {
                    relationships,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every entry for `path`, all direction variants
    pub fn invalidate(&self, path: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            for direction in [Direction::Outgoing, Direction::Incoming, Direction::Both] {
                entries.pop(&(path.to_string(), direction));
            }
            debug!(path, "cache invalidated");
        }
    }

    /// Drop everything
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Hit/miss counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// A store wrapper that adds the read-through cache.
///
/// Reads of `get_for_file` consult the cache; every mutation invalidates
/// the affected paths before returning, so a read issued after a
/// completed write never sees the pre-write value.
pub struct CachedStore<S> {
    inner: S,
    cache: RelationshipCache,
}

impl<S> CachedStore<S> {
    /// Wrap a store with a cache using the given configuration
    pub fn new(inner: S, config: CacheConfig) -> Self {
        Self {
            inner,
            cache: RelationshipCache::new(config),
        }
    }

    /// Access the cache (diagnostics, tests)
    pub fn cache(&self) -> &RelationshipCache {
        &self.cache
    }

    /// Access the wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: RelationshipStore> CachedStore<S> {
    fn invalidate_endpoints(&self, relationships: &[Relationship]) {
        for r in relationships {
            self.cache.invalidate(&r.source_path);
            self.cache.invalidate(&r.target_path);
        }
    }
}

impl<S: RelationshipStore> RelationshipStore for CachedStore<S> {
    type Error = S::Error;

    fn add(&mut self, relationship: Relationship) -> Result<RelationshipId, Self::Error> {
        let source = relationship.source_path.clone();
        let target = relationship.target_path.clone();
        let id = self.inner.add(relationship)?;
        self.cache.invalidate(&source);
        self.cache.invalidate(&target);
        Ok(id)
    }

    fn add_batch(
        &mut self,
        relationships: Vec<Relationship>,
    ) -> Result<Vec<RelationshipId>, Self::Error> {
        let endpoints: Vec<(String, String)> = relationships
            .iter()
            .map(|r| (r.source_path.clone(), r.target_path.clone()))
            .collect();
        let ids = self.inner.add_batch(relationships)?;
        for (source, target) in &endpoints {
            self.cache.invalidate(source);
            self.cache.invalidate(target);
        }
        Ok(ids)
    }

    fn get(&self, id: RelationshipId) -> Result<Option<Relationship>, Self::Error> {
        self.inner.get(id)
    }

    fn get_for_file(
        &self,
        path: &str,
        direction: Direction,
    ) -> Result<Vec<Relationship>, Self::Error> {
        if let Some(cached) = self.cache.get(path, direction) {
            return Ok(cached);
        }
        let relationships = self.inner.get_for_file(path, direction)?;
        self.cache.insert(path, direction, relationships.clone());
        Ok(relationships)
    }

    fn all(&self) -> Result<Vec<Relationship>, Self::Error> {
        self.inner.all()
    }

    fn remove(
        &mut self,
        source: &str,
        target: &str,
        relationship_type: Option<&RelationshipType>,
    ) -> Result<usize, Self::Error> {
        let removed = self.inner.remove(source, target, relationship_type)?;
        self.cache.invalidate(source);
        self.cache.invalidate(target);
        Ok(removed)
    }

    fn remove_for_file(&mut self, path: &str) -> Result<usize, Self::Error> {
        // Partner files' cached lists contain rows that are about to
        // disappear; collect them before the delete.
        let touching = self.inner.get_for_file(path, Direction::Both)?;
        let removed = self.inner.remove_for_file(path)?;
        self.invalidate_endpoints(&touching);
        self.cache.invalidate(path);
        Ok(removed)
    }

    fn update_strength(
        &mut self,
        id: RelationshipId,
        direction: Direction,
        value: f64,
    ) -> Result<(), Self::Error> {
        let endpoints = self
            .inner
            .get(id)?
            .map(|r| (r.source_path, r.target_path));
        self.inner.update_strength(id, direction, value)?;
        if let Some((source, target)) = endpoints {
            self.cache.invalidate(&source);
            self.cache.invalidate(&target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteStore;
    use weft_domain::RelationshipType;

    fn cached_store() -> CachedStore<SqliteStore> {
        CachedStore::new(SqliteStore::open_in_memory().unwrap(), CacheConfig::default())
    }

    fn rel(source: &str, target: &str, strength: f64) -> Relationship {
        Relationship::new(source, target, RelationshipType::Imports, strength, 1.0)
    }

    #[test]
    fn test_read_through_populates_cache() {
        let mut store = cached_store();
        store.add(rel("a.py", "b.py", 0.8)).unwrap();

        let first = store.get_for_file("a.py", Direction::Outgoing).unwrap();
        let second = store.get_for_file("a.py", Direction::Outgoing).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.cache().stats().hits(), 1);
    }

    #[test]
    fn test_update_strength_invalidates_synchronously() {
        let mut store = cached_store();
        let id = store.add(rel("a.py", "b.py", 0.8)).unwrap();

        // Warm the cache
        let before = store.get_for_file("a.py", Direction::Outgoing).unwrap();
        assert_eq!(before[0].forward_strength, 0.8);

        store
            .update_strength(id, Direction::Outgoing, 0.3)
            .unwrap();

        // An immediate read must never return the pre-update value
        let after = store.get_for_file("a.py", Direction::Outgoing).unwrap();
        assert_eq!(after[0].forward_strength, 0.3);
    }

    #[test]
    fn test_remove_for_file_invalidates_partners() {
        let mut store = cached_store();
        store.add(rel("a.py", "c.py", 0.8)).unwrap();
        store.add(rel("b.py", "c.py", 0.6)).unwrap();

        // Warm partner entries
        assert_eq!(
            store.get_for_file("a.py", Direction::Outgoing).unwrap().len(),
            1
        );
        assert_eq!(
            store.get_for_file("b.py", Direction::Outgoing).unwrap().len(),
            1
        );

        store.remove_for_file("c.py").unwrap();

        assert!(store.get_for_file("a.py", Direction::Outgoing).unwrap().is_empty());
        assert!(store.get_for_file("b.py", Direction::Outgoing).unwrap().is_empty());
    }

    #[test]
    fn test_ttl_expiry_is_a_miss() {
        let store = RelationshipCache::new(CacheConfig {
            capacity: 8,
            ttl: Duration::from_millis(0),
        });
        store.insert("a.py", Direction::Both, vec![]);
        std::thread::sleep(Duration::from_millis(2));
        assert!(store.get("a.py", Direction::Both).is_none());
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let cache = RelationshipCache::new(CacheConfig {
            capacity: 2,
            ttl: Duration::from_secs(60),
        });
        cache.insert("a.py", Direction::Both, vec![]);
        cache.insert("b.py", Direction::Both, vec![]);
        // Touch a.py so b.py is the least recently used
        cache.get("a.py", Direction::Both);
        cache.insert("c.py", Direction::Both, vec![]);

        assert!(cache.get("a.py", Direction::Both).is_some());
        assert!(cache.get("b.py", Direction::Both).is_none());
        assert!(cache.get("c.py", Direction::Both).is_some());
    }
}
