use crate::entry::CacheEntry;
use crate::error::BuildError;
use crate::listener::{EvictionEvent, EvictionListener, EvictionReason};
use crate::policy::lru::LruPolicy;
use crate::policy::{Candidate, CapacityLimits, EvictionPolicy};
use crate::stats::{CacheStats, Stats};
use crate::time;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

/// Capacity configuration for a [`CacheStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
  /// The maximum number of live entries.
  pub max_entries: usize,
  /// The maximum aggregate size estimate, in bytes.
  pub max_memory_bytes: u64,
  /// The fraction of entries the default policy evicts per over-count batch.
  pub eviction_ratio: f64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      max_entries: 256,
      max_memory_bytes: 64 * 1024 * 1024,
      eviction_ratio: LruPolicy::DEFAULT_EVICTION_RATIO,
    }
  }
}

impl CacheConfig {
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.max_entries == 0 {
      return Err(BuildError::ZeroMaxEntries);
    }
    if self.max_memory_bytes == 0 {
      return Err(BuildError::ZeroMemoryLimit);
    }
    if !(self.eviction_ratio > 0.0 && self.eviction_ratio <= 1.0) {
      return Err(BuildError::InvalidEvictionRatio(self.eviction_ratio));
    }
    Ok(())
  }
}

struct StoreInner<K, V> {
  map: HashMap<K, CacheEntry<V>, ahash::RandomState>,
  total_bytes: u64,
  next_sequence: u64,
}

/// A generic bounded key/value store.
///
/// `insert` consults the bound [`EvictionPolicy`] whenever the post-insert
/// state exceeds a configured limit, so the capacity bounds hold after every
/// insert completes. The map mutation, the aggregate size update and the
/// victim selection all happen under one lock, so no two logically
/// concurrent inserts can interleave their size accounting.
pub struct CacheStore<K, V> {
  inner: Mutex<StoreInner<K, V>>,
  stats: Stats,
  limits: CapacityLimits,
  policy: Arc<dyn EvictionPolicy<K>>,
  listener: Option<Arc<dyn EvictionListener<K>>>,
}

impl<K, V> fmt::Debug for CacheStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.inner.lock();
    f.debug_struct("CacheStore")
      .field("entry_count", &inner.map.len())
      .field("total_bytes", &inner.total_bytes)
      .field("limits", &self.limits)
      .finish_non_exhaustive()
  }
}

impl<K, V> CacheStore<K, V>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  /// Creates a store with the default LRU policy.
  pub fn new(config: CacheConfig) -> Result<Self, BuildError> {
    let ratio = config.eviction_ratio;
    Self::with_policy(config, Arc::new(LruPolicy::with_ratio(ratio)?))
  }

  /// Creates a store with a custom eviction policy.
  pub fn with_policy(
    config: CacheConfig,
    policy: Arc<dyn EvictionPolicy<K>>,
  ) -> Result<Self, BuildError> {
    config.validate()?;
    Ok(Self {
      inner: Mutex::new(StoreInner {
        map: HashMap::default(),
        total_bytes: 0,
        next_sequence: 0,
      }),
      stats: Stats::default(),
      limits: CapacityLimits {
        max_entries: config.max_entries,
        max_memory_bytes: config.max_memory_bytes,
      },
      policy,
      listener: None,
    })
  }

  /// Sets the eviction listener for this store.
  pub fn eviction_listener<L>(mut self, listener: L) -> Self
  where
    L: EvictionListener<K> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Retrieves a value, updating the entry's recency stamp and access count.
  pub fn get(&self, key: &K) -> Option<Arc<V>> {
    let inner = self.inner.lock();
    match inner.map.get(key) {
      Some(entry) => {
        entry.touch();
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value())
      }
      None => {
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
      }
    }
  }

  /// Returns whether a key is present, without touching recency.
  pub fn contains(&self, key: &K) -> bool {
    self.inner.lock().map.contains_key(key)
  }

  /// Inserts a value, evicting victims if the store ends up over a limit.
  ///
  /// The size estimate is fixed before insertion: `size_hint` if given,
  /// otherwise `size_of::<V>()`. Inserting over an existing key replaces
  /// the entry and its size contribution.
  pub fn insert(&self, key: K, value: V, size_hint: Option<u64>) {
    let size = size_hint.unwrap_or(mem::size_of::<V>() as u64);
    let mut events = Vec::new();

    {
      let mut inner = self.inner.lock();
      let sequence = inner.next_sequence;
      inner.next_sequence += 1;

      let entry = CacheEntry::new(value, size, sequence);
      if let Some(old) = inner.map.insert(key, entry) {
        inner.total_bytes = inner.total_bytes.saturating_sub(old.size_estimate());
      }
      inner.total_bytes += size;
      self.stats.inserts.fetch_add(1, Ordering::Relaxed);

      if inner.map.len() > self.limits.max_entries || inner.total_bytes > self.limits.max_memory_bytes
      {
        let candidates = inner
          .map
          .iter()
          .map(|(k, e)| Candidate {
            key: k.clone(),
            size: e.size_estimate(),
            last_accessed: e.last_accessed(),
            access_count: e.access_count(),
            sequence: e.sequence(),
          })
          .collect();

        let victims = self
          .policy
          .select_victims(candidates, inner.total_bytes, &self.limits);

        for victim in victims {
          if let Some(entry) = inner.map.remove(&victim) {
            inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_estimate());
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            events.push(EvictionEvent {
              key: victim,
              reason: EvictionReason::Capacity,
              size: entry.size_estimate(),
              last_accessed: time::nanos_to_duration(entry.last_accessed()),
              access_count: entry.access_count(),
            });
          }
        }
      }
    }

    // Fired outside the lock so listeners may touch the store.
    self.notify(events);
  }

  /// Removes an entry. A no-op returning `false` when the key is absent.
  pub fn remove(&self, key: &K) -> bool {
    let event = {
      let mut inner = self.inner.lock();
      match inner.map.remove(key) {
        Some(entry) => {
          inner.total_bytes = inner.total_bytes.saturating_sub(entry.size_estimate());
          self
            .stats
            .invalidations
            .fetch_add(1, Ordering::Relaxed);
          Some(EvictionEvent {
            key: key.clone(),
            reason: EvictionReason::Manual,
            size: entry.size_estimate(),
            last_accessed: time::nanos_to_duration(entry.last_accessed()),
            access_count: entry.access_count(),
          })
        }
        None => None,
      }
    };

    match event {
      Some(event) => {
        self.notify(vec![event]);
        true
      }
      None => false,
    }
  }

  /// Removes every entry, firing one `Invalidated` event per entry.
  pub fn clear(&self) {
    let events: Vec<_> = {
      let mut inner = self.inner.lock();
      let drained: Vec<_> = inner.map.drain().collect();
      inner.total_bytes = 0;
      self
        .stats
        .invalidations
        .fetch_add(drained.len() as u64, Ordering::Relaxed);
      drained
        .into_iter()
        .map(|(key, entry)| EvictionEvent {
          key,
          reason: EvictionReason::Invalidated,
          size: entry.size_estimate(),
          last_accessed: time::nanos_to_duration(entry.last_accessed()),
          access_count: entry.access_count(),
        })
        .collect()
    };

    self.notify(events);
  }

  /// A point-in-time statistics snapshot.
  pub fn stats(&self) -> CacheStats {
    let inner = self.inner.lock();
    self.stats.snapshot(inner.map.len(), inner.total_bytes)
  }

  pub fn len(&self) -> usize {
    self.inner.lock().map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().map.is_empty()
  }

  fn notify(&self, events: Vec<EvictionEvent<K>>) {
    if let Some(listener) = &self.listener {
      for event in events {
        listener.on_evict(event);
      }
    }
  }
}

/// Object-safe administrative view of a store, used by the manager's cache
/// registry so heterogeneously typed stores can be cleared and inspected
/// by name.
pub trait CacheAdmin: Send + Sync {
  fn clear(&self);
  fn stats(&self) -> CacheStats;
}

impl<K, V> CacheAdmin for CacheStore<K, V>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn clear(&self) {
    CacheStore::clear(self)
  }

  fn stats(&self) -> CacheStats {
    CacheStore::stats(self)
  }
}
