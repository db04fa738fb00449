use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Internal, lock-free counter block for a single cache store.
#[derive(Debug, Default)]
pub(crate) struct Stats {
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) evictions: CachePadded<AtomicU64>,
  pub(crate) invalidations: CachePadded<AtomicU64>,
}

impl Stats {
  /// Creates a point-in-time snapshot, combining the counters with the
  /// store's current entry count and aggregate size.
  pub(crate) fn snapshot(&self, entry_count: usize, total_bytes: u64) -> CacheStats {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    CacheStats {
      entry_count,
      total_bytes,
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      evictions: self.evictions.load(Ordering::Relaxed),
      invalidations: self.invalidations.load(Ordering::Relaxed),
    }
  }
}

/// A read-only, point-in-time snapshot of a store's statistics.
///
/// Recomputed on demand; never independently mutated.
#[derive(Clone, PartialEq)]
pub struct CacheStats {
  /// The number of live entries.
  pub entry_count: usize,
  /// The aggregate size estimate of all live entries, in bytes.
  pub total_bytes: u64,
  /// The number of successful lookups.
  pub hits: u64,
  /// The number of failed lookups.
  pub misses: u64,
  /// hits / (hits + misses), or 0.0 before any lookup.
  pub hit_ratio: f64,
  /// The total number of insertions.
  pub inserts: u64,
  /// The number of entries removed by the eviction policy.
  pub evictions: u64,
  /// The number of entries removed manually or by invalidation.
  pub invalidations: u64,
}

impl fmt::Debug for CacheStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheStats")
      .field("entry_count", &self.entry_count)
      .field("total_bytes", &self.total_bytes)
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("evictions", &self.evictions)
      .field("invalidations", &self.invalidations)
      .finish()
  }
}
