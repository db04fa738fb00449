use crate::time;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A container for a cached value, holding all bookkeeping metadata.
///
/// Entries are owned exclusively by their [`CacheStore`](crate::CacheStore)
/// and are only ever mutated through store operations.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The cached value, wrapped in an `Arc` for shared ownership.
  value: Arc<V>,
  /// The size estimate in bytes, fixed before insertion.
  size_estimate: u64,
  /// The last access timestamp in nanoseconds since the engine epoch.
  last_accessed: AtomicU64,
  /// How many times the entry has been read.
  access_count: AtomicU64,
  /// Insertion order, used by policies to break recency ties.
  sequence: u64,
}

impl<V> CacheEntry<V> {
  pub(crate) fn new(value: V, size_estimate: u64, sequence: u64) -> Self {
    Self {
      value: Arc::new(value),
      size_estimate,
      last_accessed: AtomicU64::new(time::now_nanos()),
      access_count: AtomicU64::new(0),
      sequence,
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  #[inline]
  pub(crate) fn size_estimate(&self) -> u64 {
    self.size_estimate
  }

  #[inline]
  pub(crate) fn sequence(&self) -> u64 {
    self.sequence
  }

  /// Records a read: bumps the access count and refreshes the recency stamp.
  #[inline]
  pub(crate) fn touch(&self) {
    self.access_count.fetch_add(1, Ordering::Relaxed);
    self.last_accessed.store(time::now_nanos(), Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn last_accessed(&self) -> u64 {
    self.last_accessed.load(Ordering::Relaxed)
  }

  #[inline]
  pub(crate) fn access_count(&self) -> u64 {
    self.access_count.load(Ordering::Relaxed)
  }
}
