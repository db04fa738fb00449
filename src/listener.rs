use std::fmt;
use std::time::Duration;

/// Describes the reason an entry was removed from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
  /// The entry was removed because the store exceeded a capacity limit.
  Capacity,
  /// The entry was removed by an explicit `remove` call.
  Manual,
  /// The entry was removed by `clear`, typically from an invalidation.
  Invalidated,
}

impl fmt::Display for EvictionReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionReason::Capacity => write!(f, "evicted due to capacity"),
      EvictionReason::Manual => write!(f, "removed manually"),
      EvictionReason::Invalidated => write!(f, "cleared by invalidation"),
    }
  }
}

/// Emitted exactly once per evicted entry, after the entry has been removed.
#[derive(Debug, Clone)]
pub struct EvictionEvent<K> {
  pub key: K,
  pub reason: EvictionReason,
  /// The size estimate the entry carried.
  pub size: u64,
  /// When the entry was last read, relative to the engine epoch.
  pub last_accessed: Duration,
  /// How many times the entry was read.
  pub access_count: u64,
}

/// A listener that receives a notification for every evicted entry.
///
/// Listeners are called synchronously from the store operation that removed
/// the entry, so they should be cheap; heavy consumers should hand the event
/// off to their own queue.
pub trait EvictionListener<K>: Send + Sync {
  fn on_evict(&self, event: EvictionEvent<K>);
}

impl<K, F> EvictionListener<K> for F
where
  F: Fn(EvictionEvent<K>) + Send + Sync,
{
  fn on_evict(&self, event: EvictionEvent<K>) {
    self(event)
  }
}
