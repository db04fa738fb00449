pub mod lru;

/// A point-in-time view of one entry, handed to the policy for victim
/// selection. The policy never sees the value itself.
#[derive(Debug, Clone)]
pub struct Candidate<K> {
  pub key: K,
  /// Size estimate in bytes.
  pub size: u64,
  /// Last access stamp in nanoseconds since the engine epoch.
  pub last_accessed: u64,
  pub access_count: u64,
  /// Insertion order; earlier inserted entries have lower sequences.
  pub sequence: u64,
}

/// The capacity limits a store was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimits {
  pub max_entries: usize,
  pub max_memory_bytes: u64,
}

/// A pure decision function consulted by a [`CacheStore`](crate::CacheStore)
/// when an insert leaves it over one of its limits.
///
/// Implementations hold no mutable state of their own; everything they need
/// arrives in the candidate snapshot. The store removes the returned keys,
/// fires one eviction event per victim, and updates its aggregate size.
pub trait EvictionPolicy<K>: Send + Sync {
  /// Returns the keys to evict, given the current population and limits.
  ///
  /// Called only when `candidates.len() > limits.max_entries` or
  /// `current_bytes > limits.max_memory_bytes`. Returning an empty vector
  /// leaves the store over its limits until the next insert.
  fn select_victims(
    &self,
    candidates: Vec<Candidate<K>>,
    current_bytes: u64,
    limits: &CapacityLimits,
  ) -> Vec<K>;
}
