use super::{Candidate, CapacityLimits, EvictionPolicy};
use crate::error::BuildError;

/// An eviction policy that evicts the least recently used entries.
///
/// When the entry-count limit is exceeded, a batch of
/// `max(1, floor(count * eviction_ratio))` victims is selected in one pass,
/// which amortizes selection cost under high insert rates. When the memory
/// limit is exceeded, the oldest entries are taken one by one until the
/// store fits again. Equal recency stamps are broken by insertion order,
/// earliest inserted first.
#[derive(Debug, Clone)]
pub struct LruPolicy {
  eviction_ratio: f64,
}

impl LruPolicy {
  pub const DEFAULT_EVICTION_RATIO: f64 = 0.25;

  pub fn new() -> Self {
    Self {
      eviction_ratio: Self::DEFAULT_EVICTION_RATIO,
    }
  }

  /// Creates a policy with a custom eviction ratio in `(0, 1]`.
  pub fn with_ratio(eviction_ratio: f64) -> Result<Self, BuildError> {
    if !(eviction_ratio > 0.0 && eviction_ratio <= 1.0) {
      return Err(BuildError::InvalidEvictionRatio(eviction_ratio));
    }
    Ok(Self { eviction_ratio })
  }
}

impl Default for LruPolicy {
  fn default() -> Self {
    Self::new()
  }
}

impl<K> EvictionPolicy<K> for LruPolicy
where
  K: Send + Sync,
{
  fn select_victims(
    &self,
    mut candidates: Vec<Candidate<K>>,
    current_bytes: u64,
    limits: &CapacityLimits,
  ) -> Vec<K> {
    // Oldest first; ties broken by insertion order.
    candidates.sort_by(|a, b| {
      a.last_accessed
        .cmp(&b.last_accessed)
        .then(a.sequence.cmp(&b.sequence))
    });

    let count = candidates.len();
    let mut victims = Vec::new();
    let mut remaining_bytes = current_bytes;
    let mut drain = candidates.into_iter();

    if count > limits.max_entries {
      let batch = ((count as f64 * self.eviction_ratio).floor() as usize).max(1);
      for candidate in drain.by_ref().take(batch) {
        remaining_bytes = remaining_bytes.saturating_sub(candidate.size);
        victims.push(candidate.key);
      }
    }

    // The ratio batch may not be enough to satisfy the memory limit, and a
    // memory-triggered call skips the batch entirely.
    while remaining_bytes > limits.max_memory_bytes {
      match drain.next() {
        Some(candidate) => {
          remaining_bytes = remaining_bytes.saturating_sub(candidate.size);
          victims.push(candidate.key);
        }
        None => break,
      }
    }

    victims
  }
}
