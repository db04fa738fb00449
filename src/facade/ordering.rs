use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

// Seeded once per process so hashes are comparable across calls but not
// across runs.
static HASH_STATE: Lazy<ahash::RandomState> = Lazy::new(ahash::RandomState::new);

/// An order-sensitive hash over an identity list. Any change to membership
/// or position produces a different hash.
pub fn structural_hash<S: AsRef<str>>(ids: &[S]) -> u64 {
  let mut hasher = HASH_STATE.build_hasher();
  hasher.write_usize(ids.len());
  for id in ids {
    let bytes = id.as_ref().as_bytes();
    hasher.write_usize(bytes.len());
    hasher.write(bytes);
  }
  hasher.finish()
}

/// A single-slot cache for a precomputed ordering, validated structurally.
///
/// The slot carries the hash of the input it was computed from; a hit
/// requires the current input to hash identically. Any difference, including
/// two elements swapping position, is a full miss.
pub(crate) struct OrderingCache {
  slot: Mutex<Option<(u64, Arc<Vec<String>>)>>,
}

impl OrderingCache {
  pub(crate) fn new() -> Self {
    Self {
      slot: Mutex::new(None),
    }
  }

  /// Stores an ordering computed from `input_ids`.
  pub(crate) fn store<S: AsRef<str>>(&self, input_ids: &[S], ordering: Vec<String>) {
    let hash = structural_hash(input_ids);
    *self.slot.lock() = Some((hash, Arc::new(ordering)));
  }

  /// Returns the stored ordering if it was computed from exactly this input.
  pub(crate) fn get<S: AsRef<str>>(&self, current_ids: &[S]) -> Option<Arc<Vec<String>>> {
    let slot = self.slot.lock();
    match &*slot {
      Some((hash, ordering)) if *hash == structural_hash(current_ids) => Some(ordering.clone()),
      _ => None,
    }
  }

  pub(crate) fn has<S: AsRef<str>>(&self, current_ids: &[S]) -> bool {
    self.get(current_ids).is_some()
  }

  pub(crate) fn clear(&self) {
    *self.slot.lock() = None;
  }
}
