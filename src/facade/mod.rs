mod ordering;
mod refs;
mod thumbs;

pub use ordering::structural_hash;
pub use refs::ReferenceRequest;
pub use thumbs::ThumbnailJob;

use crate::error::BuildError;
use crate::idle::IdleScheduler;
use crate::render::{ReferenceResolver, ThumbnailEncoder};
use crate::stats::CacheStats;
use crate::store::{CacheConfig, CacheStore};

use ordering::OrderingCache;
use refs::ReferenceCache;
use thumbs::ThumbnailCache;

use std::sync::Arc;

/// The logical tabs the façade pre-renders for; `clear` is scoped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  /// The roster tab: the precomputed ordering.
  Roster,
  /// The token gallery tab: encoded thumbnails.
  Thumbnails,
  /// The handout tab: resolved display references.
  References,
}

/// Configuration for the façade's purpose-built caches.
#[derive(Debug, Clone)]
pub struct TabServiceConfig {
  pub thumbnail_cache: CacheConfig,
  pub reference_cache: CacheConfig,
  /// The maximum number of thumbnails encoded per idle slice.
  pub per_slice_cap: usize,
}

impl Default for TabServiceConfig {
  fn default() -> Self {
    Self {
      thumbnail_cache: CacheConfig::default(),
      reference_cache: CacheConfig::default(),
      per_slice_cap: 20,
    }
  }
}

/// The tab-hover pre-render service.
///
/// Owns three bespoke caches that do not fit the generic strategy model
/// because each has a distinct validity rule: a structurally hash-validated
/// ordering slot, a cooperatively batch-encoded thumbnail cache, and a
/// best-effort resolved-reference cache. Cache failures here degrade
/// performance, never correctness: a caller finding nothing simply renders
/// synchronously.
pub struct TabPreRenderService {
  ordering: OrderingCache,
  thumbnails: ThumbnailCache,
  references: ReferenceCache,
}

impl TabPreRenderService {
  pub fn new(
    resolver: Arc<dyn ReferenceResolver>,
    encoder: Arc<dyn ThumbnailEncoder>,
    scheduler: Arc<dyn IdleScheduler>,
    config: TabServiceConfig,
  ) -> Result<Self, BuildError> {
    let thumbnail_store = Arc::new(CacheStore::new(config.thumbnail_cache)?);
    let reference_store = Arc::new(CacheStore::new(config.reference_cache)?);

    Ok(Self {
      ordering: OrderingCache::new(),
      thumbnails: ThumbnailCache::new(
        thumbnail_store,
        encoder,
        scheduler,
        config.per_slice_cap,
      ),
      references: ReferenceCache::new(reference_store, resolver),
    })
  }

  // --- Ordering (structural-result cache) ---

  /// Stores an ordering computed from `input_ids`, hash-validated on read.
  pub fn store_ordering<S: AsRef<str>>(&self, input_ids: &[S], ordering: Vec<String>) {
    self.ordering.store(input_ids, ordering);
  }

  /// The stored ordering, only if it was computed from exactly this input
  /// in exactly this order.
  pub fn ordering<S: AsRef<str>>(&self, current_ids: &[S]) -> Option<Arc<Vec<String>>> {
    self.ordering.get(current_ids)
  }

  pub fn has_ordering<S: AsRef<str>>(&self, current_ids: &[S]) -> bool {
    self.ordering.has(current_ids)
  }

  // --- Thumbnails (small-binary cache) ---

  /// Starts a cooperative batch encode. Returns `false` when a run is
  /// already active, which callers treat as a hit.
  pub fn encode_thumbnails(&self, jobs: Vec<ThumbnailJob>) -> bool {
    self.thumbnails.encode_batch(jobs)
  }

  pub fn thumbnail(&self, filename: &str) -> Option<Arc<String>> {
    self.thumbnails.store().get(&filename.to_string())
  }

  pub fn has_thumbnail(&self, filename: &str) -> bool {
    self.thumbnails.store().contains(&filename.to_string())
  }

  /// The thumbnail store, for registering with a manager's cache registry.
  pub fn thumbnail_store(&self) -> Arc<CacheStore<String, String>> {
    self.thumbnails.store().clone()
  }

  pub fn thumbnail_stats(&self) -> CacheStats {
    self.thumbnails.store().stats()
  }

  // --- References (resolved-reference cache) ---

  /// Resolves every uncached reference, best-effort. Failed items fall back
  /// to their raw value.
  pub async fn resolve_references(
    &self,
    requests: Vec<ReferenceRequest>,
    scope_id: Option<&str>,
  ) -> usize {
    self.references.resolve_batch(requests, scope_id).await
  }

  pub fn reference(&self, entity_id: &str) -> Option<Arc<String>> {
    self.references.store().get(&entity_id.to_string())
  }

  pub fn has_reference(&self, entity_id: &str) -> bool {
    self.references.store().contains(&entity_id.to_string())
  }

  pub fn reference_store(&self) -> Arc<CacheStore<String, String>> {
    self.references.store().clone()
  }

  pub fn reference_stats(&self) -> CacheStats {
    self.references.store().stats()
  }

  // --- Scoped clearing ---

  /// Clears only the cache backing the given tab.
  pub fn clear(&self, tab: Tab) {
    match tab {
      Tab::Roster => self.ordering.clear(),
      Tab::Thumbnails => self.thumbnails.store().clear(),
      Tab::References => self.references.store().clear(),
    }
  }

  pub fn clear_all(&self) {
    self.ordering.clear();
    self.thumbnails.store().clear();
    self.references.store().clear();
  }
}
