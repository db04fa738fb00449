use crate::render::ReferenceResolver;
use crate::store::CacheStore;

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

/// A reference to resolve for one entity.
#[derive(Debug, Clone)]
pub struct ReferenceRequest {
  /// The stable entity id the resolved value is keyed by.
  pub entity_id: String,
  /// The raw reference; also the fallback value when resolution fails.
  pub reference: String,
}

/// The resolved-reference cache, populated asynchronously and best-effort.
///
/// A failed resolution falls back to the raw reference value rather than
/// leaving the entry unset, so consumers always find something displayable.
pub(crate) struct ReferenceCache {
  store: Arc<CacheStore<String, String>>,
  resolver: Arc<dyn ReferenceResolver>,
}

impl ReferenceCache {
  pub(crate) fn new(
    store: Arc<CacheStore<String, String>>,
    resolver: Arc<dyn ReferenceResolver>,
  ) -> Self {
    Self { store, resolver }
  }

  pub(crate) fn store(&self) -> &Arc<CacheStore<String, String>> {
    &self.store
  }

  /// Resolves every uncached request concurrently. Returns how many entries
  /// were newly populated; per-item failures do not fail the batch.
  pub(crate) async fn resolve_batch(
    &self,
    requests: Vec<ReferenceRequest>,
    scope_id: Option<&str>,
  ) -> usize {
    let pending: Vec<_> = requests
      .into_iter()
      .filter(|request| !self.store.contains(&request.entity_id))
      .collect();
    if pending.is_empty() {
      return 0;
    }

    debug!(items = pending.len(), "resolving references");
    let resolutions = join_all(pending.iter().map(|request| {
      let resolver = self.resolver.clone();
      async move { resolver.resolve(&request.reference, scope_id).await }
    }))
    .await;

    let mut populated = 0;
    for (request, resolution) in pending.into_iter().zip(resolutions) {
      let value = match resolution {
        Ok(url) => url,
        Err(error) => {
          warn!(entity = %request.entity_id, %error, "reference resolution failed, using raw value");
          request.reference
        }
      };
      let size = value.len() as u64;
      self.store.insert(request.entity_id, value, Some(size));
      populated += 1;
    }
    populated
  }
}
