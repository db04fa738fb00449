use super::art_cache_key;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::render::{CollectionSource, RenderedArtifact, TokenRenderer};
use crate::store::CacheStore;
use crate::strategy::{PreRenderResult, PreRenderStrategy};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Pre-renders the tokens that make up a collection's sheet.
///
/// The record list is resolved from the collection rather than passed in,
/// so the cache key scopes each artifact under its collection id.
pub struct CollectionSheetStrategy {
  renderer: Arc<dyn TokenRenderer>,
  collections: Arc<dyn CollectionSource>,
  cache: Arc<CacheStore<String, RenderedArtifact>>,
}

impl CollectionSheetStrategy {
  pub const NAME: &'static str = "collection-sheets";

  pub fn new(
    renderer: Arc<dyn TokenRenderer>,
    collections: Arc<dyn CollectionSource>,
    cache: Arc<CacheStore<String, RenderedArtifact>>,
  ) -> Self {
    Self {
      renderer,
      collections,
      cache,
    }
  }
}

#[async_trait]
impl PreRenderStrategy for CollectionSheetStrategy {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn priority(&self) -> i32 {
    3
  }

  fn should_trigger(&self, context: &RenderContext) -> bool {
    matches!(context, RenderContext::Collection { .. })
  }

  async fn pre_render(&self, context: &RenderContext) -> Result<PreRenderResult, RenderError> {
    let RenderContext::Collection {
      collection_id,
      options,
    } = context
    else {
      return Ok(PreRenderResult::noop());
    };

    let records = self.collections.records(collection_id);
    if records.is_empty() {
      debug!(collection = %collection_id, "collection has no records");
      return Ok(PreRenderResult::noop());
    }

    let mut rendered = 0;
    let mut skipped = 0;
    let mut failures = 0;
    let mut first_error = None;

    for record in records {
      let key = format!("{collection_id}/{}", art_cache_key(&record.id, options));
      if self.cache.contains(&key) {
        skipped += 1;
        continue;
      }

      match self.renderer.render(&record, options).await {
        Ok(artifact) => {
          let size = artifact.estimate_bytes();
          self.cache.insert(key, artifact, Some(size));
          rendered += 1;
        }
        Err(error) => {
          warn!(collection = %collection_id, record = %record.id, %error, "sheet render failed, continuing");
          failures += 1;
          first_error.get_or_insert_with(|| error.to_string());
        }
      }
    }

    Ok(PreRenderResult::partial(rendered, skipped, failures, first_error))
  }
}
