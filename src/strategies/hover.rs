use super::art_cache_key;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::render::{RecordSource, RenderedArtifact, TokenRenderer};
use crate::store::CacheStore;
use crate::strategy::{PreRenderResult, PreRenderStrategy};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

/// Pre-renders a single record's token when the UI reports a hover.
///
/// The highest-priority strategy: a hovered token is about to be needed.
pub struct HoverArtStrategy {
  renderer: Arc<dyn TokenRenderer>,
  records: Arc<dyn RecordSource>,
  cache: Arc<CacheStore<String, RenderedArtifact>>,
}

impl HoverArtStrategy {
  pub const NAME: &'static str = "hover-art";

  pub fn new(
    renderer: Arc<dyn TokenRenderer>,
    records: Arc<dyn RecordSource>,
    cache: Arc<CacheStore<String, RenderedArtifact>>,
  ) -> Self {
    Self {
      renderer,
      records,
      cache,
    }
  }
}

#[async_trait]
impl PreRenderStrategy for HoverArtStrategy {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn priority(&self) -> i32 {
    10
  }

  fn should_trigger(&self, context: &RenderContext) -> bool {
    matches!(context, RenderContext::Hover { .. })
  }

  async fn pre_render(&self, context: &RenderContext) -> Result<PreRenderResult, RenderError> {
    let RenderContext::Hover { record_id, options } = context else {
      return Ok(PreRenderResult::noop());
    };

    let key = art_cache_key(record_id, options);
    if self.cache.contains(&key) {
      debug!(record = %record_id, "token already cached");
      return Ok(PreRenderResult::ok(0, 1));
    }

    let record = self
      .records
      .record(record_id)
      .ok_or_else(|| RenderError::new(format!("unknown record: {record_id}")))?;

    let artifact = self.renderer.render(&record, options).await?;
    let size = artifact.estimate_bytes();
    self.cache.insert(key, artifact, Some(size));

    Ok(PreRenderResult::ok(1, 0))
  }
}
