use super::art_cache_key;
use crate::context::RenderContext;
use crate::error::RenderError;
use crate::render::{RecordSource, RenderedArtifact, TokenRenderer};
use crate::store::CacheStore;
use crate::strategy::{PreRenderResult, PreRenderStrategy};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Pre-renders every token in an ordered roster list, best-effort.
///
/// Per-item failures are isolated: a bad record is counted and the batch
/// moves on. Declared non-reentrant because two overlapping roster sweeps
/// would render the same artwork twice for no benefit.
pub struct RosterArtStrategy {
  renderer: Arc<dyn TokenRenderer>,
  records: Arc<dyn RecordSource>,
  cache: Arc<CacheStore<String, RenderedArtifact>>,
}

impl RosterArtStrategy {
  pub const NAME: &'static str = "roster-art";

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
impl PreRenderStrategy for RosterArtStrategy {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn priority(&self) -> i32 {
    5
  }

  fn reentrant(&self) -> bool {
    false
  }

  fn should_trigger(&self, context: &RenderContext) -> bool {
    matches!(context, RenderContext::Roster { .. })
  }

  async fn pre_render(&self, context: &RenderContext) -> Result<PreRenderResult, RenderError> {
    let RenderContext::Roster {
      record_ids, options, ..
    } = context
    else {
      return Ok(PreRenderResult::noop());
    };

    let mut rendered = 0;
    let mut skipped = 0;
    let mut failures = 0;
    let mut first_error = None;

    for record_id in record_ids {
      let key = art_cache_key(record_id, options);
      if self.cache.contains(&key) {
        skipped += 1;
        continue;
      }

      let Some(record) = self.records.record(record_id) else {
        warn!(record = %record_id, "roster entry has no record, skipping");
        failures += 1;
        first_error.get_or_insert_with(|| format!("unknown record: {record_id}"));
        continue;
      };

      match self.renderer.render(&record, options).await {
        Ok(artifact) => {
          let size = artifact.estimate_bytes();
          self.cache.insert(key, artifact, Some(size));
          rendered += 1;
        }
        Err(error) => {
          warn!(record = %record_id, %error, "roster render failed, continuing");
          failures += 1;
          first_error.get_or_insert_with(|| error.to_string());
        }
      }
    }

    debug!(rendered, skipped, failures, "roster sweep done");
    Ok(PreRenderResult::partial(rendered, skipped, failures, first_error))
  }
}
