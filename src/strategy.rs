use crate::context::RenderContext;
use crate::error::RenderError;

use async_trait::async_trait;

/// The transient outcome of one pre-render operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreRenderResult {
  pub success: bool,
  /// How many artifacts were rendered and written to a cache.
  pub rendered: usize,
  /// How many items were skipped, e.g. because they were already cached.
  pub skipped: usize,
  pub error: Option<String>,
}

impl PreRenderResult {
  pub fn ok(rendered: usize, skipped: usize) -> Self {
    Self {
      success: true,
      rendered,
      skipped,
      error: None,
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      rendered: 0,
      skipped: 0,
      error: Some(error.into()),
    }
  }

  /// The cache-hit-equivalent response: nothing to do, nothing done.
  pub fn noop() -> Self {
    Self::ok(0, 0)
  }

  /// A best-effort batch outcome: success when no item failed, with the
  /// first error carried for diagnostics.
  pub fn partial(rendered: usize, skipped: usize, failures: usize, first_error: Option<String>) -> Self {
    Self {
      success: failures == 0,
      rendered,
      skipped,
      error: first_error,
    }
  }
}

/// A pluggable unit of pre-render work.
///
/// A strategy judges whether a context is relevant to it, at what priority,
/// and performs the render. Strategies write successful results into their
/// own bound [`CacheStore`](crate::CacheStore); the manager never touches
/// strategy-owned cache contents directly.
#[async_trait]
pub trait PreRenderStrategy: Send + Sync {
  /// Unique registry name.
  fn name(&self) -> &str;

  /// Higher priority wins when several strategies claim the same context.
  fn priority(&self) -> i32;

  /// Whether the strategy may run concurrently with itself under differing
  /// operation keys. Non-reentrant strategies get a no-op response while a
  /// run is active.
  fn reentrant(&self) -> bool {
    true
  }

  /// Whether this strategy applies to the given context.
  fn should_trigger(&self, context: &RenderContext) -> bool;

  /// Performs the render. An `Err` is caught by the manager and converted
  /// into a failed result; it never reaches the `pre_render` caller.
  async fn pre_render(&self, context: &RenderContext) -> Result<PreRenderResult, RenderError>;
}

/// Manager lifecycle notifications, one per operation phase.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
  Started {
    strategy: String,
    operation_key: String,
  },
  Completed {
    strategy: String,
    operation_key: String,
    result: PreRenderResult,
  },
  Failed {
    strategy: String,
    operation_key: String,
    error: String,
  },
}

impl LifecycleEvent {
  pub fn strategy(&self) -> &str {
    match self {
      LifecycleEvent::Started { strategy, .. }
      | LifecycleEvent::Completed { strategy, .. }
      | LifecycleEvent::Failed { strategy, .. } => strategy,
    }
  }
}
