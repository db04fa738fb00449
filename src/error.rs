use thiserror::Error;

/// Errors that can occur when constructing a cache store or eviction policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
  /// The store was configured with an entry limit of zero.
  #[error("bounded store entry limit cannot be zero")]
  ZeroMaxEntries,
  /// The store was configured with a memory limit of zero bytes.
  #[error("bounded store memory limit cannot be zero bytes")]
  ZeroMemoryLimit,
  /// The eviction ratio must lie in the half-open interval (0, 1].
  #[error("eviction ratio must be in (0, 1], got {0}")]
  InvalidEvictionRatio(f64),
}

/// An error produced by an external collaborator (renderer or resolver).
///
/// The engine never propagates these to `pre_render` callers; they are
/// converted into failed [`PreRenderResult`](crate::PreRenderResult)s.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
  pub fn new(message: impl Into<String>) -> Self {
    Self(message.into())
  }
}

impl From<&str> for RenderError {
  fn from(message: &str) -> Self {
    Self(message.to_string())
  }
}
