use crate::error::RenderError;

use async_trait::async_trait;

/// The structured input a token is rendered from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputRecord {
  pub id: String,
  pub name: String,
  /// Reference to the record's artwork: an asset filename or an external URL.
  pub image_ref: Option<String>,
  /// The collection the record belongs to, if any.
  pub collection_id: Option<String>,
}

/// The shape a token is composed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenShape {
  Round,
  Square,
}

/// The reproducible option set for one render. Two renders with the same
/// record and options produce interchangeable artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOptions {
  pub shape: TokenShape,
  pub size_px: u32,
  /// Whether the name banner and decorative overlays are drawn.
  pub decorated: bool,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      shape: TokenShape::Round,
      size_px: 256,
      decorated: true,
    }
  }
}

impl RenderOptions {
  /// A short stable key fragment distinguishing this option set, used in
  /// cache keys and operation keys.
  pub fn cache_key(&self) -> String {
    let shape = match self.shape {
      TokenShape::Round => "r",
      TokenShape::Square => "s",
    };
    format!("{}{}{}", shape, self.size_px, if self.decorated { "d" } else { "p" })
  }
}

/// The output of the external drawing pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedArtifact {
  pub width: u32,
  pub height: u32,
  pub bytes: Vec<u8>,
}

impl RenderedArtifact {
  /// The size estimate handed to the cache store on insert.
  pub fn estimate_bytes(&self) -> u64 {
    (self.bytes.len() + std::mem::size_of::<Self>()) as u64
  }
}

/// The external render producer.
///
/// The engine guarantees no duplicate concurrent calls for the same
/// identity; implementations must tolerate concurrent calls for different
/// identities.
#[async_trait]
pub trait TokenRenderer: Send + Sync {
  async fn render(
    &self,
    record: &InputRecord,
    options: &RenderOptions,
  ) -> Result<RenderedArtifact, RenderError>;
}

/// Resolves an image reference to a displayable URL.
///
/// Must tolerate already-resolved or external values by passing them
/// through unchanged.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
  async fn resolve(&self, reference: &str, scope_id: Option<&str>) -> Result<String, RenderError>;
}

/// Encodes raw thumbnail bytes into the small string form the thumbnail
/// cache stores (e.g. a data URL). Synchronous; called from inside an idle
/// slice, so it must be cheap per item.
pub trait ThumbnailEncoder: Send + Sync {
  fn encode(&self, bytes: &[u8]) -> String;
}

/// Synchronous lookup of input records by id, owned by the data layer.
pub trait RecordSource: Send + Sync {
  fn record(&self, id: &str) -> Option<InputRecord>;
}

/// Synchronous lookup of the records belonging to a collection.
pub trait CollectionSource: Send + Sync {
  fn records(&self, collection_id: &str) -> Vec<InputRecord>;
}
