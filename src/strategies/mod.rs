//! Shipped pre-render strategies.
//!
//! Each strategy owns the cache it writes into and registers with the
//! manager under a stable name; the manager routes contexts to whichever
//! strategy claims them at the highest priority.

mod collection;
mod hover;
mod roster;

pub use collection::CollectionSheetStrategy;
pub use hover::HoverArtStrategy;
pub use roster::RosterArtStrategy;

use crate::render::RenderOptions;

/// The cache key for one rendered token: record identity plus the option
/// set that reproduces the artifact.
pub fn art_cache_key(record_id: &str, options: &RenderOptions) -> String {
  format!("{record_id}:{}", options.cache_key())
}
