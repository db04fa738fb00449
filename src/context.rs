use crate::render::RenderOptions;

/// The immutable request value a UI trigger hands to the engine.
///
/// Each variant carries exactly the identity needed to reproduce the render;
/// strategies pattern-match on the variant in `should_trigger` instead of
/// probing optional fields. Contexts are never stored by the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderContext {
  /// A single record's token, typically triggered on hover or focus.
  Hover {
    record_id: String,
    options: RenderOptions,
  },
  /// An ordered list of records, typically a roster tab becoming visible.
  Roster {
    record_ids: Vec<String>,
    options: RenderOptions,
    collection_id: Option<String>,
  },
  /// A collection-scoped composite sheet.
  Collection {
    collection_id: String,
    options: RenderOptions,
  },
}

impl RenderContext {
  /// The stable discriminant name, used in operation keys and logging.
  pub fn kind(&self) -> &'static str {
    match self {
      RenderContext::Hover { .. } => "hover",
      RenderContext::Roster { .. } => "roster",
      RenderContext::Collection { .. } => "collection",
    }
  }

  /// The distinguishing identity fields, joined into one key fragment.
  pub(crate) fn identity(&self) -> String {
    match self {
      RenderContext::Hover { record_id, options } => {
        format!("{record_id}:{}", options.cache_key())
      }
      RenderContext::Roster {
        record_ids,
        options,
        collection_id,
      } => {
        // Length-prefixed so ["a,b"] and ["a", "b"] cannot alias.
        let mut ids = String::new();
        for id in record_ids {
          ids.push_str(&format!("{}.{id},", id.len()));
        }
        format!(
          "{ids}:{}:{}",
          options.cache_key(),
          collection_id.as_deref().unwrap_or("-")
        )
      }
      RenderContext::Collection {
        collection_id,
        options,
      } => format!("{collection_id}:{}", options.cache_key()),
    }
  }
}
