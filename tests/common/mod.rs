#![allow(dead_code)]

use token_prerender::render::CollectionSource;
use token_prerender::{
  CacheConfig, CacheStore, InputRecord, RecordSource, RenderError, RenderOptions, RenderedArtifact,
  TokenRenderer,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// A renderer that counts invocations, optionally sleeps to simulate the
/// expensive pipeline, and fails for configured record ids.
pub struct MockRenderer {
  calls: AtomicUsize,
  delay: Duration,
  fail_ids: Vec<String>,
}

impl MockRenderer {
  pub fn new() -> Self {
    Self {
      calls: AtomicUsize::new(0),
      delay: Duration::ZERO,
      fail_ids: Vec::new(),
    }
  }

  pub fn with_delay(delay: Duration) -> Self {
    Self {
      delay,
      ..Self::new()
    }
  }

  pub fn failing_for(ids: &[&str]) -> Self {
    Self {
      fail_ids: ids.iter().map(|s| s.to_string()).collect(),
      ..Self::new()
    }
  }

  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl TokenRenderer for MockRenderer {
  async fn render(
    &self,
    record: &InputRecord,
    options: &RenderOptions,
  ) -> Result<RenderedArtifact, RenderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    if self.fail_ids.contains(&record.id) {
      return Err(RenderError::new(format!("pipeline choked on {}", record.id)));
    }
    Ok(RenderedArtifact {
      width: options.size_px,
      height: options.size_px,
      bytes: vec![0xAB; 64],
    })
  }
}

/// An in-memory record table doubling as a collection index.
pub struct StaticRecords {
  map: HashMap<String, InputRecord>,
}

impl StaticRecords {
  pub fn new(records: Vec<InputRecord>) -> Self {
    Self {
      map: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
    }
  }

  pub fn with_ids(ids: &[&str]) -> Self {
    Self::new(ids.iter().map(|id| record(id)).collect())
  }
}

impl RecordSource for StaticRecords {
  fn record(&self, id: &str) -> Option<InputRecord> {
    self.map.get(id).cloned()
  }
}

impl CollectionSource for StaticRecords {
  fn records(&self, collection_id: &str) -> Vec<InputRecord> {
    let mut records: Vec<_> = self
      .map
      .values()
      .filter(|r| r.collection_id.as_deref() == Some(collection_id))
      .cloned()
      .collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
  }
}

pub fn record(id: &str) -> InputRecord {
  InputRecord {
    id: id.to_string(),
    name: format!("Record {id}"),
    image_ref: Some(format!("asset://{id}.png")),
    collection_id: None,
  }
}

pub fn record_in(id: &str, collection_id: &str) -> InputRecord {
  InputRecord {
    collection_id: Some(collection_id.to_string()),
    ..record(id)
  }
}

pub fn art_cache() -> Arc<CacheStore<String, RenderedArtifact>> {
  Arc::new(CacheStore::new(CacheConfig::default()).unwrap())
}

pub fn string_cache() -> Arc<CacheStore<String, String>> {
  Arc::new(CacheStore::new(CacheConfig::default()).unwrap())
}
