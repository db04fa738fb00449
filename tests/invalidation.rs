mod common;

use common::{art_cache, string_cache};
use token_prerender::{
  InvalidationBus, InvalidationEvent, InvalidationScope, ManagerConfig, PreRenderManager,
  RenderedArtifact,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn populated_manager(bus: &InvalidationBus) -> PreRenderManager {
  let manager = PreRenderManager::new(bus);

  let art = art_cache();
  art.insert(
    "r1:r256d".to_string(),
    RenderedArtifact {
      width: 256,
      height: 256,
      bytes: vec![0xAB; 64],
    },
    Some(64),
  );
  manager.register_cache("token-art", art);

  let thumbs = string_cache();
  thumbs.insert("r1.png".to_string(), "data:image/png;...".to_string(), Some(32));
  manager.register_cache("thumbnails", thumbs);

  let sheets = string_cache();
  sheets.insert("c1".to_string(), "sheet".to_string(), Some(16));
  manager.register_cache("collection-sheets", sheets);

  manager
}

fn entry_count(manager: &PreRenderManager, name: &str) -> usize {
  manager.get_cache_stats(name).unwrap().entry_count
}

fn record_event(ids: &[&str]) -> InvalidationEvent {
  InvalidationEvent::new(
    InvalidationScope::Record,
    ids.iter().map(|s| s.to_string()).collect(),
    "record edited",
  )
}

#[test]
fn test_asset_scope_clears_everything() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  bus.publish(&InvalidationEvent::new(
    InvalidationScope::Asset,
    vec!["portrait.png".to_string()],
    "asset replaced",
  ));

  assert_eq!(entry_count(&manager, "token-art"), 0);
  assert_eq!(entry_count(&manager, "thumbnails"), 0);
  assert_eq!(entry_count(&manager, "collection-sheets"), 0);
}

#[test]
fn test_global_scope_clears_everything() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  bus.publish(&InvalidationEvent::new(InvalidationScope::Global, vec![], "reload"));

  assert_eq!(entry_count(&manager, "token-art"), 0);
  assert_eq!(entry_count(&manager, "thumbnails"), 0);
  assert_eq!(entry_count(&manager, "collection-sheets"), 0);
}

#[test]
fn test_record_scope_leaves_collection_cache_untouched() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  bus.publish(&record_event(&["r1"]));

  assert_eq!(entry_count(&manager, "token-art"), 0);
  assert_eq!(entry_count(&manager, "thumbnails"), 0);
  assert_eq!(entry_count(&manager, "collection-sheets"), 1, "collection cache must survive");
}

#[test]
fn test_collection_scope_clears_only_collection_cache() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  bus.publish(&InvalidationEvent::new(
    InvalidationScope::Collection,
    vec!["c1".to_string()],
    "collection renamed",
  ));

  assert_eq!(entry_count(&manager, "token-art"), 1);
  assert_eq!(entry_count(&manager, "thumbnails"), 1);
  assert_eq!(entry_count(&manager, "collection-sheets"), 0);
}

#[test]
fn test_custom_wiring_targets_configured_caches() {
  let bus = InvalidationBus::new();
  let manager = PreRenderManager::with_config(
    &bus,
    ManagerConfig {
      record_dependent_caches: vec!["only-this".to_string()],
      collection_cache: None,
    },
  );

  let targeted = string_cache();
  targeted.insert("k".to_string(), "v".to_string(), Some(8));
  manager.register_cache("only-this", targeted);

  let spared = string_cache();
  spared.insert("k".to_string(), "v".to_string(), Some(8));
  manager.register_cache("spared", spared);

  bus.publish(&record_event(&["r1"]));

  assert_eq!(entry_count(&manager, "only-this"), 0);
  assert_eq!(entry_count(&manager, "spared"), 1);
}

#[test]
fn test_repeated_publish_is_idempotent() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  bus.publish(&record_event(&["r1"]));
  bus.publish(&record_event(&["r1"]));

  assert_eq!(entry_count(&manager, "token-art"), 0);
}

#[test]
fn test_dropped_manager_leaves_inert_subscriptions() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);
  drop(manager);

  // Upgrading the weak core fails; the publish must still be harmless.
  bus.publish(&record_event(&["r1"]));
}

#[test]
fn test_subscribe_unsubscribe_and_scoping() {
  let bus = InvalidationBus::new();
  let record_hits = Arc::new(AtomicUsize::new(0));
  let all_hits = Arc::new(AtomicUsize::new(0));

  let id = {
    let record_hits = record_hits.clone();
    bus.subscribe(InvalidationScope::Record, move |_| {
      record_hits.fetch_add(1, Ordering::SeqCst);
    })
  };
  {
    let all_hits = all_hits.clone();
    bus.subscribe_all(move |_| {
      all_hits.fetch_add(1, Ordering::SeqCst);
    });
  }

  bus.publish(&record_event(&["r1"]));
  bus.publish(&InvalidationEvent::new(InvalidationScope::Global, vec![], "x"));

  assert_eq!(record_hits.load(Ordering::SeqCst), 1, "scoped subscriber sees only its scope");
  assert_eq!(all_hits.load(Ordering::SeqCst), 2);

  assert!(bus.unsubscribe(id));
  assert!(!bus.unsubscribe(id));
  bus.publish(&record_event(&["r2"]));
  assert_eq!(record_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_manual_clear_through_manager() {
  let bus = InvalidationBus::new();
  let manager = populated_manager(&bus);

  assert!(manager.clear_cache("token-art"));
  assert!(!manager.clear_cache("nope"));
  assert_eq!(entry_count(&manager, "token-art"), 0);
  assert_eq!(entry_count(&manager, "thumbnails"), 1);

  manager.clear_all_caches();
  assert_eq!(entry_count(&manager, "thumbnails"), 0);

  let all = manager.get_all_cache_stats();
  assert_eq!(all.len(), 3);
  assert!(all.values().all(|stats| stats.entry_count == 0));
}
