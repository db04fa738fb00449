use token_prerender::{
  BuildError, CacheConfig, CacheStore, EvictionEvent, EvictionReason, LruPolicy,
};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

fn config(max_entries: usize, max_memory_bytes: u64, eviction_ratio: f64) -> CacheConfig {
  CacheConfig {
    max_entries,
    max_memory_bytes,
    eviction_ratio,
  }
}

// Instant-based recency stamps can collide on coarse clocks; a short sleep
// keeps access order unambiguous.
fn settle() {
  thread::sleep(Duration::from_millis(2));
}

#[test]
fn test_zero_limits_rejected_at_construction() {
  assert_eq!(
    CacheStore::<String, String>::new(config(0, 1024, 0.25)).err(),
    Some(BuildError::ZeroMaxEntries)
  );
  assert_eq!(
    CacheStore::<String, String>::new(config(10, 0, 0.25)).err(),
    Some(BuildError::ZeroMemoryLimit)
  );
  assert_eq!(
    CacheStore::<String, String>::new(config(10, 1024, 0.0)).err(),
    Some(BuildError::InvalidEvictionRatio(0.0))
  );
  assert_eq!(
    CacheStore::<String, String>::new(config(10, 1024, 1.5)).err(),
    Some(BuildError::InvalidEvictionRatio(1.5))
  );
  assert_eq!(LruPolicy::with_ratio(-0.1).err(), Some(BuildError::InvalidEvictionRatio(-0.1)));
}

#[test]
fn test_entry_bound_holds_after_every_insert() {
  let store = CacheStore::new(config(5, u64::MAX / 2, 0.25)).unwrap();

  for i in 0..20 {
    store.insert(format!("k{i}"), i, Some(8));
    assert!(
      store.len() <= 5,
      "entry count {} exceeded the limit after insert {i}",
      store.len()
    );
  }
  assert!(store.stats().evictions > 0);
}

#[test]
fn test_memory_bound_holds_after_every_insert() {
  let store = CacheStore::new(config(100, 100, 0.25)).unwrap();

  for i in 0..10 {
    store.insert(format!("k{i}"), vec![0u8; 40], Some(40));
    let stats = store.stats();
    assert!(
      stats.total_bytes <= 100,
      "aggregate size {} exceeded the limit after insert {i}",
      stats.total_bytes
    );
  }
}

#[test]
fn test_lru_evicts_least_recently_accessed() {
  let store = CacheStore::new(config(3, u64::MAX / 2, 0.25)).unwrap();

  store.insert("a".to_string(), 1, Some(8));
  settle();
  store.insert("b".to_string(), 2, Some(8));
  settle();
  store.insert("c".to_string(), 3, Some(8));
  settle();

  // B is accessed after C was inserted, so A is now the coldest entry.
  assert_eq!(store.get(&"b".to_string()).as_deref(), Some(&2));
  settle();

  store.insert("d".to_string(), 4, Some(8));

  assert!(store.get(&"a".to_string()).is_none(), "a should be evicted");
  assert!(store.get(&"b".to_string()).is_some());
  assert!(store.get(&"c".to_string()).is_some());
  assert!(store.get(&"d".to_string()).is_some());
}

#[test]
fn test_recency_touch_changes_victim() {
  let store = CacheStore::new(config(3, u64::MAX / 2, 0.25)).unwrap();

  store.insert("a".to_string(), 1, Some(8));
  settle();
  store.insert("b".to_string(), 2, Some(8));
  settle();
  store.insert("c".to_string(), 3, Some(8));
  settle();

  // Refresh A; the oldest untouched entry is now B.
  store.get(&"a".to_string());
  settle();
  store.insert("d".to_string(), 4, Some(8));

  assert!(store.get(&"a".to_string()).is_some());
  assert!(store.get(&"b".to_string()).is_none(), "b should be evicted");
}

#[test]
fn test_eviction_ratio_batches_victims() {
  // Over-count with ratio 0.5: floor(5 * 0.5) = 2 victims in one pass.
  let store = CacheStore::new(config(4, u64::MAX / 2, 0.5)).unwrap();

  for i in 0..5 {
    store.insert(format!("k{i}"), i, Some(8));
    settle();
  }

  assert_eq!(store.len(), 3);
  assert_eq!(store.stats().evictions, 2);
  assert!(store.get(&"k0".to_string()).is_none());
  assert!(store.get(&"k1".to_string()).is_none());
  assert!(store.get(&"k4".to_string()).is_some());
}

#[test]
fn test_missing_keys_are_no_ops() {
  let store = CacheStore::<String, i32>::new(CacheConfig::default()).unwrap();
  assert!(store.get(&"ghost".to_string()).is_none());
  assert!(!store.remove(&"ghost".to_string()));
  assert_eq!(store.stats().misses, 1);
}

#[test]
fn test_replacing_a_key_updates_size_not_count() {
  let store = CacheStore::new(config(10, 1000, 0.25)).unwrap();
  store.insert("k".to_string(), "small".to_string(), Some(10));
  store.insert("k".to_string(), "bigger".to_string(), Some(30));

  let stats = store.stats();
  assert_eq!(stats.entry_count, 1);
  assert_eq!(stats.total_bytes, 30);
  assert_eq!(stats.inserts, 2);
}

#[test]
fn test_eviction_events_fire_once_per_victim() {
  let events: Arc<Mutex<Vec<EvictionEvent<String>>>> = Arc::new(Mutex::new(Vec::new()));
  let sink = events.clone();

  let store = CacheStore::new(config(2, u64::MAX / 2, 0.25))
    .unwrap()
    .eviction_listener(move |event: EvictionEvent<String>| {
      sink.lock().push(event);
    });

  store.insert("a".to_string(), 1, Some(8));
  settle();
  store.insert("b".to_string(), 2, Some(8));
  settle();
  store.insert("c".to_string(), 3, Some(8));

  {
    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].key, "a");
    assert_eq!(events[0].reason, EvictionReason::Capacity);
    assert_eq!(events[0].size, 8);
  }

  store.remove(&"b".to_string());
  assert_eq!(events.lock().last().unwrap().reason, EvictionReason::Manual);

  store.clear();
  let events = events.lock();
  // One Invalidated event for the remaining entry.
  assert_eq!(events.len(), 3);
  assert_eq!(events.last().unwrap().reason, EvictionReason::Invalidated);
  assert_eq!(store.len(), 0);
}

#[test]
fn test_stats_snapshot() {
  let store = CacheStore::new(CacheConfig::default()).unwrap();
  store.insert("a".to_string(), 1, Some(100));
  store.get(&"a".to_string());
  store.get(&"a".to_string());
  store.get(&"missing".to_string());

  let stats = store.stats();
  assert_eq!(stats.entry_count, 1);
  assert_eq!(stats.total_bytes, 100);
  assert_eq!(stats.hits, 2);
  assert_eq!(stats.misses, 1);
  assert_eq!(stats.inserts, 1);
  assert!((stats.hit_ratio - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_oversized_entry_evicts_down_to_fit() {
  let store = CacheStore::new(config(10, 50, 1.0)).unwrap();
  store.insert("a".to_string(), vec![0u8; 30], Some(30));
  store.insert("b".to_string(), vec![0u8; 40], Some(40));

  // 70 > 50: the policy drains oldest-first until under the limit.
  assert!(store.stats().total_bytes <= 50);
}
