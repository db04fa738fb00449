use crate::bus::{InvalidationBus, InvalidationScope};
use crate::context::RenderContext;
use crate::op::{operation_key, OpFuture};
use crate::stats::CacheStats;
use crate::store::CacheAdmin;
use crate::strategy::{LifecycleEvent, PreRenderResult, PreRenderStrategy};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Wiring configuration for the manager's invalidation side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
  /// The caches cleared by a `Record`-scope invalidation: the ones most
  /// likely to hold artifacts derived from record data.
  pub record_dependent_caches: Vec<String>,
  /// The cache cleared by a `Collection`-scope invalidation.
  pub collection_cache: Option<String>,
}

impl Default for ManagerConfig {
  fn default() -> Self {
    Self {
      record_dependent_caches: vec!["token-art".to_string(), "thumbnails".to_string()],
      collection_cache: Some("collection-sheets".to_string()),
    }
  }
}

/// In-flight bookkeeping, held under one lock so the dedup decision and the
/// non-reentrancy decision are made atomically. `rendering` counts active
/// operations per strategy; reentrant strategies may have several.
#[derive(Default)]
struct DispatchState {
  in_flight: HashMap<String, Arc<OpFuture>>,
  rendering: HashMap<String, usize>,
}

/// The outcome of the dispatch decision, resolved under the lock and acted
/// on after the guard is released so the returned future stays `Send`.
enum Dispatch {
  Join(Arc<OpFuture>),
  Skip,
  Run(Arc<OpFuture>),
}

type LifecycleSubscriber = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

pub(crate) struct ManagerShared {
  strategies: Mutex<HashMap<String, Arc<dyn PreRenderStrategy>>>,
  caches: Mutex<HashMap<String, Arc<dyn CacheAdmin>>>,
  dispatch: Mutex<DispatchState>,
  subscribers: Mutex<Vec<LifecycleSubscriber>>,
  config: ManagerConfig,
}

impl ManagerShared {
  fn emit(&self, event: LifecycleEvent) {
    let subscribers: Vec<_> = self.subscribers.lock().clone();
    for subscriber in subscribers {
      subscriber(&event);
    }
  }

  fn clear_all(&self) {
    let caches: Vec<_> = self.caches.lock().values().cloned().collect();
    for cache in caches {
      cache.clear();
    }
  }

  fn clear_named(&self, name: &str) -> bool {
    let cache = self.caches.lock().get(name).cloned();
    match cache {
      Some(cache) => {
        cache.clear();
        true
      }
      None => false,
    }
  }
}

/// Removes the in-flight registration when the driving task finishes, errors
/// or is cancelled. If the task was cancelled mid-render, waiters are
/// released with a failed result instead of hanging.
struct InFlightGuard {
  shared: Arc<ManagerShared>,
  key: String,
  strategy: String,
  future: Arc<OpFuture>,
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self.future.complete(PreRenderResult::failed("operation cancelled"));
    let mut state = self.shared.dispatch.lock();
    state.in_flight.remove(&self.key);
    if let Some(count) = state.rendering.get_mut(&self.strategy) {
      *count -= 1;
      if *count == 0 {
        state.rendering.remove(&self.strategy);
      }
    }
  }
}

/// The orchestrator: a registry of strategies and caches that dispatches
/// requests to the best-matching strategy, deduplicates concurrent identical
/// operations, emits lifecycle events, and clears dependent caches on
/// invalidation events.
#[derive(Clone)]
pub struct PreRenderManager {
  shared: Arc<ManagerShared>,
}

impl fmt::Debug for PreRenderManager {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PreRenderManager")
      .field("strategies", &self.shared.strategies.lock().len())
      .field("caches", &self.shared.caches.lock().len())
      .field("in_flight", &self.shared.dispatch.lock().in_flight.len())
      .finish()
  }
}

impl PreRenderManager {
  /// Creates a manager with default invalidation wiring, subscribed to all
  /// four scopes of the given bus.
  pub fn new(bus: &InvalidationBus) -> Self {
    Self::with_config(bus, ManagerConfig::default())
  }

  pub fn with_config(bus: &InvalidationBus, config: ManagerConfig) -> Self {
    let shared = Arc::new(ManagerShared {
      strategies: Mutex::new(HashMap::new()),
      caches: Mutex::new(HashMap::new()),
      dispatch: Mutex::new(DispatchState::default()),
      subscribers: Mutex::new(Vec::new()),
      config,
    });
    Self::wire_invalidation(bus, &shared);
    Self { shared }
  }

  /// Subscribes the shared core to the bus. Subscriptions hold a `Weak`, so
  /// a dropped manager leaves only inert callbacks behind, and the callbacks
  /// themselves are idempotent clears.
  fn wire_invalidation(bus: &InvalidationBus, shared: &Arc<ManagerShared>) {
    // Asset relationships to cached artifacts are unknown, so both Asset
    // and Global wipe everything.
    for scope in [InvalidationScope::Asset, InvalidationScope::Global] {
      let weak = Arc::downgrade(shared);
      bus.subscribe(scope, move |event| {
        if let Some(shared) = Weak::upgrade(&weak) {
          debug!(scope = %event.scope, "clearing all caches");
          shared.clear_all();
        }
      });
    }

    let weak = Arc::downgrade(shared);
    bus.subscribe(InvalidationScope::Record, move |event| {
      if let Some(shared) = Weak::upgrade(&weak) {
        for name in &shared.config.record_dependent_caches {
          debug!(cache = %name, entities = event.entity_ids.len(), "clearing record-dependent cache");
          shared.clear_named(name);
        }
      }
    });

    let weak = Arc::downgrade(shared);
    bus.subscribe(InvalidationScope::Collection, move |event| {
      if let Some(shared) = Weak::upgrade(&weak) {
        if let Some(name) = &shared.config.collection_cache {
          debug!(cache = %name, entities = event.entity_ids.len(), "clearing collection cache");
          shared.clear_named(name);
        }
      }
    });
  }

  // --- Registry ---

  pub fn register_strategy(&self, strategy: Arc<dyn PreRenderStrategy>) {
    let name = strategy.name().to_string();
    self.shared.strategies.lock().insert(name, strategy);
  }

  /// Removes a strategy by name. Returns `false` if it was not registered.
  pub fn unregister_strategy(&self, name: &str) -> bool {
    self.shared.strategies.lock().remove(name).is_some()
  }

  pub fn register_cache(&self, name: impl Into<String>, cache: Arc<dyn CacheAdmin>) {
    self.shared.caches.lock().insert(name.into(), cache);
  }

  pub fn unregister_cache(&self, name: &str) -> bool {
    self.shared.caches.lock().remove(name).is_some()
  }

  // --- Introspection ---

  pub fn get_strategy_names(&self) -> Vec<String> {
    let mut names: Vec<_> = self.shared.strategies.lock().keys().cloned().collect();
    names.sort();
    names
  }

  pub fn get_cache_names(&self) -> Vec<String> {
    let mut names: Vec<_> = self.shared.caches.lock().keys().cloned().collect();
    names.sort();
    names
  }

  /// Whether the named strategy currently has an operation in flight.
  pub fn is_strategy_rendering(&self, name: &str) -> bool {
    self.shared.dispatch.lock().rendering.contains_key(name)
  }

  pub fn get_cache_stats(&self, name: &str) -> Option<CacheStats> {
    self.shared.caches.lock().get(name).map(|c| c.stats())
  }

  pub fn get_all_cache_stats(&self) -> HashMap<String, CacheStats> {
    self
      .shared
      .caches
      .lock()
      .iter()
      .map(|(name, cache)| (name.clone(), cache.stats()))
      .collect()
  }

  // --- Administration ---

  pub fn clear_cache(&self, name: &str) -> bool {
    self.shared.clear_named(name)
  }

  pub fn clear_all_caches(&self) {
    self.shared.clear_all();
  }

  /// Registers a lifecycle event subscriber.
  pub fn on_lifecycle<F>(&self, subscriber: F)
  where
    F: Fn(&LifecycleEvent) + Send + Sync + 'static,
  {
    self.shared.subscribers.lock().push(Arc::new(subscriber));
  }

  // --- Dispatch ---

  /// Matches the context to the best strategy and runs it, deduplicating
  /// concurrent identical requests.
  ///
  /// Strategy failures are caught and reported as failed results; they never
  /// propagate to the caller and never corrupt in-flight state.
  pub async fn pre_render(&self, context: &RenderContext) -> PreRenderResult {
    let strategy = match self.select_strategy(context) {
      Some(strategy) => strategy,
      None => {
        debug!(kind = context.kind(), "no matching strategy");
        return PreRenderResult::failed("no matching strategy");
      }
    };

    let name = strategy.name().to_string();
    let key = operation_key(&name, context);

    // Decide under the lock, await after the guard is gone.
    let decision = {
      let mut state = self.shared.dispatch.lock();
      if let Some(existing) = state.in_flight.get(&key) {
        Dispatch::Join(existing.clone())
      } else if !strategy.reentrant() && state.rendering.contains_key(&name) {
        Dispatch::Skip
      } else {
        let future = Arc::new(OpFuture::new());
        state.in_flight.insert(key.clone(), future.clone());
        *state.rendering.entry(name.clone()).or_insert(0) += 1;
        Dispatch::Run(future)
      }
    };

    let future = match decision {
      Dispatch::Join(existing) => {
        // Identical operation already running: share its outcome.
        debug!(operation = %key, "joined in-flight operation");
        return (&*existing).await;
      }
      Dispatch::Skip => {
        // The strategy is busy under a different key and refuses overlap.
        debug!(strategy = %name, "non-reentrant strategy busy, skipping");
        return PreRenderResult::noop();
      }
      Dispatch::Run(future) => future,
    };

    let _guard = InFlightGuard {
      shared: self.shared.clone(),
      key: key.clone(),
      strategy: name.clone(),
      future: future.clone(),
    };

    debug!(operation = %key, "pre-render started");
    self.shared.emit(LifecycleEvent::Started {
      strategy: name.clone(),
      operation_key: key.clone(),
    });

    let result = match strategy.pre_render(context).await {
      Ok(result) => {
        self.shared.emit(LifecycleEvent::Completed {
          strategy: name.clone(),
          operation_key: key.clone(),
          result: result.clone(),
        });
        result
      }
      Err(error) => {
        warn!(operation = %key, %error, "pre-render failed");
        let result = PreRenderResult::failed(error.to_string());
        self.shared.emit(LifecycleEvent::Failed {
          strategy: name,
          operation_key: key,
          error: error.to_string(),
        });
        result
      }
    };

    future.complete(result.clone());
    result
  }

  /// All strategies claiming the context, best first: descending priority,
  /// name as the deterministic tie-break.
  fn select_strategy(&self, context: &RenderContext) -> Option<Arc<dyn PreRenderStrategy>> {
    let strategies = self.shared.strategies.lock();
    let mut candidates: Vec<_> = strategies
      .values()
      .filter(|s| s.should_trigger(context))
      .cloned()
      .collect();
    candidates.sort_by(|a, b| {
      b.priority()
        .cmp(&a.priority())
        .then_with(|| a.name().cmp(b.name()))
    });
    candidates.into_iter().next()
  }
}
