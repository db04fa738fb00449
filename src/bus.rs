use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// The scope of an invalidation event, from most to least specific blast
/// radius a subscriber can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidationScope {
  /// An uploaded binary asset changed; its relationship to cached artifacts
  /// is unknown to the publisher.
  Asset,
  /// One or more input records changed.
  Record,
  /// An owning collection changed.
  Collection,
  /// Everything derived from the data set is suspect.
  Global,
}

impl fmt::Display for InvalidationScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InvalidationScope::Asset => write!(f, "asset"),
      InvalidationScope::Record => write!(f, "record"),
      InvalidationScope::Collection => write!(f, "collection"),
      InvalidationScope::Global => write!(f, "global"),
    }
  }
}

/// A broadcast-once "this data changed" notification. Never stored.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvalidationEvent {
  pub scope: InvalidationScope,
  /// The ids of the changed entities, empty for `Global`.
  pub entity_ids: Vec<String>,
  /// Free-form description of what changed, for logging.
  pub reason: String,
}

impl InvalidationEvent {
  pub fn new(scope: InvalidationScope, entity_ids: Vec<String>, reason: impl Into<String>) -> Self {
    Self {
      scope,
      entity_ids,
      reason: reason.into(),
    }
  }
}

/// Identifies a subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&InvalidationEvent) + Send + Sync>;

struct Subscription {
  id: u64,
  scope: Option<InvalidationScope>,
  callback: Subscriber,
}

/// Topic-based publish/subscribe channel for invalidation events.
///
/// This is the one intentionally shared, many-producer/many-consumer
/// structure in the engine. Dispatch is synchronous: `publish` invokes every
/// matching callback before returning, so a clear triggered by an event is
/// atomic with respect to the cooperative interleaving model. Callbacks must
/// be idempotent and safe to call multiple times.
pub struct InvalidationBus {
  subscriptions: Mutex<Vec<Subscription>>,
  next_id: Mutex<u64>,
}

impl fmt::Debug for InvalidationBus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InvalidationBus")
      .field("subscriptions", &self.subscriptions.lock().len())
      .finish()
  }
}

impl Default for InvalidationBus {
  fn default() -> Self {
    Self::new()
  }
}

impl InvalidationBus {
  pub fn new() -> Self {
    Self {
      subscriptions: Mutex::new(Vec::new()),
      next_id: Mutex::new(0),
    }
  }

  /// Subscribes a callback to a single scope.
  pub fn subscribe<F>(&self, scope: InvalidationScope, callback: F) -> SubscriptionId
  where
    F: Fn(&InvalidationEvent) + Send + Sync + 'static,
  {
    self.add(Some(scope), Arc::new(callback))
  }

  /// Subscribes a callback to every scope.
  pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionId
  where
    F: Fn(&InvalidationEvent) + Send + Sync + 'static,
  {
    self.add(None, Arc::new(callback))
  }

  fn add(&self, scope: Option<InvalidationScope>, callback: Subscriber) -> SubscriptionId {
    let mut next_id = self.next_id.lock();
    let id = *next_id;
    *next_id += 1;
    self.subscriptions.lock().push(Subscription { id, scope, callback });
    SubscriptionId(id)
  }

  /// Removes a subscription. Returns `false` if it was already gone.
  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    let mut subs = self.subscriptions.lock();
    let before = subs.len();
    subs.retain(|s| s.id != id.0);
    subs.len() != before
  }

  /// Broadcasts an event to every subscriber of its scope.
  pub fn publish(&self, event: &InvalidationEvent) {
    debug!(
      scope = %event.scope,
      entities = event.entity_ids.len(),
      reason = %event.reason,
      "invalidation published"
    );

    // Snapshot the matching callbacks so subscribers may unsubscribe (or
    // publish) from inside their own callback without deadlocking.
    let matching: Vec<Subscriber> = {
      let subs = self.subscriptions.lock();
      subs
        .iter()
        .filter(|s| s.scope.map_or(true, |scope| scope == event.scope))
        .map(|s| s.callback.clone())
        .collect()
    };

    for callback in matching {
      callback(event);
    }
  }
}
