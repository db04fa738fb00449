use std::time::{Duration, Instant};

/// Reports the time remaining in the current idle slice.
///
/// This is the generic yield point the cooperative batch encoder checks
/// before each item: a browser embedding maps it onto an idle-callback
/// deadline, a native embedding onto a fixed per-slice budget.
pub trait IdleBudget {
  fn remaining(&self) -> Duration;
}

/// A unit of work executed within one idle slice.
pub type IdleWork = Box<dyn FnOnce(&dyn IdleBudget) + Send>;

/// Schedules work onto idle time-slices.
///
/// Callers that need more time than one slice re-`schedule` a continuation
/// instead of blocking; cancellation is implicit by not rescheduling.
pub trait IdleScheduler: Send + Sync + 'static {
  fn schedule(&self, work: IdleWork);
}

/// A fixed-deadline budget for one slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceBudget {
  deadline: Instant,
}

impl SliceBudget {
  pub fn new(budget: Duration) -> Self {
    Self {
      deadline: Instant::now() + budget,
    }
  }
}

impl IdleBudget for SliceBudget {
  fn remaining(&self) -> Duration {
    self.deadline.saturating_duration_since(Instant::now())
  }
}

/// An [`IdleScheduler`] that runs each slice as a Tokio task with a fixed
/// time budget. Yields to the runtime between slices, so long batches never
/// monopolize the executor.
pub struct TokioIdleScheduler {
  handle: tokio::runtime::Handle,
  slice_budget: Duration,
}

impl TokioIdleScheduler {
  pub const DEFAULT_SLICE_BUDGET: Duration = Duration::from_millis(8);

  /// Uses the current Tokio runtime context. Panics outside a runtime.
  pub fn new() -> Self {
    Self::with_budget(Self::DEFAULT_SLICE_BUDGET)
  }

  pub fn with_budget(slice_budget: Duration) -> Self {
    Self {
      handle: tokio::runtime::Handle::current(),
      slice_budget,
    }
  }
}

impl IdleScheduler for TokioIdleScheduler {
  fn schedule(&self, work: IdleWork) {
    let budget = self.slice_budget;
    self.handle.spawn(async move {
      // Let queued tasks run before taking the slice.
      tokio::task::yield_now().await;
      let slice = SliceBudget::new(budget);
      work(&slice);
    });
  }
}
