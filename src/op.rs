use crate::context::RenderContext;
use crate::strategy::PreRenderResult;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

/// Derives the deduplication key for an operation: strategy name, context
/// kind, and the context's distinguishing identity fields. Lives only as
/// long as the in-flight registration.
pub(crate) fn operation_key(strategy: &str, context: &RenderContext) -> String {
  format!("{strategy}:{}:{}", context.kind(), context.identity())
}

enum OpState {
  Running,
  Done(PreRenderResult),
}

struct OpInner {
  state: OpState,
  wakers: Vec<Waker>,
}

/// The shared completion primitive behind request deduplication.
///
/// One task drives the operation; any number of tasks await the same
/// `OpFuture` and all observe the identical result. Completed exactly once;
/// later `complete` calls are ignored, which tolerates the drop-guard
/// completing after a normal completion.
pub(crate) struct OpFuture {
  inner: Mutex<OpInner>,
}

impl OpFuture {
  pub(crate) fn new() -> Self {
    Self {
      inner: Mutex::new(OpInner {
        state: OpState::Running,
        wakers: Vec::new(),
      }),
    }
  }

  /// Completes the operation, waking all waiters. No-op if already done.
  pub(crate) fn complete(&self, result: PreRenderResult) {
    let mut inner = self.inner.lock();
    if matches!(inner.state, OpState::Done(_)) {
      return;
    }
    inner.state = OpState::Done(result);
    for waker in inner.wakers.drain(..) {
      waker.wake();
    }
  }

  pub(crate) fn is_done(&self) -> bool {
    matches!(self.inner.lock().state, OpState::Done(_))
  }
}

impl Future for &OpFuture {
  type Output = PreRenderResult;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut inner = self.inner.lock();
    match &inner.state {
      OpState::Done(result) => Poll::Ready(result.clone()),
      OpState::Running => {
        inner.wakers.push(cx.waker().clone());
        Poll::Pending
      }
    }
  }
}
