use crate::idle::IdleScheduler;
use crate::render::ThumbnailEncoder;
use crate::store::CacheStore;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// One item handed to the batch encoder: the stable per-item cache key and
/// the raw bytes to encode.
#[derive(Debug, Clone)]
pub struct ThumbnailJob {
  pub filename: String,
  pub bytes: Vec<u8>,
}

struct ThumbInner {
  store: Arc<CacheStore<String, String>>,
  encoder: Arc<dyn ThumbnailEncoder>,
  scheduler: Arc<dyn IdleScheduler>,
  active: AtomicBool,
  per_slice_cap: usize,
}

/// The small-binary cache, populated cooperatively.
///
/// Encoding runs in bounded chunks on idle slices: at most `per_slice_cap`
/// items per slice, with the remaining idle budget checked before each item.
/// When either bound is hit the remainder is rescheduled as a continuation
/// rather than blocking. Every slice makes at least one item of progress, so
/// a stingy budget slows the batch down but cannot stall it.
pub(crate) struct ThumbnailCache {
  inner: Arc<ThumbInner>,
}

impl ThumbnailCache {
  pub(crate) fn new(
    store: Arc<CacheStore<String, String>>,
    encoder: Arc<dyn ThumbnailEncoder>,
    scheduler: Arc<dyn IdleScheduler>,
    per_slice_cap: usize,
  ) -> Self {
    Self {
      inner: Arc::new(ThumbInner {
        store,
        encoder,
        scheduler,
        active: AtomicBool::new(false),
        per_slice_cap: per_slice_cap.max(1),
      }),
    }
  }

  pub(crate) fn store(&self) -> &Arc<CacheStore<String, String>> {
    &self.inner.store
  }

  /// Starts a batch encode run. Returns `false` without doing anything if a
  /// run is already active; the caller treats that as a cache hit.
  pub(crate) fn encode_batch(&self, jobs: Vec<ThumbnailJob>) -> bool {
    if self.inner.active.swap(true, Ordering::AcqRel) {
      debug!("batch encode already active, ignoring trigger");
      return false;
    }
    if jobs.is_empty() {
      self.inner.active.store(false, Ordering::Release);
      return true;
    }

    debug!(items = jobs.len(), "batch encode started");
    Self::run_slice(self.inner.clone(), jobs.into());
    true
  }

  fn run_slice(inner: Arc<ThumbInner>, mut queue: VecDeque<ThumbnailJob>) {
    let scheduler = inner.scheduler.clone();
    scheduler.schedule(Box::new(move |budget| {
      let mut processed = 0;
      while let Some(job) = queue.pop_front() {
        if processed > 0 && (processed >= inner.per_slice_cap || budget.remaining().is_zero()) {
          queue.push_front(job);
          break;
        }

        // Stable filenames make re-triggered batches cheap.
        if !inner.store.contains(&job.filename) {
          let encoded = inner.encoder.encode(&job.bytes);
          let size = encoded.len() as u64;
          inner.store.insert(job.filename, encoded, Some(size));
        }
        processed += 1;
      }

      if queue.is_empty() {
        debug!("batch encode finished");
        inner.active.store(false, Ordering::Release);
      } else {
        Self::run_slice(inner, queue);
      }
    }));
  }
}
