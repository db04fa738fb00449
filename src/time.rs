use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all recency stamps in the engine.
// Initialized lazily on first use.
static ENGINE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// The current time as nanoseconds since the engine epoch.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  Instant::now().saturating_duration_since(*ENGINE_EPOCH).as_nanos() as u64
}

/// Converts a stored nanosecond stamp back into a `Duration` since the epoch.
#[inline]
pub(crate) fn nanos_to_duration(nanos: u64) -> Duration {
  Duration::from_nanos(nanos)
}
