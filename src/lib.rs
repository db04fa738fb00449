//! A pre-render cache and invalidation engine for token artwork.
//!
//! Token images are produced by an expensive external drawing pipeline, and
//! the same input/option combination is requested over and over (hover, tab
//! switch, re-selection). This crate amortizes that cost: compute once,
//! reuse many times, evict safely under memory pressure, and invalidate
//! promptly when the underlying data changes.
//!
//! # Pieces
//! - [`CacheStore`]: a generic bounded key/value store with statistics and a
//!   pluggable [`EvictionPolicy`](policy::EvictionPolicy) (LRU shipped).
//! - [`InvalidationBus`]: topic-based pub/sub for "entity changed" events.
//! - [`PreRenderStrategy`]: pluggable units of render work, dispatched by
//!   the [`PreRenderManager`] with per-identity request deduplication.
//! - [`TabPreRenderService`](facade::TabPreRenderService): a UI-facing
//!   façade owning bespoke caches (hash-validated ordering, cooperatively
//!   batch-encoded thumbnails, best-effort resolved references).
//!
//! The engine is in-memory only; rendering, asset storage and reference
//! resolution are injected collaborators (see [`render`]).

// Public modules that form the API
pub mod bus;
pub mod context;
pub mod error;
pub mod facade;
pub mod idle;
pub mod listener;
pub mod manager;
pub mod policy;
pub mod render;
pub mod stats;
pub mod store;
pub mod strategies;
pub mod strategy;

// Internal, crate-only modules
mod entry;
mod op;
mod time;

// Re-export the primary user-facing types for convenience
pub use bus::{InvalidationBus, InvalidationEvent, InvalidationScope, SubscriptionId};
pub use context::RenderContext;
pub use error::{BuildError, RenderError};
pub use facade::{ReferenceRequest, Tab, TabPreRenderService, TabServiceConfig, ThumbnailJob};
pub use idle::{IdleBudget, IdleScheduler, TokioIdleScheduler};
pub use listener::{EvictionEvent, EvictionListener, EvictionReason};
pub use manager::{ManagerConfig, PreRenderManager};
pub use policy::lru::LruPolicy;
pub use render::{
  InputRecord, RecordSource, ReferenceResolver, RenderOptions, RenderedArtifact, TokenRenderer,
};
pub use stats::CacheStats;
pub use store::{CacheAdmin, CacheConfig, CacheStore};
pub use strategy::{LifecycleEvent, PreRenderResult, PreRenderStrategy};
