//! # thread-recycler
//!
//! A thread-local object pool modeled on Netty's `Recycler`: every thread
//! gets its own private LIFO stack of idle objects, and an object recycled
//! from a different thread than the one that allocated it is handed back
//! through a lock-free single-producer/single-consumer queue instead of
//! contending on a shared pool.
//!
//! ## Overview
//!
//! `thread-recycler` exists to cut allocator and GC-adjacent pressure for
//! workloads that churn through many short-lived objects of the same shape —
//! protocol message buffers, parser scratch space, connection-handling
//! structs, temporary graph/matrix nodes. Pooling only pays off when reuse is
//! cheap, so the design optimizes aggressively for the same-thread path and
//! treats cross-thread return as the exceptional case it usually is.
//!
//! ## How recycling works
//!
//! - [`Recycler::get`] pops from the calling thread's own stack if anything
//!   is there, scavenging foreign-thread return queues first if it's empty,
//!   and falls back to [`Recyclable::new_object`] only on a genuine miss.
//! - [`Handle::recycle`] returns an object to the stack it was allocated
//!   from. Recycling on the same thread that allocated it pushes directly.
//!   Recycling from any other thread appends to that thread's own
//!   single-producer weak-order queue against the object's home stack; the
//!   home thread drains those queues the next time it scavenges.
//! - An admission-ratio filter (every Nth recycle is kept, the rest
//!   dropped) bounds how much garbage a bursty producer can push into the
//!   pool, independently on the same-thread and cross-thread paths.
//! - A shared capacity budget, split across all of a stack's foreign
//!   queues, bounds the total memory parked in queues that haven't been
//!   drained yet.
//! - Queues never hold a strong reference to their target stack, and a
//!   stack never holds a strong reference to a producer thread: both sides
//!   hold weak handles, so neither a dead producer thread nor an unused
//!   pool keeps the other's memory alive.
//!
//! ## Quick Start
//!
//! ```rust
//! use thread_recycler::{Recycler, RecyclerConfig, Recyclable};
//!
//! struct Buffer {
//!     data: Vec<u8>,
//! }
//!
//! impl Recyclable for Buffer {
//!     fn new_object(_recycler: &Recycler<Self>) -> Self {
//!         Buffer { data: Vec::with_capacity(4096) }
//!     }
//!
//!     fn on_acquire(&mut self) {
//!         self.data.clear();
//!     }
//! }
//!
//! // ratio 1 admits every recycle, so reuse below is guaranteed rather
//! // than left to the admission filter.
//! let config = RecyclerConfig::builder().ratio(1).build().unwrap();
//! let recycler: Recycler<Buffer> = Recycler::new(config);
//!
//! let mut handle = recycler.get();
//! handle.data.extend_from_slice(b"hello");
//! handle.recycle();
//!
//! // Reused, not reallocated.
//! let handle = recycler.get();
//! assert!(handle.data.is_empty());
//! ```
//!
//! ## Builder Configuration
//!
//! ```rust
//! use thread_recycler::RecyclerConfig;
//!
//! let config: RecyclerConfig<Vec<u8>> = RecyclerConfig::builder()
//!     .max_capacity_per_thread(8192)
//!     .ratio(8)
//!     .delayed_queue_ratio(8)
//!     .link_capacity(16)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Performance
//!
//! Same-thread `get`/`recycle` is a `Vec::pop`/`Vec::push` on thread-local
//! storage — no atomics on the hot path. Cross-thread recycling costs one
//! CAS to reserve shared capacity and one more to win the handle's claim
//! race; the home thread's next `get` pays an `Acquire` load per populated
//! link to drain them.
//!
//! ## Safety
//!
//! The `unsafe` in this crate is confined to the weak-order queue's
//! single-producer/single-consumer link chain ([`link`]), where it replaces
//! what would otherwise be a lock on every recycle. [`Handle::recycle`]
//! consumes the handle by value, so double-recycling a single handle through
//! the safe API is a compile error, not a runtime hazard.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, rust_2018_idioms)]

mod ids;
mod thread_token;

pub mod config;
pub mod error;
pub mod handle;
mod link;
mod queue;
mod recycler;
mod stack;
pub mod traits;
mod utils;

// The collector itself is always compiled in — `StackShared` records into it
// unconditionally (see `src/stats/mod.rs` for why the field isn't itself
// cfg-gated) — but it's only part of the public surface when the `stats`
// feature is enabled.
#[cfg(feature = "stats")]
#[cfg_attr(docsrs, doc(cfg(feature = "stats")))]
pub mod stats;
#[cfg(not(feature = "stats"))]
mod stats;

pub use config::{RecyclerConfig, RecyclerConfigBuilder};
pub use error::{Error, Result};
pub use handle::Handle;
pub use recycler::Recycler;
pub use traits::Recyclable;

#[cfg(feature = "stats")]
pub use stats::{PoolStatistics, StatisticsCollector, StatisticsReporter};

/// Convenient re-exports of the commonly used types.
pub mod prelude {
    pub use crate::config::{RecyclerConfig, RecyclerConfigBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::handle::Handle;
    pub use crate::recycler::Recycler;
    pub use crate::traits::Recyclable;

    #[cfg(feature = "stats")]
    pub use crate::stats::{PoolStatistics, StatisticsCollector, StatisticsReporter};
}
