//! # Parallel Execution
//!
//! Chunked fan-out for per-entity systems.
//!
//! ```text
//! filtered ids ──> ChunkPlan ──> owned chunks ──> WorkerPool ──> results
//!                 (contiguous,                   (joins before
//!                  disjoint)                      returning)
//! ```
//!
//! Chunks never share an entity, and each job owns the component copies it
//! works on, so no locking is needed around component data. The registry
//! itself is borrowed mutably by the calling system for the whole phase,
//! which rules out structural changes while workers are running.

mod chunking;
mod worker_pool;

pub use chunking::{hardware_concurrency, ChunkPlan, SchedulerConfig};
pub use worker_pool::{PoolStats, WorkerPool};
