//! # Core Error Types
//!
//! Lookup misses are not errors in this crate: they return `Option`. The
//! variants below cover operations that were asked to do something and
//! couldn't.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors raised by the registry and the worker pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A component was attached to an entity that is not in the registry.
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread {index}: {reason}")]
    WorkerSpawn {
        /// Index of the worker that failed to start.
        index: usize,
        /// Error reported by the OS.
        reason: String,
    },

    /// One or more chunk jobs panicked before returning a result.
    #[error("worker pool lost {missing} of {expected} chunk results")]
    WorkerLost {
        /// Number of chunks submitted.
        expected: usize,
        /// Number of chunks that never reported back.
        missing: usize,
    },

    /// Work was submitted after the pool started shutting down.
    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
