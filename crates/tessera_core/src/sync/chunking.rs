//! # Chunk Planning
//!
//! Splits a filtered entity list into contiguous, disjoint chunks, one per
//! worker.
//!
//! ```text
//! 10 entities, 3 workers:
//!   [0 1 2 3][4 5 6][7 8 9]
//!    base+1   base   base      base = 10 / 3, first 10 % 3 chunks get +1
//! ```
//!
//! The same input length and worker count always give the same plan, and
//! chunk sizes never differ by more than one.

use std::ops::Range;
use std::thread;

/// Tunables for deriving the worker count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Sets up to this size always use `min_workers`.
    pub small_set_threshold: usize,
    /// One extra worker per this many entities above the threshold.
    pub entities_per_worker: usize,
    /// Worker count for small sets, and the base added for large ones.
    pub min_workers: usize,
    /// Upper bound for large sets. `None` uses the hardware concurrency.
    pub max_workers: Option<usize>,
}

impl SchedulerConfig {
    /// Default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            small_set_threshold: tessera_shared::constants::SMALL_SET_THRESHOLD,
            entities_per_worker: tessera_shared::constants::ENTITIES_PER_WORKER,
            min_workers: tessera_shared::constants::MIN_WORKERS,
            max_workers: None,
        }
    }

    /// Upper bound on workers for large sets.
    #[must_use]
    pub fn worker_cap(&self) -> usize {
        self.max_workers.unwrap_or_else(hardware_concurrency).max(1)
    }

    /// Number of workers to use for `len` entities.
    ///
    /// Sets of at most `small_set_threshold` entities get `min_workers`.
    /// Larger sets get `len / entities_per_worker + min_workers`, capped by
    /// [`SchedulerConfig::worker_cap`]. Never returns zero.
    #[must_use]
    pub fn worker_count(&self, len: usize) -> usize {
        if len <= self.small_set_threshold {
            return self.min_workers.max(1);
        }
        let per_worker = self.entities_per_worker.max(1);
        (len / per_worker + self.min_workers)
            .min(self.worker_cap())
            .max(1)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of hardware threads, or 1 if it can't be determined.
#[must_use]
pub fn hardware_concurrency() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Balanced contiguous partition of `len` items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    ranges: Vec<Range<usize>>,
    len: usize,
}

impl ChunkPlan {
    /// Plans `len` items across `workers` chunks.
    ///
    /// Never produces empty chunks: with fewer items than workers, each item
    /// gets its own chunk. Zero items give an empty plan.
    #[must_use]
    pub fn new(len: usize, workers: usize) -> Self {
        let chunks = workers.max(1).min(len);
        let mut ranges = Vec::with_capacity(chunks);
        if chunks > 0 {
            let base = len / chunks;
            let extra = len % chunks;
            let mut start = 0;
            for i in 0..chunks {
                let size = base + usize::from(i < extra);
                ranges.push(start..start + size);
                start += size;
            }
        }
        Self { ranges, len }
    }

    /// Plans `len` items using the worker count from `config`.
    #[must_use]
    pub fn for_len(len: usize, config: &SchedulerConfig) -> Self {
        Self::new(len, config.worker_count(len))
    }

    /// Index ranges of each chunk, in order.
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of chunks.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.ranges.len()
    }

    /// Number of items covered.
    #[inline]
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.len
    }

    /// Moves `items` into owned chunks following this plan.
    ///
    /// Items past the planned length are appended to the last chunk; a
    /// shorter input yields shorter trailing chunks.
    #[must_use]
    pub fn split<T>(&self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut out = Vec::with_capacity(self.ranges.len());
        let mut iter = items.into_iter();
        for range in &self.ranges {
            out.push(iter.by_ref().take(range.len()).collect::<Vec<_>>());
        }
        if let Some(last) = out.last_mut() {
            last.extend(iter);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(cap: usize) -> SchedulerConfig {
        SchedulerConfig {
            max_workers: Some(cap),
            ..SchedulerConfig::new()
        }
    }

    #[test]
    fn test_small_sets_use_two_workers() {
        let cfg = config(16);
        assert_eq!(cfg.worker_count(0), 2);
        assert_eq!(cfg.worker_count(10), 2);
        assert_eq!(cfg.worker_count(1000), 2);
    }

    #[test]
    fn test_large_sets_scale_with_cap() {
        let cfg = config(16);
        assert_eq!(cfg.worker_count(1001), 3);
        assert_eq!(cfg.worker_count(5_000), 7);
        assert_eq!(cfg.worker_count(100_000), 16);
        assert_eq!(config(1).worker_count(50_000), 1);
    }

    #[test]
    fn test_plan_partitions_exactly() {
        for len in [0usize, 1, 2, 7, 10, 999, 1001, 4321] {
            for workers in 1..=9 {
                let plan = ChunkPlan::new(len, workers);
                let mut next = 0;
                for range in plan.ranges() {
                    assert_eq!(range.start, next, "gap or overlap at {len}/{workers}");
                    assert!(!range.is_empty());
                    next = range.end;
                }
                assert_eq!(next, len);

                if let (Some(min), Some(max)) = (
                    plan.ranges().iter().map(Range::len).min(),
                    plan.ranges().iter().map(Range::len).max(),
                ) {
                    assert!(max - min <= 1);
                    assert!(max <= len.div_ceil(plan.chunk_count()));
                }
            }
        }
    }

    #[test]
    fn test_more_workers_than_items() {
        let plan = ChunkPlan::new(3, 8);
        assert_eq!(plan.ranges(), &[0..1, 1..2, 2..3]);
        assert!(ChunkPlan::new(0, 4).ranges().is_empty());
    }

    #[test]
    fn test_split_keeps_order() {
        let plan = ChunkPlan::new(10, 3);
        let chunks = plan.split((0..10).collect::<Vec<_>>());
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let cfg = config(4);
        assert_eq!(ChunkPlan::for_len(12_345, &cfg), ChunkPlan::for_len(12_345, &cfg));
    }
}
