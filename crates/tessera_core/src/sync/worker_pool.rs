//! # Worker Pool
//!
//! A fixed set of long-lived threads fed through a crossbeam channel.
//!
//! ```text
//!  map_chunks(chunks, f)
//!     │  one job per chunk          ┌──────────┐
//!     ├───────────────────────────> │ worker 0 │──┐
//!     ├───────────────────────────> │ worker 1 │──┼──> (index, result)
//!     └───────────────────────────> │ worker n │──┘          │
//!                                   └──────────┘             │
//!  <──────────── results reordered by chunk index ───────────┘
//! ```
//!
//! `map_chunks` blocks until every chunk has reported back, so a system
//! that fans out through the pool has finished its parallel phase when the
//! call returns. Jobs own their input; nothing borrowed from the caller
//! crosses into a worker.
//!
//! A panicking job is caught on the worker, which keeps running. The
//! caller sees the lost chunk as [`CoreError::WorkerLost`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::error::{CoreError, CoreResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Counters shared between the pool handle and its workers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Jobs that ran to completion.
    pub completed: u64,
    /// Jobs that panicked.
    pub panicked: u64,
}

struct Shared {
    stats: Mutex<PoolStats>,
    /// Jobs submitted but not yet finished.
    pending: Mutex<usize>,
    idle: Condvar,
}

impl Shared {
    fn finish(&self, ok: bool) {
        {
            let mut stats = self.stats.lock();
            if ok {
                stats.completed += 1;
            } else {
                stats.panicked += 1;
            }
        }
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Persistent pool of worker threads.
///
/// # Example
///
/// ```rust,ignore
/// let pool = WorkerPool::new(4)?;
/// let sums = pool.map_chunks(vec![vec![1, 2], vec![3]], |c| c.iter().sum::<i32>())?;
/// assert_eq!(sums, vec![3, 3]);
/// ```
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Starts `size` worker threads (at least one).
    ///
    /// # Errors
    ///
    /// [`CoreError::WorkerSpawn`] if the OS refuses a thread. Threads that
    /// did start are shut down before returning.
    pub fn new(size: usize) -> CoreResult<Self> {
        let size = size.max(1);
        let (sender, receiver) = unbounded::<Job>();
        let shared = Arc::new(Shared {
            stats: Mutex::new(PoolStats::default()),
            pending: Mutex::new(0),
            idle: Condvar::new(),
        });

        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(size),
            shared,
        };

        for index in 0..size {
            let rx = receiver.clone();
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("tessera-worker-{index}"))
                .spawn(move || Self::worker_loop(index, &rx, &shared))
                .map_err(|e| CoreError::WorkerSpawn {
                    index,
                    reason: e.to_string(),
                })?;
            pool.workers.push(handle);
        }

        debug!(workers = size, "worker pool started");
        Ok(pool)
    }

    fn worker_loop(index: usize, jobs: &Receiver<Job>, shared: &Shared) {
        // Ends once every sender is gone.
        while let Ok(job) = jobs.recv() {
            let ok = panic::catch_unwind(AssertUnwindSafe(job)).is_ok();
            if !ok {
                error!(worker = index, "job panicked");
            }
            shared.finish(ok);
        }
    }

    /// Number of worker threads.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Snapshot of the job counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        *self.shared.stats.lock()
    }

    /// Queues a fire-and-forget job.
    ///
    /// # Errors
    ///
    /// [`CoreError::PoolClosed`] after [`WorkerPool::shutdown`].
    pub fn execute<F>(&self, job: F) -> CoreResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(CoreError::PoolClosed)?;
        *self.shared.pending.lock() += 1;
        if sender.send(Box::new(job)).is_err() {
            self.shared.finish(false);
            return Err(CoreError::PoolClosed);
        }
        Ok(())
    }

    /// Runs `f` on every chunk in parallel and returns the results in
    /// chunk order.
    ///
    /// Blocks until all chunks are done. Must not be called from inside a
    /// pool job.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PoolClosed`] after shutdown
    /// - [`CoreError::WorkerLost`] if any chunk panicked; results of the
    ///   other chunks are discarded
    pub fn map_chunks<T, R, F>(&self, chunks: Vec<Vec<T>>, f: F) -> CoreResult<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(Vec<T>) -> R + Send + Sync + 'static,
    {
        let expected = chunks.len();
        if expected == 0 {
            return Ok(Vec::new());
        }

        let f = Arc::new(f);
        let (result_tx, result_rx) = unbounded::<(usize, R)>();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let f = Arc::clone(&f);
            let tx = result_tx.clone();
            self.execute(move || {
                let result = f(chunk);
                // Receiver only disappears if the caller is gone.
                let _ = tx.send((index, result));
            })?;
        }
        drop(result_tx);

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(expected).collect();
        for (index, result) in result_rx.iter() {
            slots[index] = Some(result);
        }

        let missing = slots.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            return Err(CoreError::WorkerLost { expected, missing });
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// Blocks until every queued job has finished.
    ///
    /// Must not be called from inside a pool job.
    pub fn wait_idle(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.idle.wait(&mut pending);
        }
    }

    /// Stops accepting work, lets queued jobs finish and joins the workers.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        debug!("worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_map_chunks_preserves_order() {
        let pool = WorkerPool::new(3).unwrap();
        let chunks: Vec<Vec<u32>> = (0..10).map(|i| vec![i; i as usize + 1]).collect();
        let sums = pool.map_chunks(chunks, |c| c.iter().sum::<u32>()).unwrap();
        let expected: Vec<u32> = (0..10).map(|i| i * (i + 1)).collect();
        assert_eq!(sums, expected);
    }

    #[test]
    fn test_map_chunks_empty() {
        let pool = WorkerPool::new(2).unwrap();
        let out: Vec<usize> = pool.map_chunks(Vec::<Vec<u8>>::new(), |c| c.len()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_panicking_chunk_is_reported() {
        let pool = WorkerPool::new(2).unwrap();
        let result = pool.map_chunks(vec![vec![1], vec![0], vec![2]], |c| {
            assert!(c[0] != 0, "boom");
            c[0]
        });
        assert_eq!(
            result,
            Err(CoreError::WorkerLost {
                expected: 3,
                missing: 1
            })
        );

        // Pool survives the panic.
        let again = pool.map_chunks(vec![vec![5]], |c| c[0]).unwrap();
        assert_eq!(again, vec![5]);
        pool.wait_idle();
        assert_eq!(pool.stats().panicked, 1);
    }

    #[test]
    fn test_execute_and_wait_idle() {
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }
        pool.wait_idle();
        assert_eq!(counter.load(Ordering::Relaxed), 100);
        assert_eq!(pool.stats().completed, 100);
    }

    #[test]
    fn test_closed_pool_rejects_work() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.execute(|| {}), Err(CoreError::PoolClosed));
        assert_eq!(
            pool.map_chunks(vec![vec![1]], |c| c[0]),
            Err(CoreError::PoolClosed)
        );
    }
}
