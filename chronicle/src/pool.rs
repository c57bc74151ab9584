//! Fixed-size task-execution pool used for remote backup offload (§4.8).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::error::{ChronicleError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A handle resolved once the submitted task completes. Resolves to a
/// cancellation error if the pool is dropped before the task ran.
pub struct JobHandle<T> {
    rx: Receiver<std::result::Result<T, ChronicleError>>,
}

impl<T> JobHandle<T> {
    /// Blocks until the task completes (or was abandoned at shutdown).
    pub fn join(self) -> Result<T> {
        self.rx
            .recv()
            .unwrap_or(Err(ChronicleError::PoolStopped))
    }
}

/// A fixed set of worker threads draining one shared FIFO task queue.
/// Tasks execute in submission order among workers, with no ordering
/// guarantee across workers. `submit` after [`WorkerPool::stop`] fails with
/// [`ChronicleError::PoolStopped`].
pub struct WorkerPool {
    tasks: Sender<Job>,
    stopping: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(thread_count: usize) -> Self {
        let (tasks, rx): (Sender<Job>, Receiver<Job>) = unbounded();
        let stopping = Arc::new(AtomicBool::new(false));
        let workers = (0..thread_count.max(1))
            .map(|_| {
                let rx: Receiver<Job> = rx.clone();
                let stopping = Arc::clone(&stopping);
                std::thread::spawn(move || {
                    while let Ok(job) = rx.recv() {
                        // Once stopping, drop rather than run anything still
                        // sitting in the queue — dropping `job` drops its
                        // captured reply sender unfired, which resolves the
                        // caller's `JobHandle` to `PoolStopped`.
                        if stopping.load(Ordering::Acquire) {
                            drop(job);
                            continue;
                        }
                        job();
                    }
                })
            })
            .collect();
        WorkerPool {
            tasks,
            stopping,
            workers,
        }
    }

    /// Submits `task` and returns a handle resolved to its return value.
    pub fn submit<F, T>(&self, task: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = bounded(1);
        if self.stopping.load(Ordering::Acquire) {
            let _ = reply_tx.send(Err(ChronicleError::PoolStopped));
            return JobHandle { rx: reply_rx };
        }
        let job: Job = Box::new(move || {
            let result = task();
            let _ = reply_tx.send(Ok(result));
        });
        if self.tasks.send(job).is_err() {
            // Channel disconnected: workers already joined. The dropped
            // sender on submission makes the receiver side resolve with a
            // cancellation error since nothing will ever reply.
        }
        JobHandle { rx: reply_rx }
    }

    /// Wakes and joins every worker; queued-but-unstarted jobs are
    /// abandoned — their handles resolve to [`ChronicleError::PoolStopped`]
    /// because their reply channel is dropped unfired.
    pub fn stop(&mut self) {
        if self.stopping.swap(true, Ordering::AcqRel) {
            return;
        }
        // Dropping the sender unblocks every worker's `recv()`.
        let (dummy_tx, _dummy_rx) = unbounded::<Job>();
        let _ = std::mem::replace(&mut self.tasks, dummy_tx);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executes_submitted_tasks() {
        let pool = WorkerPool::new(4);
        let handle = pool.submit(|| 2 + 2);
        assert_eq!(handle.join().unwrap(), 4);
    }

    #[test]
    fn submit_after_stop_fails() {
        let mut pool = WorkerPool::new(2);
        pool.stop();
        let handle = pool.submit(|| 1);
        assert!(matches!(handle.join(), Err(ChronicleError::PoolStopped)));
    }

    #[test]
    fn stop_abandons_queued_but_unstarted_tasks() {
        let mut pool = WorkerPool::new(1);
        // Occupies the single worker so every task submitted below sits in
        // the queue, unstarted, when `stop()` runs.
        let busy = pool.submit(|| std::thread::sleep(std::time::Duration::from_millis(200)));
        // Give the single worker a chance to actually pick up `busy` before
        // queuing more work, so the assertions below land on tasks that were
        // genuinely still queued (not started) when `stop()` runs.
        std::thread::sleep(std::time::Duration::from_millis(20));
        let queued: Vec<_> = (0..10).map(|i| pool.submit(move || i)).collect();
        pool.stop();
        assert!(busy.join().is_ok());
        for handle in queued {
            assert!(matches!(handle.join(), Err(ChronicleError::PoolStopped)));
        }
    }

    #[test]
    fn many_tasks_all_complete() {
        let pool = WorkerPool::new(4);
        let handles: Vec<_> = (0..100).map(|i| pool.submit(move || i * 2)).collect();
        let mut results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, (0..100).map(|i| i * 2).collect::<Vec<_>>());
    }
}
