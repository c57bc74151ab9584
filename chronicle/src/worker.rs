//! Double-buffered producer/consumer pipeline with a single drain thread.
//!
//! `AsyncWorker` is the hard part of this crate: any number of producer
//! threads push rendered records into a producer [`Buffer`]; a single
//! background thread swaps it with an (empty) consumer buffer and feeds a
//! sink callback over the consumer's readable range.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::buffer::Buffer;

/// Whether producers block on a full buffer (`Safe`) or the buffer grows to
/// accept every push (`Unsafe`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncMode {
    Safe,
    Unsafe,
}

struct Shared {
    producer: Mutex<Buffer>,
    consumer_empty_or_stopping: Condvar,
    producer_has_room: Condvar,
    stopping: AtomicBool,
}

/// Owns the double buffer, the drain thread, and the sink callback it
/// drives. Dropping or calling [`AsyncWorker::stop`] joins the drain thread
/// after it has flushed whatever remains in the producer buffer.
pub struct AsyncWorker {
    shared: Arc<Shared>,
    mode: AsyncMode,
    handle: Option<JoinHandle<()>>,
}

impl AsyncWorker {
    /// Spawns the drain thread and returns a worker ready to accept pushes.
    /// `sink` is invoked with the consumer buffer's readable range each time
    /// the drain thread wakes with data; it must not panic.
    pub fn new<F>(
        buffer_size: usize,
        threshold: usize,
        linear_growth: usize,
        mode: AsyncMode,
        sink: F,
    ) -> Self
    where
        F: Fn(&[u8]) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            producer: Mutex::new(Buffer::new(buffer_size, threshold, linear_growth)),
            consumer_empty_or_stopping: Condvar::new(),
            producer_has_room: Condvar::new(),
            stopping: AtomicBool::new(false),
        });

        let drain_shared = Arc::clone(&shared);
        let mut consumer = Buffer::new(buffer_size, threshold, linear_growth);
        let handle = std::thread::spawn(move || {
            let shared = drain_shared;
            loop {
                {
                    let mut producer = shared.producer.lock();
                    shared.consumer_empty_or_stopping.wait_while(&mut producer, |p| {
                        !shared.stopping.load(Ordering::Acquire) && p.is_empty()
                    });
                    if shared.stopping.load(Ordering::Acquire) && producer.is_empty() {
                        return;
                    }
                    producer.swap(&mut consumer);
                    if mode == AsyncMode::Safe {
                        shared.producer_has_room.notify_one();
                    }
                }
                sink(consumer.begin_read());
                consumer.reset();
            }
        });

        AsyncWorker {
            shared,
            mode,
            handle: Some(handle),
        }
    }

    /// Appends `bytes` to the producer buffer and wakes the drain thread.
    ///
    /// In [`AsyncMode::Safe`], blocks while the producer buffer cannot hold
    /// `bytes` and the worker has not been stopped; returns without writing
    /// if `stop()` is called while blocked. In [`AsyncMode::Unsafe`], the
    /// producer buffer grows to accept the payload and this never blocks.
    pub fn push(&self, bytes: &[u8]) {
        let mut producer = self.shared.producer.lock();
        if self.mode == AsyncMode::Safe {
            self.shared.producer_has_room.wait_while(&mut producer, |p| {
                !self.shared.stopping.load(Ordering::Acquire) && bytes.len() > p.writable_len()
            });
            if self.shared.stopping.load(Ordering::Acquire) {
                return;
            }
        } else {
            producer.reserve(bytes.len());
        }
        producer.push(bytes);
        drop(producer);
        self.shared.consumer_empty_or_stopping.notify_one();
    }

    /// Stops the worker: wakes the drain thread and any blocked producer,
    /// then joins the drain thread. Idempotent — a second call is a no-op.
    /// Bytes already in the producer buffer are drained through the sink
    /// before the thread exits.
    pub fn stop(&mut self) {
        self.shared.stopping.store(true, Ordering::Release);
        self.shared.consumer_empty_or_stopping.notify_all();
        self.shared.producer_has_room.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AsyncWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn delivers_pushes_in_order() {
        let received: Arc<StdMutex<Vec<u8>>> = Arc::new(StdMutex::new(Vec::new()));
        let received_sink = Arc::clone(&received);
        let mut worker = AsyncWorker::new(64, 4096, 1024, AsyncMode::Safe, move |chunk| {
            received_sink.lock().unwrap().extend_from_slice(chunk);
        });
        worker.push(b"a");
        worker.push(b"b");
        worker.push(b"c");
        worker.stop();
        assert_eq!(&*received.lock().unwrap(), b"abc");
    }

    #[test]
    fn unsafe_mode_never_blocks_on_growth() {
        let mut worker = AsyncWorker::new(8, 4096, 1024, AsyncMode::Unsafe, |_| {
            std::thread::sleep(std::time::Duration::from_millis(20));
        });
        for _ in 0..50 {
            worker.push(&[0u8; 32]);
        }
        worker.stop();
    }

    #[test]
    fn stop_drains_pending_bytes() {
        let received: Arc<StdMutex<usize>> = Arc::new(StdMutex::new(0));
        let received_sink = Arc::clone(&received);
        let mut worker = AsyncWorker::new(64, 4096, 1024, AsyncMode::Safe, move |chunk| {
            *received_sink.lock().unwrap() += chunk.len();
        });
        worker.push(b"hello world");
        worker.stop();
        assert_eq!(*received.lock().unwrap(), 11);
    }
}
