//! Producer/consumer thread pool with fan-out.
//!
//! A fixed set of consumer workers serves an unbounded task queue. Each
//! enqueue request spawns a short-lived producer thread that parses the
//! work (`ProduceTask::produce`) and pushes the result. A queued task is
//! not popped when first seen: it stays at the head until every one of its
//! worker slots has been claimed, so up to `total_workers` consumers
//! execute the same task concurrently, each with a distinct
//! `curr_worker` index. The queue mutex is never held across task
//! execution.
//!
//! Shutdown latches a stop flag, waits for outstanding producers to
//! drain, then joins the consumers. In-flight tasks run to completion; a
//! producer that pushes after the latch has its task discarded.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::error::ServerError;
use crate::signal::BlockedSignals;

/// Error type producers may fail with.
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Parses one unit of incoming work into an executable task.
pub trait ProduceTask: Send + 'static {
    /// Runs on a dedicated short-lived thread. On error the work is
    /// dropped; nothing reaches the queue.
    fn produce(self: Box<Self>, pool_size: usize) -> Result<Arc<dyn ConsumeTask>, TaskError>;
}

/// A task executed by the consumer pool, possibly by several workers.
pub trait ConsumeTask: Send + Sync + 'static {
    /// Worker slots this task wants; at least 1.
    fn total_workers(&self) -> usize;

    /// Execute one worker slot. `curr_worker` is unique per slot and
    /// strictly below `total_workers`.
    fn consume(&self, curr_worker: usize, total_workers: usize);
}

struct QueuedTask {
    task: Arc<dyn ConsumeTask>,
    claimed: usize,
}

#[derive(Default)]
struct PoolState {
    queue: VecDeque<QueuedTask>,
    stop: bool,
    producers: usize,
}

struct Shared {
    state: Mutex<PoolState>,
    available: Condvar,
    drained: Condvar,
}

/// The consumer pool. Dropping it performs the full shutdown sequence.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    size: usize,
}

impl ThreadPool {
    /// Spawn `size` consumer workers.
    pub fn new(size: usize) -> Result<Self, ServerError> {
        if size < 1 {
            return Err(ServerError::InvalidArgument(
                "the thread pool size must be strictly positive".to_string(),
            ));
        }
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState::default()),
            available: Condvar::new(),
            drained: Condvar::new(),
        });
        // New threads inherit the creator's signal mask; keep it fully
        // blocked while they start.
        let _mask = BlockedSignals::new();
        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("consumer-{i}"))
                .spawn(move || consumer_loop(&shared))
                .map_err(ServerError::Io)?;
            workers.push(handle);
        }
        Ok(ThreadPool { shared, workers, size })
    }

    /// Number of consumer workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawn a detached producer for one unit of work.
    pub fn add_task(&self, producer_task: Box<dyn ProduceTask>) -> Result<(), ServerError> {
        self.shared.state.lock().producers += 1;
        let shared = Arc::clone(&self.shared);
        let pool_size = self.size;
        let _mask = BlockedSignals::new();
        let spawned = thread::Builder::new()
            .name("producer".to_string())
            .spawn(move || producer_run(&shared, producer_task, pool_size));
        if let Err(e) = spawned {
            let mut state = self.shared.state.lock();
            state.producers -= 1;
            if state.producers == 0 {
                self.shared.drained.notify_all();
            }
            return Err(ServerError::Io(e));
        }
        Ok(())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.stop = true;
        self.shared.available.notify_all();
        while state.producers > 0 {
            self.shared.drained.wait(&mut state);
        }
        drop(state);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        debug!("thread pool stopped");
    }
}

fn producer_run(shared: &Shared, task: Box<dyn ProduceTask>, pool_size: usize) {
    let produced = task.produce(pool_size);
    let mut state = shared.state.lock();
    match produced {
        Ok(task) if !state.stop => {
            state.queue.push_back(QueuedTask { task, claimed: 0 });
            if state.queue.len() == 1 {
                shared.available.notify_all();
            }
        }
        Ok(_) => debug!("pool is stopping, dropping produced task"),
        Err(e) => debug!(error = %e, "producer failed, dropping connection"),
    }
    state.producers -= 1;
    if state.producers == 0 {
        shared.drained.notify_all();
    }
}

fn consumer_loop(shared: &Shared) {
    loop {
        let mut state = shared.state.lock();
        while !state.stop && state.queue.is_empty() {
            shared.available.wait(&mut state);
        }
        if state.stop {
            break;
        }
        let Some(head) = state.queue.front_mut() else {
            continue;
        };
        let task = Arc::clone(&head.task);
        let curr_worker = head.claimed;
        let total_workers = task.total_workers();
        head.claimed += 1;
        if head.claimed >= total_workers {
            state.queue.pop_front();
        }
        drop(state);

        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            task.consume(curr_worker, total_workers);
        }));
        if run.is_err() {
            error!("consumer task panicked");
        }
    }
}

/// Ceiling-share slice of `data_len` for one worker: worker k takes
/// ⌈remaining / (total − k)⌉ of what earlier workers left. Shares sum to
/// `data_len`; none is zero while `total_workers ≤ data_len`.
pub fn worker_share(data_len: usize, curr_worker: usize, total_workers: usize) -> usize {
    debug_assert!(curr_worker < total_workers);
    let mut remaining = data_len;
    let mut share = data_len;
    for k in 0..=curr_worker {
        share = remaining.div_ceil(total_workers - k);
        remaining -= share;
    }
    share
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct Recorder {
        total: usize,
        seen: Mutex<Vec<usize>>,
        finished: AtomicUsize,
    }

    impl ConsumeTask for Recorder {
        fn total_workers(&self) -> usize {
            self.total
        }

        fn consume(&self, curr_worker: usize, total_workers: usize) {
            assert_eq!(total_workers, self.total);
            self.seen.lock().push(curr_worker);
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Immediate(Arc<dyn ConsumeTask>);

    impl ProduceTask for Immediate {
        fn produce(
            self: Box<Self>,
            _pool_size: usize,
        ) -> Result<Arc<dyn ConsumeTask>, TaskError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl ProduceTask for Failing {
        fn produce(
            self: Box<Self>,
            _pool_size: usize,
        ) -> Result<Arc<dyn ConsumeTask>, TaskError> {
            Err("no task for you".into())
        }
    }

    struct Panicking;

    impl ConsumeTask for Panicking {
        fn total_workers(&self) -> usize {
            1
        }

        fn consume(&self, _curr_worker: usize, _total_workers: usize) {
            panic!("deliberate");
        }
    }

    fn wait_for(pred: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !pred() {
            assert!(Instant::now() < deadline, "timed out waiting for the pool");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn rejects_an_empty_pool() {
        assert!(matches!(
            ThreadPool::new(0),
            Err(ServerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn fans_a_task_out_across_all_worker_slots() {
        let pool = ThreadPool::new(4).unwrap();
        let task = Arc::new(Recorder {
            total: 4,
            seen: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        });
        pool.add_task(Box::new(Immediate(task.clone()))).unwrap();
        wait_for(|| task.finished.load(Ordering::SeqCst) == 4);
        let mut seen = task.seen.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn survives_failing_producers_and_panicking_tasks() {
        let pool = ThreadPool::new(1).unwrap();
        pool.add_task(Box::new(Failing)).unwrap();
        pool.add_task(Box::new(Immediate(Arc::new(Panicking)))).unwrap();

        let task = Arc::new(Recorder {
            total: 1,
            seen: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        });
        pool.add_task(Box::new(Immediate(task.clone()))).unwrap();
        wait_for(|| task.finished.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn drop_joins_workers_and_drains_producers() {
        let pool = ThreadPool::new(2).unwrap();
        let task = Arc::new(Recorder {
            total: 2,
            seen: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        });
        pool.add_task(Box::new(Immediate(task.clone()))).unwrap();
        wait_for(|| task.finished.load(Ordering::SeqCst) == 2);
        drop(pool);
        assert_eq!(task.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shares_cover_the_data_exactly() {
        for data_len in 1..=64usize {
            for total in 1..=data_len {
                let mut sum = 0;
                for worker in 0..total {
                    let share = worker_share(data_len, worker, total);
                    assert!(share >= 1);
                    sum += share;
                }
                assert_eq!(sum, data_len);
            }
        }
        // Earlier workers take the extra.
        assert_eq!(worker_share(7, 0, 3), 3);
        assert_eq!(worker_share(7, 1, 3), 2);
        assert_eq!(worker_share(7, 2, 3), 2);
        // A zero-length payload yields zero shares.
        assert_eq!(worker_share(0, 0, 3), 0);
    }
}
