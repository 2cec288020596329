use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use async_channel::{Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("too many operations in progress, try again shortly")]
    QueueFull,

    #[error("the application is shutting down")]
    ShutDown,

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to start worker thread: {0}")]
    Spawn(String),
}

/// Tracks one submitted task and lets it be cancelled
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    name: String,
    cancelled: Arc<AtomicBool>,
    pool_closed: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests cancellation. Tasks check this between steps; work already
    /// blocked on I/O runs to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once the task or the whole pool was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.pool_closed.load(Ordering::SeqCst)
    }
}

type Job = Box<dyn FnOnce(&TaskHandle) + Send + 'static>;

/// Counts queued plus running tasks
#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn increment(&self) {
        *self.count.lock() += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Fixed set of worker threads fed by a bounded queue.
///
/// Every task receives its [`TaskHandle`]; a task that finds itself cancelled
/// should finish its cleanup (e.g. report completion) and return early.
pub struct TaskPool {
    sender: Sender<(TaskHandle, Job)>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    in_flight: Arc<InFlight>,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("workers", &self.workers.lock().len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl TaskPool {
    pub fn new(threads: usize, capacity: usize) -> Result<Self, PoolError> {
        let (sender, receiver) = async_channel::bounded(capacity.max(1));
        let in_flight = Arc::new(InFlight::default());

        let mut workers = Vec::with_capacity(threads.max(1));
        for index in 0..threads.max(1) {
            let receiver = receiver.clone();
            let in_flight = Arc::clone(&in_flight);
            let worker = std::thread::Builder::new()
                .name(format!("schnizzle-worker-{index}"))
                .spawn(move || run_worker(receiver, in_flight))
                .map_err(|e| PoolError::Spawn(e.to_string()))?;
            workers.push(worker);
        }

        Ok(Self {
            sender,
            workers: Mutex::new(workers),
            in_flight,
            closed: Arc::new(AtomicBool::new(false)),
            next_id: AtomicU64::new(1),
        })
    }

    /// Queues `job`. Fails immediately when the queue is full or the pool
    /// has been shut down.
    pub fn submit<F>(&self, name: &str, job: F) -> Result<TaskHandle, PoolError>
    where
        F: FnOnce(&TaskHandle) + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PoolError::ShutDown);
        }
        let handle = TaskHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_owned(),
            cancelled: Arc::new(AtomicBool::new(false)),
            pool_closed: Arc::clone(&self.closed),
        };

        self.in_flight.increment();
        match self.sender.try_send((handle.clone(), Box::new(job))) {
            Ok(()) => {
                log::debug!("Queued task #{} '{}'", handle.id, handle.name);
                Ok(handle)
            }
            Err(err) => {
                self.in_flight.decrement();
                Err(match err {
                    TrySendError::Full(_) => PoolError::QueueFull,
                    TrySendError::Closed(_) => PoolError::ShutDown,
                })
            }
        }
    }

    /// Tasks queued or running
    pub fn in_flight(&self) -> usize {
        *self.in_flight.count.lock()
    }

    /// Blocks until no task is queued or running
    pub fn wait_idle(&self) {
        let mut count = self.in_flight.count.lock();
        while *count > 0 {
            self.in_flight.idle.wait(&mut count);
        }
    }

    /// Cancels everything still queued, waits for running tasks and joins the
    /// workers. Later submissions fail with [`PoolError::ShutDown`].
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("Shutting down worker pool ({} tasks in flight)", self.in_flight());
        self.sender.close();
        for worker in self.workers.lock().drain(..) {
            if worker.join().is_err() {
                log::error!("A worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(receiver: Receiver<(TaskHandle, Job)>, in_flight: Arc<InFlight>) {
    while let Ok((handle, job)) = receiver.recv_blocking() {
        log::debug!("Running task #{} '{}'", handle.id, handle.name);
        if catch_unwind(AssertUnwindSafe(|| job(&handle))).is_err() {
            log::error!("Task #{} '{}' panicked", handle.id, handle.name);
        }
        in_flight.decrement();
    }
}
