//! In-process multi-threaded [`Manager`] backend.
//!
//! Each worker owns a FIFO request queue served by a fixed set of
//! threads; execution concurrency per worker is gated by a permit
//! channel whose circulating token count tracks the current limit.
//! Results from all workers funnel into one shared channel, so
//! completion order is unrelated to submission order.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use grove_common::{GroveError, Result};
use tracing::{debug, info};

use crate::manager::{Manager, Worker};

/// Thread-pool sizing controls.
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of logical workers in the pool.
    pub num_workers: usize,
    /// Per-worker concurrency bound at startup; also the maximum a
    /// later [`Manager::set_parallel_execution_per_worker`] may set.
    pub parallel_execution_per_worker: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            parallel_execution_per_worker: 5,
        }
    }
}

struct WorkerLink {
    requests: Sender<Vec<u8>>,
    permits_tx: Sender<()>,
    permits_rx: Receiver<()>,
}

/// In-process worker pool running a shared [`Worker`] on std threads.
pub struct ThreadPoolManager {
    links: Mutex<Option<Vec<WorkerLink>>>,
    results_rx: Receiver<Result<Vec<u8>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    current_limit: Mutex<usize>,
    max_limit: usize,
    num_workers: usize,
}

impl ThreadPoolManager {
    /// Starts the pool: runs per-worker setup with the welcome payload,
    /// then spawns the execution threads.
    ///
    /// # Errors
    /// Returns an error for zero-sized configuration or when any
    /// worker's setup fails.
    pub fn new(config: ThreadPoolConfig, worker: Arc<dyn Worker>, welcome: &[u8]) -> Result<Self> {
        if config.num_workers == 0 || config.parallel_execution_per_worker == 0 {
            return Err(GroveError::Distribution(
                "thread pool needs at least one worker and one execution slot".to_string(),
            ));
        }

        let (results_tx, results_rx) = unbounded::<Result<Vec<u8>>>();
        let mut links = Vec::with_capacity(config.num_workers);
        let mut threads = Vec::new();

        for worker_idx in 0..config.num_workers {
            worker.setup(worker_idx, welcome)?;

            let (requests_tx, requests_rx) = unbounded::<Vec<u8>>();
            let (permits_tx, permits_rx) = bounded::<()>(config.parallel_execution_per_worker);
            for _ in 0..config.parallel_execution_per_worker {
                permits_tx
                    .send(())
                    .map_err(|_| GroveError::Distribution("permit channel closed".to_string()))?;
            }

            for slot in 0..config.parallel_execution_per_worker {
                let worker = Arc::clone(&worker);
                let requests_rx = requests_rx.clone();
                let permits_tx = permits_tx.clone();
                let permits_rx = permits_rx.clone();
                let results_tx = results_tx.clone();
                threads.push(
                    std::thread::Builder::new()
                        .name(format!("grove-worker-{worker_idx}-{slot}"))
                        .spawn(move || {
                            while let Ok(request) = requests_rx.recv() {
                                if permits_rx.recv().is_err() {
                                    break;
                                }
                                let answer = worker.run(&request);
                                let _ = permits_tx.send(());
                                if results_tx.send(answer).is_err() {
                                    break;
                                }
                            }
                        })
                        .map_err(GroveError::Io)?,
                );
            }

            links.push(WorkerLink {
                requests: requests_tx,
                permits_tx,
                permits_rx,
            });
        }

        info!(
            workers = config.num_workers,
            parallel_execution_per_worker = config.parallel_execution_per_worker,
            operator = "ThreadPoolStart",
            "worker pool started"
        );

        Ok(Self {
            links: Mutex::new(Some(links)),
            results_rx,
            threads: Mutex::new(threads),
            current_limit: Mutex::new(config.parallel_execution_per_worker),
            max_limit: config.parallel_execution_per_worker,
            num_workers: config.num_workers,
        })
    }

    /// Moves the circulating per-worker token count to `limit`.
    ///
    /// Lowering blocks until enough in-flight requests finish and
    /// return their tokens.
    fn resize_permits(&self, limit: usize) -> Result<()> {
        let mut current = self
            .current_limit
            .lock()
            .map_err(|_| GroveError::Distribution("pool limit lock poisoned".to_string()))?;
        let links = self
            .links
            .lock()
            .map_err(|_| GroveError::Distribution("pool link lock poisoned".to_string()))?;
        let Some(links) = links.as_ref() else {
            return Err(GroveError::Distribution(
                "worker pool is shut down".to_string(),
            ));
        };
        for link in links {
            if limit < *current {
                for _ in 0..(*current - limit) {
                    link.permits_rx.recv().map_err(|_| {
                        GroveError::Distribution("permit channel closed".to_string())
                    })?;
                }
            } else {
                for _ in 0..(limit - *current) {
                    link.permits_tx.send(()).map_err(|_| {
                        GroveError::Distribution("permit channel closed".to_string())
                    })?;
                }
            }
        }
        *current = limit;
        Ok(())
    }
}

impl Manager for ThreadPoolManager {
    fn num_workers(&self) -> usize {
        self.num_workers
    }

    fn submit(&self, worker_idx: usize, request: Vec<u8>) -> Result<()> {
        let links = self
            .links
            .lock()
            .map_err(|_| GroveError::Distribution("pool link lock poisoned".to_string()))?;
        let Some(links) = links.as_ref() else {
            return Err(GroveError::Distribution(
                "worker pool is shut down".to_string(),
            ));
        };
        let link = links.get(worker_idx).ok_or_else(|| {
            GroveError::Distribution(format!(
                "worker index {worker_idx} out of range for pool of {}",
                self.num_workers
            ))
        })?;
        debug!(
            worker_idx,
            bytes = request.len(),
            operator = "ThreadPoolSubmit",
            "request queued"
        );
        link.requests
            .send(request)
            .map_err(|_| GroveError::Distribution("worker request queue closed".to_string()))
    }

    fn next_result(&self) -> Result<Vec<u8>> {
        self.results_rx.recv().map_err(|_| {
            GroveError::Distribution("worker pool has no pending results".to_string())
        })?
    }

    fn set_parallel_execution_per_worker(&self, limit: usize) -> Result<()> {
        if limit == 0 || limit > self.max_limit {
            return Err(GroveError::Distribution(format!(
                "per-worker execution limit must be in 1..={}, got {limit}",
                self.max_limit
            )));
        }
        self.resize_permits(limit)
    }

    fn done(&self) -> Result<()> {
        {
            let mut links = self
                .links
                .lock()
                .map_err(|_| GroveError::Distribution("pool link lock poisoned".to_string()))?;
            if links.is_none() {
                return Ok(());
            }
            // Threads parked on a narrowed permit channel need their
            // tokens back before the queues close.
            drop(links);
            self.resize_permits(self.max_limit)?;
            links = self
                .links
                .lock()
                .map_err(|_| GroveError::Distribution("pool link lock poisoned".to_string()))?;
            *links = None;
        }
        let threads = {
            let mut threads = self
                .threads
                .lock()
                .map_err(|_| GroveError::Distribution("pool thread lock poisoned".to_string()))?;
            std::mem::take(&mut *threads)
        };
        for handle in threads {
            handle
                .join()
                .map_err(|_| GroveError::Distribution("worker thread panicked".to_string()))?;
        }
        info!(operator = "ThreadPoolDone", "worker pool drained and shut down");
        Ok(())
    }
}

impl Drop for ThreadPoolManager {
    fn drop(&mut self) {
        let _ = self.done();
    }
}
