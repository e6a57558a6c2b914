use grove_common::Result;

/// Worker-side execution logic.
///
/// Implementations are backend-agnostic: request and response payloads
/// are opaque serialized bytes, so the same worker logic runs behind
/// any [`Manager`] backend.
pub trait Worker: Send + Sync {
    /// One-time per-worker initialization with the manager's startup
    /// payload.
    ///
    /// # Errors
    /// Returns an error when the worker cannot come up; pool creation
    /// fails as a whole.
    fn setup(&self, _worker_idx: usize, _welcome: &[u8]) -> Result<()> {
        Ok(())
    }

    /// Executes one request and returns its serialized answer.
    ///
    /// # Errors
    /// Returns an error for malformed requests or execution failures;
    /// the error is surfaced unchanged through [`Manager::next_result`].
    fn run(&self, request: &[u8]) -> Result<Vec<u8>>;
}

/// Worker-pool capability consumed by build coordinators.
///
/// Backends (in-process thread pool, remote process pool) implement the
/// same five operations. The only cross-request ordering contract is
/// that every submitted request eventually yields exactly one result;
/// completion order is unspecified and not tied to submission order.
pub trait Manager: Send + Sync {
    /// Number of workers in the pool.
    fn num_workers(&self) -> usize;

    /// Submits one asynchronous request targeted at a specific worker.
    ///
    /// # Errors
    /// Returns an error for an out-of-range worker index or when the
    /// pool is shut down.
    fn submit(&self, worker_idx: usize, request: Vec<u8>) -> Result<()>;

    /// Blocks until the next completed result is available.
    ///
    /// # Errors
    /// Returns the worker's own failure for a failed request, or a
    /// distribution error when no result can ever arrive.
    fn next_result(&self) -> Result<Vec<u8>>;

    /// Adjusts the per-worker concurrency bound at runtime.
    ///
    /// Lowering the bound blocks until enough in-flight requests have
    /// drained to satisfy the new limit.
    ///
    /// # Errors
    /// Returns an error for a zero limit or a shut-down pool.
    fn set_parallel_execution_per_worker(&self, limit: usize) -> Result<()>;

    /// Drains outstanding work and releases pooled resources.
    ///
    /// Idempotent; later calls are no-ops.
    ///
    /// # Errors
    /// Returns an error when worker shutdown itself fails.
    fn done(&self) -> Result<()>;
}
