//! Worker-pool capability interface and in-process backend.
//!
//! Architecture role:
//! - defines the [`Manager`] seam build coordinators dispatch through
//!   (submit / next-result / resize-concurrency / done);
//! - defines the [`Worker`] trait remote or local execution logic
//!   implements;
//! - ships [`ThreadPoolManager`], a std-thread backend for tests and
//!   single-machine builds.
//!
//! Request and response payloads are opaque serialized bytes so that
//! any execution backend can carry them unchanged.

pub mod manager;
pub mod thread_pool;

pub use manager::{Manager, Worker};
pub use thread_pool::{ThreadPoolConfig, ThreadPoolManager};
