//! Parallel directory traversal.
//!
//! A fixed pool of walker threads pulls directory tasks from a shared queue.
//! Each task lists one directory under the listing limiter, sends a size
//! event per file and queues one new task per subdirectory. A supervisor
//! thread waits on the completion tracker and then stops the pool, which
//! closes the size channel the caller is draining.

pub mod aggregator;
pub mod limiter;
pub mod lister;
pub mod session;
pub mod tracker;
pub mod walker;

pub use session::{ScanSession, run_scan, start_scan};
