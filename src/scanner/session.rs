use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use tracing::{debug, info};

use crate::errors::ScanError;
use crate::model::{ScanOptions, ScanReport, SizeEvent};
use crate::scanner::aggregator;
use crate::scanner::tracker::CompletionTracker;
use crate::scanner::walker::{DirectoryTask, WalkShared, Walker, WorkerMessage, worker_loop};

const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// A running scan. Dropping it cancels the scan and joins its threads.
pub struct ScanSession {
    root: PathBuf,
    receiver: Receiver<SizeEvent>,
    shared: Arc<WalkShared>,
    workers: Vec<JoinHandle<()>>,
    supervisor: Option<JoinHandle<()>>,
    started: Instant,
}

impl ScanSession {
    /// Asks every walker to stop at its next check. The scan still has to be
    /// finished or dropped to release its threads.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Drains the size channel on the calling thread and returns the totals
    /// once every walker has finished.
    pub fn finish(mut self) -> Result<ScanReport, ScanError> {
        let totals = aggregator::drain(&self.receiver);
        self.join_threads();

        if let Some(error) = self.shared.take_fatal() {
            return Err(error);
        }
        if self.shared.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let report = ScanReport {
            root: self.root.clone(),
            directories: self.shared.directories(),
            files: totals.files,
            total_bytes: totals.bytes,
            unreadable_dirs: self.shared.unreadable_dirs(),
            skipped_files: self.shared.skipped_files(),
            peak_concurrent_listings: self.shared.limiter.peak(),
            elapsed: self.started.elapsed(),
        };
        info!(
            root = %report.root.display(),
            directories = report.directories,
            files = report.files,
            bytes = report.total_bytes,
            unreadable = report.unreadable_dirs,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scan complete"
        );
        Ok(report)
    }

    fn join_threads(&mut self) {
        if let Some(supervisor) = self.supervisor.take() {
            let _ = supervisor.join();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if self.supervisor.is_none() && self.workers.is_empty() {
            return;
        }
        self.shared.cancel();
        // Walkers may be blocked on a full channel.
        for _ in self.receiver.iter() {}
        self.join_threads();
    }
}

pub fn start_scan(options: ScanOptions) -> Result<ScanSession, ScanError> {
    let started = Instant::now();
    let shared = Arc::new(WalkShared::new(&options));
    // Unbounded: a worker queueing a child must never wait on other workers.
    let (task_tx, task_rx) = unbounded();
    // Bounded queue keeps producers from racing ahead of the aggregator.
    let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);

    // Registered before any thread exists, so the supervisor cannot observe
    // an empty tracker before the root has been counted.
    let root = DirectoryTask::new(options.root.clone(), 0, shared.tracker.register());
    let _ = task_tx.send(WorkerMessage::Walk(root));

    let worker_count = options.workers.max(1);
    info!(
        root = %options.root.display(),
        workers = worker_count,
        max_open_dirs = shared.limiter.capacity(),
        metric = options.metric.as_str(),
        "starting scan"
    );

    let mut workers = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        let walker = Walker::new(Arc::clone(&shared), task_tx.clone(), event_tx.clone());
        let queue = task_rx.clone();
        let spawned = thread::Builder::new()
            .name(format!("walker-{id}"))
            .spawn(move || worker_loop(walker, queue));
        match spawned {
            Ok(handle) => workers.push(handle),
            Err(error) => {
                drop(event_rx);
                abort_startup(&shared, &task_tx, workers);
                return Err(ScanError::Spawn(error));
            }
        }
    }
    drop(event_tx);

    let tracker = shared.tracker.clone();
    let shutdown_tx = task_tx.clone();
    let supervisor = thread::Builder::new()
        .name("scan-supervisor".to_string())
        .spawn(move || supervise(&tracker, &shutdown_tx, worker_count));
    let supervisor = match supervisor {
        Ok(handle) => handle,
        Err(error) => {
            drop(event_rx);
            abort_startup(&shared, &task_tx, workers);
            return Err(ScanError::Spawn(error));
        }
    };

    Ok(ScanSession {
        root: options.root,
        receiver: event_rx,
        shared,
        workers,
        supervisor: Some(supervisor),
        started,
    })
}

/// Blocking convenience over [`start_scan`] and [`ScanSession::finish`].
pub fn run_scan(options: ScanOptions) -> Result<ScanReport, ScanError> {
    start_scan(options)?.finish()
}

/// Waits for the last pending task, then stops the pool. Once every worker
/// has exited, every size sender is gone and the aggregator sees the channel
/// close.
fn supervise(tracker: &CompletionTracker, tasks: &Sender<WorkerMessage>, workers: usize) {
    tracker.wait();
    debug!(workers, "all directory tasks finished, stopping workers");
    for _ in 0..workers {
        let _ = tasks.send(WorkerMessage::Shutdown);
    }
}

fn abort_startup(
    shared: &WalkShared,
    tasks: &Sender<WorkerMessage>,
    workers: Vec<JoinHandle<()>>,
) {
    shared.cancel();
    // Cancelled walkers skip whatever is queued, so the tracker empties.
    if !workers.is_empty() {
        supervise(&shared.tracker, tasks, workers.len());
    }
    for worker in workers {
        let _ = worker.join();
    }
}
