use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::errors::ScanError;
use crate::model::{EntryKind, FileErrorPolicy, ScanOptions, SizeEvent, SizeMetric};
use crate::platform::metric_size;
use crate::scanner::limiter::Limiter;
use crate::scanner::lister::list_directory;
use crate::scanner::tracker::{CompletionTracker, Registration};

/// One directory waiting to be listed. Holds its tracker registration, so a
/// task that is dropped for any reason stops counting as pending.
#[derive(Debug)]
pub struct DirectoryTask {
    pub path: PathBuf,
    pub depth: usize,
    _registration: Registration,
}

impl DirectoryTask {
    pub fn new(path: PathBuf, depth: usize, registration: Registration) -> Self {
        Self {
            path,
            depth,
            _registration: registration,
        }
    }
}

#[derive(Debug)]
pub(crate) enum WorkerMessage {
    Walk(DirectoryTask),
    Shutdown,
}

/// State every walker of one scan shares.
#[derive(Debug)]
pub(crate) struct WalkShared {
    pub(crate) limiter: Limiter,
    pub(crate) tracker: CompletionTracker,
    metric: SizeMetric,
    file_errors: FileErrorPolicy,
    cancel: AtomicBool,
    directories: AtomicU64,
    unreadable_dirs: AtomicU64,
    skipped_files: AtomicU64,
    fatal: Mutex<Option<ScanError>>,
}

impl WalkShared {
    pub(crate) fn new(options: &ScanOptions) -> Self {
        Self {
            limiter: Limiter::new(options.max_open_dirs),
            tracker: CompletionTracker::new(),
            metric: options.metric,
            file_errors: options.file_errors,
            cancel: AtomicBool::new(false),
            directories: AtomicU64::new(0),
            unreadable_dirs: AtomicU64::new(0),
            skipped_files: AtomicU64::new(0),
            fatal: Mutex::new(None),
        }
    }

    pub(crate) fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub(crate) fn directories(&self) -> u64 {
        self.directories.load(Ordering::Relaxed)
    }

    pub(crate) fn unreadable_dirs(&self) -> u64 {
        self.unreadable_dirs.load(Ordering::Relaxed)
    }

    pub(crate) fn skipped_files(&self) -> u64 {
        self.skipped_files.load(Ordering::Relaxed)
    }

    pub(crate) fn take_fatal(&self) -> Option<ScanError> {
        self.fatal.lock().take()
    }

    fn record_unreadable(&self, path: &Path, error: &io::Error) {
        warn!(path = %path.display(), kind = ?error.kind(), %error, "cannot read directory");
        self.unreadable_dirs.fetch_add(1, Ordering::Relaxed);
    }

    fn file_error(&self, path: &Path, source: io::Error) -> WalkControl {
        match self.file_errors {
            FileErrorPolicy::Skip => {
                warn!(path = %path.display(), error = %source, "cannot read file metadata, skipping");
                self.skipped_files.fetch_add(1, Ordering::Relaxed);
                WalkControl::Continue
            }
            FileErrorPolicy::Abort => {
                error!(path = %path.display(), error = %source, "cannot read file metadata, aborting scan");
                let mut fatal = self.fatal.lock();
                if fatal.is_none() {
                    *fatal = Some(ScanError::Metadata {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                drop(fatal);
                self.cancel();
                WalkControl::Stop
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum WalkControl {
    Continue,
    Stop,
}

/// Per-thread handle onto a scan: owns this worker's ends of the task queue
/// and the size channel.
pub(crate) struct Walker {
    shared: Arc<WalkShared>,
    tasks: Sender<WorkerMessage>,
    events: Sender<SizeEvent>,
}

impl Walker {
    pub(crate) fn new(
        shared: Arc<WalkShared>,
        tasks: Sender<WorkerMessage>,
        events: Sender<SizeEvent>,
    ) -> Self {
        Self {
            shared,
            tasks,
            events,
        }
    }

    /// Lists one directory, emits its files and queues its subdirectories.
    /// Children are only queued, never waited for.
    pub(crate) fn walk(&self, task: DirectoryTask) {
        if self.shared.is_cancelled() {
            return;
        }
        trace!(path = %task.path.display(), depth = task.depth, "walking");

        let entries = match list_directory(&task.path, &self.shared.limiter) {
            Ok(entries) => entries,
            Err(error) => {
                self.shared.record_unreadable(&task.path, &error);
                Vec::new()
            }
        };

        for entry in entries {
            if self.shared.is_cancelled() {
                break;
            }
            let control = match entry.kind {
                EntryKind::Directory => self.dispatch(entry.path, task.depth + 1),
                EntryKind::File => self.emit_file(&entry.path),
            };
            if control == WalkControl::Stop {
                break;
            }
        }
    }

    fn dispatch(&self, path: PathBuf, depth: usize) -> WalkControl {
        self.shared.directories.fetch_add(1, Ordering::Relaxed);
        let task = DirectoryTask::new(path, depth, self.shared.tracker.register());
        if self.tasks.send(WorkerMessage::Walk(task)).is_err() {
            debug!("task queue closed, stopping walker");
            self.shared.cancel();
            return WalkControl::Stop;
        }
        WalkControl::Continue
    }

    fn emit_file(&self, path: &Path) -> WalkControl {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) => return self.shared.file_error(path, error),
        };
        let size = metric_size(&metadata, self.shared.metric);
        if self.events.send(SizeEvent(size)).is_err() {
            debug!("size channel closed, stopping walker");
            self.shared.cancel();
            return WalkControl::Stop;
        }
        WalkControl::Continue
    }
}

pub(crate) fn worker_loop(walker: Walker, queue: Receiver<WorkerMessage>) {
    for message in queue.iter() {
        match message {
            WorkerMessage::Walk(task) => walker.walk(task),
            WorkerMessage::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::unbounded;
    use tempfile::TempDir;

    use super::*;

    struct Harness {
        shared: Arc<WalkShared>,
        walker: Walker,
        tasks: Receiver<WorkerMessage>,
        events: Receiver<SizeEvent>,
    }

    fn harness(options: &ScanOptions) -> Harness {
        let shared = Arc::new(WalkShared::new(options));
        let (task_tx, task_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        Harness {
            walker: Walker::new(Arc::clone(&shared), task_tx, event_tx),
            shared,
            tasks: task_rx,
            events: event_rx,
        }
    }

    #[test]
    fn walk_queues_children_and_emits_files() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        fs::create_dir(root.join("a")).expect("a");
        fs::create_dir(root.join("b")).expect("b");
        fs::write(root.join("x.bin"), vec![0_u8; 10]).expect("x");
        fs::write(root.join("y.bin"), vec![0_u8; 32]).expect("y");

        let h = harness(&ScanOptions::new(root));
        let task = DirectoryTask::new(root.to_path_buf(), 0, h.shared.tracker.register());
        h.walker.walk(task);

        assert_eq!(h.shared.directories(), 2);
        let mut sizes: Vec<u64> = h.events.try_iter().map(|event| event.0).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![10, 32]);

        // The walked task is done; only the two queued children are pending.
        assert_eq!(h.shared.tracker.pending(), 2);
        let queued: Vec<_> = h.tasks.try_iter().collect();
        assert_eq!(queued.len(), 2);
        assert!(queued.iter().all(|message| matches!(
            message,
            WorkerMessage::Walk(task) if task.depth == 1
        )));
        drop(queued);
        assert_eq!(h.shared.tracker.pending(), 0);
    }

    #[test]
    fn unreadable_directory_yields_nothing_and_deregisters() {
        let temp = TempDir::new().expect("temp dir");
        let h = harness(&ScanOptions::new(temp.path()));

        let task = DirectoryTask::new(temp.path().join("gone"), 1, h.shared.tracker.register());
        h.walker.walk(task);

        assert_eq!(h.shared.unreadable_dirs(), 1);
        assert_eq!(h.shared.tracker.pending(), 0);
        assert!(h.events.try_recv().is_err());
        assert_eq!(h.shared.limiter.in_use(), 0);
    }

    #[test]
    fn missing_file_is_skipped_by_default() {
        let temp = TempDir::new().expect("temp dir");
        let h = harness(&ScanOptions::new(temp.path()));

        let control = h.walker.emit_file(&temp.path().join("vanished.txt"));

        assert_eq!(control, WalkControl::Continue);
        assert_eq!(h.shared.skipped_files(), 1);
        assert!(!h.shared.is_cancelled());
        assert!(h.shared.take_fatal().is_none());
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn missing_file_aborts_under_strict_policy() {
        let temp = TempDir::new().expect("temp dir");
        let mut options = ScanOptions::new(temp.path());
        options.file_errors = FileErrorPolicy::Abort;
        let h = harness(&options);

        let control = h.walker.emit_file(&temp.path().join("vanished.txt"));

        assert_eq!(control, WalkControl::Stop);
        assert!(h.shared.is_cancelled());
        assert!(matches!(
            h.shared.take_fatal(),
            Some(ScanError::Metadata { path, .. }) if path.ends_with("vanished.txt")
        ));
    }

    #[test]
    fn cancelled_walk_does_nothing_but_deregister() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("f"), b"1").expect("file");
        let h = harness(&ScanOptions::new(temp.path()));
        h.shared.cancel();

        let task = DirectoryTask::new(temp.path().to_path_buf(), 0, h.shared.tracker.register());
        h.walker.walk(task);

        assert_eq!(h.shared.tracker.pending(), 0);
        assert_eq!(h.shared.limiter.peak(), 0);
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn worker_loop_stops_on_shutdown() {
        let temp = TempDir::new().expect("temp dir");
        let h = harness(&ScanOptions::new(temp.path()));
        let (queue_tx, queue_rx) = unbounded();
        queue_tx.send(WorkerMessage::Shutdown).expect("send");

        worker_loop(h.walker, queue_rx);
    }
}
