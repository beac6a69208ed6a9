//! Wait-group over a set of tasks that keeps growing while it is waited on.
//!
//! A task is counted from the moment [`CompletionTracker::register`] returns
//! until its [`Registration`] is dropped. Registering before the task is
//! handed to another thread means the count cannot touch zero while work is
//! still queued.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct TrackerInner {
    pending: Mutex<usize>,
    idle: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    inner: Arc<TrackerInner>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> Registration {
        *self.inner.pending.lock() += 1;
        Registration {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn pending(&self) -> usize {
        *self.inner.pending.lock()
    }

    /// Blocks until every registration handed out so far has been dropped.
    pub fn wait(&self) {
        let mut pending = self.inner.pending.lock();
        while *pending > 0 {
            self.inner.idle.wait(&mut pending);
        }
    }
}

#[must_use = "dropping a registration marks the task as finished"]
#[derive(Debug)]
pub struct Registration {
    inner: Arc<TrackerInner>,
}

impl Registration {
    pub fn done(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut pending = self.inner.pending.lock();
        debug_assert!(*pending > 0, "tracker count would go negative");
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.inner.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn wait_returns_immediately_when_nothing_registered() {
        let tracker = CompletionTracker::new();
        tracker.wait();
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn done_decrements() {
        let tracker = CompletionTracker::new();
        let a = tracker.register();
        let b = tracker.register();
        assert_eq!(tracker.pending(), 2);
        a.done();
        assert_eq!(tracker.pending(), 1);
        drop(b);
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn waits_for_tasks_registered_by_other_tasks() {
        let tracker = CompletionTracker::new();
        let root = tracker.register();

        let spawner = tracker.clone();
        let handle = thread::spawn(move || {
            let mut children = Vec::new();
            for _ in 0..8 {
                let registration = spawner.register();
                children.push(thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5));
                    registration.done();
                }));
            }
            root.done();
            children
        });

        tracker.wait();
        assert_eq!(tracker.pending(), 0);

        for child in handle.join().expect("spawner thread") {
            child.join().expect("child thread");
        }
    }

    #[test]
    fn panicking_task_still_deregisters() {
        let tracker = CompletionTracker::new();
        let registration = tracker.register();
        let result = thread::spawn(move || {
            let _registration = registration;
            panic!("task failed");
        })
        .join();
        assert!(result.is_err());
        tracker.wait();
    }
}
