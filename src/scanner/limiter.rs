//! Counting semaphore for directory listings.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LimiterState {
    in_use: usize,
    peak: usize,
}

#[derive(Debug)]
pub struct Limiter {
    capacity: usize,
    state: Mutex<LimiterState>,
    released: Condvar,
}

impl Limiter {
    /// A capacity of zero would block forever, so it is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(LimiterState::default()),
            released: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks until a permit is free. The permit goes back when dropped.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self.state.lock();
        while state.in_use >= self.capacity {
            self.released.wait(&mut state);
        }
        state.in_use += 1;
        state.peak = state.peak.max(state.in_use);
        Permit { limiter: self }
    }

    pub fn in_use(&self) -> usize {
        self.state.lock().in_use
    }

    /// Highest number of permits held at once since creation.
    pub fn peak(&self) -> usize {
        self.state.lock().peak
    }

    fn release(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.in_use > 0, "permit released twice");
        state.in_use = state.in_use.saturating_sub(1);
        drop(state);
        self.released.notify_one();
    }
}

#[must_use = "the permit is released as soon as it is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    limiter: &'a Limiter,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
