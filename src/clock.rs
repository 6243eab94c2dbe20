//! Time sources for the authority.
//!
//! Timepoints are unix seconds (`u64`); delays are seconds (`u32`).

use std::sync::atomic::{AtomicU64, Ordering};

/// A point in time, in unix seconds.
pub type Timepoint = u64;

/// A duration in seconds.
pub type Delay = u32;

/// Source of the current timepoint.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timepoint;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timepoint {
        // Pre-epoch clocks clamp to zero.
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
///
/// Used by tests and by the console's simulation mode, where waiting out a
/// week-long expiration window in real time is not an option.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timepoint) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move time forward by `seconds`, returning the new timepoint.
    ///
    /// Returns `None` and leaves the clock alone if the result would not fit
    /// in a [`Timepoint`].
    pub fn advance(&self, seconds: u64) -> Option<Timepoint> {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                now.checked_add(seconds)
            })
            .ok()
            .map(|previous| previous + seconds)
    }

    /// Jump to an absolute timepoint.
    pub fn set(&self, timepoint: Timepoint) {
        self.now.store(timepoint, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timepoint {
        self.now.load(Ordering::SeqCst)
    }
}
