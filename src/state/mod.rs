//! State management module.
//!
//! The authority's tables live in a [`Store`]: role configuration and
//! membership, target configuration and function wiring, and scheduled
//! operations. Every table is journaled so a failed call frame can be rolled
//! back without leaving partial writes behind.

pub mod delay;
pub mod journal;
pub mod managers;
pub mod observer;
pub mod records;

pub use delay::PendingDelay;
pub use journal::{JournaledCell, JournaledMap};
pub use managers::{RoleManager, ScheduleManager, TargetManager};
pub use observer::{AuthorityEvent, AuthorityObserver, EventBuffer, RecordingObserver};
pub use records::{Access, RoleConfig, Schedule, TargetConfig};

/// The authority's three keyed domains.
#[derive(Default)]
pub struct Store {
    pub roles: RoleManager,
    pub targets: TargetManager,
    pub schedules: ScheduleManager,
}

impl Store {
    /// One mark per underlying table.
    pub fn checkpoint(&self) -> Vec<usize> {
        let mut marks = Vec::with_capacity(5);
        marks.extend(self.roles.checkpoint());
        marks.extend(self.targets.checkpoint());
        marks.push(self.schedules.checkpoint());
        marks
    }

    pub fn revert_to(&self, marks: &[usize]) {
        if let [r0, r1, t0, t1, s, ..] = *marks {
            self.schedules.revert_to(s);
            self.targets.revert_to([t0, t1]);
            self.roles.revert_to([r0, r1]);
        }
    }

    pub fn commit(&self) {
        self.roles.commit();
        self.targets.commit();
        self.schedules.commit();
    }
}
