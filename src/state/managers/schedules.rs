//! Scheduled operations, keyed by operation id.

use crate::state::journal::JournaledMap;
use crate::state::records::Schedule;
use gatehouse_abi::OperationId;

#[derive(Default)]
pub struct ScheduleManager {
    schedules: JournaledMap<OperationId, Schedule>,
}

impl ScheduleManager {
    /// Stored record; the default (timepoint 0, nonce 0) when never scheduled.
    pub fn get(&self, id: OperationId) -> Schedule {
        self.schedules.get(&id).unwrap_or_default()
    }

    /// Store a new timepoint and bump the nonce, returning the new nonce.
    pub fn set(&self, id: OperationId, timepoint: u64) -> u32 {
        self.schedules.update(id, |s| {
            s.timepoint = timepoint;
            s.nonce = s.nonce.wrapping_add(1);
            s.nonce
        })
    }

    /// Clear the timepoint, keeping the nonce. Returns the nonce.
    pub fn clear(&self, id: OperationId) -> u32 {
        self.schedules.update(id, |s| {
            s.timepoint = 0;
            s.nonce
        })
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.schedules.checkpoint()
    }

    pub(crate) fn revert_to(&self, cp: usize) {
        self.schedules.revert_to(cp);
    }

    pub(crate) fn commit(&self) {
        self.schedules.commit();
    }
}
