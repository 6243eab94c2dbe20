//! Delay values whose changes take effect at a pre-committed timepoint.
//!
//! A [`PendingDelay`] stores the value in force before a change, the value
//! after it, and the timepoint the change lands. Reading resolves against the
//! current time; updating computes a setback so that shortening a delay never
//! takes less time than the delay being removed:
//!
//! ```text
//! setback = max(min_setback, current - new)   (0 when lengthening)
//! effect  = now + setback
//! ```

use crate::clock::{Delay, Timepoint};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingDelay {
    before: Delay,
    after: Delay,
    effect: Timepoint,
}

impl PendingDelay {
    /// A delay that is in force immediately, with nothing pending.
    pub fn fixed(value: Delay) -> Self {
        Self {
            before: 0,
            after: value,
            effect: 0,
        }
    }

    /// `(current, pending, effect)`; `pending` and `effect` are zero once the
    /// change has landed.
    pub fn get_full(&self, now: Timepoint) -> (Delay, Delay, Timepoint) {
        if self.effect <= now {
            (self.after, 0, 0)
        } else {
            (self.before, self.after, self.effect)
        }
    }

    /// Value in force at `now`.
    pub fn get(&self, now: Timepoint) -> Delay {
        self.get_full(now).0
    }

    /// Schedule a change to `new_value`, returning the updated delay and the
    /// timepoint the change lands.
    ///
    /// Any change still pending is replaced; the value in force at `now`
    /// becomes the "before" value.
    pub fn with_update(
        &self,
        now: Timepoint,
        new_value: Delay,
        min_setback: Delay,
    ) -> (Self, Timepoint) {
        let current = self.get(now);
        let setback = min_setback.max(current.saturating_sub(new_value));
        let effect = now.saturating_add(u64::from(setback));
        (
            Self {
                before: current,
                after: new_value,
                effect,
            },
            effect,
        )
    }
}
