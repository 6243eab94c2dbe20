//! Transient marker naming the `(target, selector)` an `execute` is running.

use gatehouse_abi::{hash_execution_id, Address, Selector};
use parking_lot::Mutex;

/// Single-slot marker, set for the duration of one `execute`.
///
/// Only the [`MarkerGuard`] returned by [`ExecutionMarker::enter`] writes the
/// slot, and it restores the previous value on every exit path.
#[derive(Debug, Default)]
pub struct ExecutionMarker {
    slot: Mutex<Option<[u8; 32]>>,
}

impl ExecutionMarker {
    pub fn is_executing(&self, target: Address, selector: Selector) -> bool {
        *self.slot.lock() == Some(hash_execution_id(target, selector))
    }

    pub fn enter(&self, target: Address, selector: Selector) -> MarkerGuard<'_> {
        let previous = self
            .slot
            .lock()
            .replace(hash_execution_id(target, selector));
        MarkerGuard {
            marker: self,
            previous,
        }
    }
}

#[must_use = "the marker is cleared as soon as the guard is dropped"]
pub struct MarkerGuard<'a> {
    marker: &'a ExecutionMarker,
    previous: Option<[u8; 32]>,
}

impl Drop for MarkerGuard<'_> {
    fn drop(&mut self) {
        *self.marker.slot.lock() = self.previous.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_previous_marker() {
        let marker = ExecutionMarker::default();
        let a = Address::from_low_u64(1);
        let sel = Selector::from(0xaabbccdd);
        {
            let _outer = marker.enter(a, sel);
            {
                let _inner = marker.enter(a, Selector::from(1));
                assert!(!marker.is_executing(a, sel));
            }
            assert!(marker.is_executing(a, sel));
        }
        assert!(!marker.is_executing(a, sel));
    }
}
