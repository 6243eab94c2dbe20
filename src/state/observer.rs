//! Authority events and the observers that receive them.
//!
//! State changes are recorded as [`AuthorityEvent`]s while a call runs and
//! held in an [`EventBuffer`]. A reverted frame truncates the buffer back to
//! its checkpoint; the outermost successful frame publishes what is left to
//! every registered [`AuthorityObserver`]. Replaying the published events is
//! enough to rebuild the authority's tables.

use crate::clock::{Delay, Timepoint};
use gatehouse_abi::{Address, OperationId, RoleId, Selector};
use parking_lot::{Mutex, RwLock};
use serde::{Serialize, Serializer};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthorityEvent {
    RoleGranted {
        role: RoleId,
        account: Address,
        delay: Delay,
        since: Timepoint,
        new_member: bool,
    },
    RoleRevoked {
        role: RoleId,
        account: Address,
    },
    RoleLabel {
        role: RoleId,
        label: String,
    },
    RoleAdminChanged {
        role: RoleId,
        admin: RoleId,
    },
    RoleGuardianChanged {
        role: RoleId,
        guardian: RoleId,
    },
    RoleGrantDelayChanged {
        role: RoleId,
        delay: Delay,
        since: Timepoint,
    },
    TargetClosed {
        target: Address,
        closed: bool,
    },
    TargetFunctionRoleUpdated {
        target: Address,
        selector: Selector,
        role: RoleId,
    },
    TargetAdminDelayUpdated {
        target: Address,
        delay: Delay,
        since: Timepoint,
    },
    OperationScheduled {
        id: OperationId,
        nonce: u32,
        schedule: Timepoint,
        caller: Address,
        target: Address,
        #[serde(serialize_with = "hex_bytes")]
        data: Vec<u8>,
    },
    OperationExecuted {
        id: OperationId,
        nonce: u32,
    },
    OperationCanceled {
        id: OperationId,
        nonce: u32,
    },
    /// Emitted by a protected resource when its authority changes.
    AuthorityUpdated {
        resource: Address,
        authority: Address,
    },
}

impl AuthorityEvent {
    /// Snake-case event name, as used in the JSON tag and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
            Self::RoleLabel { .. } => "role_label",
            Self::RoleAdminChanged { .. } => "role_admin_changed",
            Self::RoleGuardianChanged { .. } => "role_guardian_changed",
            Self::RoleGrantDelayChanged { .. } => "role_grant_delay_changed",
            Self::TargetClosed { .. } => "target_closed",
            Self::TargetFunctionRoleUpdated { .. } => "target_function_role_updated",
            Self::TargetAdminDelayUpdated { .. } => "target_admin_delay_updated",
            Self::OperationScheduled { .. } => "operation_scheduled",
            Self::OperationExecuted { .. } => "operation_executed",
            Self::OperationCanceled { .. } => "operation_canceled",
            Self::AuthorityUpdated { .. } => "authority_updated",
        }
    }
}

fn hex_bytes<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&gatehouse_abi::to_hex(data))
}

/// Receives committed events.
///
/// Called after the outermost call frame succeeds, never for reverted work.
pub trait AuthorityObserver: Send + Sync {
    fn on_event(&self, event: &AuthorityEvent);
}

/// Observer that keeps the events it sees, in order.
///
/// A bounded recorder drops its oldest events once full and counts them.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    log: Mutex<EventLog>,
    limit: Option<usize>,
}

#[derive(Debug, Default)]
struct EventLog {
    events: VecDeque<AuthorityEvent>,
    dropped: u64,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` events between drains.
    pub fn bounded(limit: usize) -> Self {
        Self {
            log: Mutex::default(),
            limit: Some(limit.max(1)),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<AuthorityEvent> {
        self.log.lock().events.iter().cloned().collect()
    }

    /// Take everything recorded so far, leaving the log empty.
    pub fn drain(&self) -> Vec<AuthorityEvent> {
        self.log.lock().events.drain(..).collect()
    }

    /// Events discarded since the last call, resetting the count.
    pub fn take_dropped(&self) -> u64 {
        std::mem::take(&mut self.log.lock().dropped)
    }
}

impl AuthorityObserver for RecordingObserver {
    fn on_event(&self, event: &AuthorityEvent) {
        let mut log = self.log.lock();
        if self.limit.is_some_and(|limit| log.events.len() >= limit) {
            log.events.pop_front();
            log.dropped += 1;
        }
        log.events.push_back(event.clone());
    }
}

/// Events emitted by the current transaction, pending publication.
#[derive(Default)]
pub struct EventBuffer {
    pending: Mutex<Vec<AuthorityEvent>>,
    observers: RwLock<Vec<Arc<dyn AuthorityObserver>>>,
}

impl EventBuffer {
    pub fn add_observer(&self, observer: Arc<dyn AuthorityObserver>) {
        self.observers.write().push(observer);
    }

    pub fn emit(&self, event: AuthorityEvent) {
        self.pending.lock().push(event);
    }

    pub fn checkpoint(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn revert_to(&self, checkpoint: usize) {
        self.pending.lock().truncate(checkpoint);
    }

    /// Deliver pending events to every observer.
    pub fn publish(&self) {
        let events = std::mem::take(&mut *self.pending.lock());
        if events.is_empty() {
            return;
        }
        let observers = self.observers.read().clone();
        for event in &events {
            crate::metrics::record_event(event.name());
            for observer in &observers {
                observer.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverted_events_are_never_published() {
        let buffer = EventBuffer::default();
        let recorder = Arc::new(RecordingObserver::new());
        buffer.add_observer(recorder.clone());

        buffer.emit(AuthorityEvent::RoleRevoked {
            role: RoleId(1),
            account: Address::from_low_u64(1),
        });
        let cp = buffer.checkpoint();
        buffer.emit(AuthorityEvent::RoleRevoked {
            role: RoleId(2),
            account: Address::from_low_u64(2),
        });
        buffer.revert_to(cp);
        assert!(recorder.events().is_empty());

        buffer.publish();
        let events = recorder.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            AuthorityEvent::RoleRevoked { role: RoleId(1), .. }
        ));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_bounded_recorder_drops_oldest() {
        let recorder = RecordingObserver::bounded(2);
        for role in 1..=3 {
            recorder.on_event(&AuthorityEvent::RoleRevoked {
                role: RoleId(role),
                account: Address::from_low_u64(role),
            });
        }
        let events = recorder.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            AuthorityEvent::RoleRevoked { role: RoleId(2), .. }
        ));
        assert_eq!(recorder.take_dropped(), 1);
        assert_eq!(recorder.take_dropped(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let event = AuthorityEvent::OperationScheduled {
            id: OperationId([0xab; 32]),
            nonce: 1,
            schedule: 3600,
            caller: Address::from_low_u64(1),
            target: Address::from_low_u64(2),
            data: vec![0xaa, 0xbb, 0xcc, 0xdd],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["nonce"], 1);
        assert_eq!(json["data"], "0xaabbccdd");
    }
}
