//! The schedule → wait → execute / cancel / consume protocol.
//!
//! An operation is identified by `hash_operation(caller, target, data)`.
//! Its record holds the timepoint it becomes executable (zero when there is
//! nothing pending) and a nonce that counts how many times it was scheduled.
//! A schedule is consumable in `[timepoint, timepoint + expiration)`.

use super::AccessManager;
use crate::clock::Timepoint;
use crate::error::{AuthorityError, CallError};
use crate::host::Host;
use crate::state::AuthorityEvent;
use gatehouse_abi::call::managed::decode_marker;
use gatehouse_abi::{hash_operation, Address, ManagedCall, OperationId, RoleId, Selector};
use tracing::{debug, info, warn};

fn selector_of(data: &[u8]) -> Result<Selector, AuthorityError> {
    Selector::from_calldata(data).ok_or(AuthorityError::MalformedCalldata)
}

impl AccessManager {
    /// Identifier of "`caller` invokes `target` with `data`".
    pub fn hash_operation(&self, caller: Address, target: Address, data: &[u8]) -> OperationId {
        hash_operation(caller, target, data)
    }

    /// Timepoint at which `id` becomes executable; zero when nothing is
    /// scheduled or the schedule has expired.
    pub fn get_schedule(&self, id: OperationId) -> Timepoint {
        let timepoint = self.store.schedules.get(id).timepoint;
        if self.is_expired(timepoint) { 0 } else { timepoint }
    }

    /// How many times `id` has been scheduled.
    pub fn get_nonce(&self, id: OperationId) -> u32 {
        self.store.schedules.get(id).nonce
    }

    fn is_expired(&self, timepoint: Timepoint) -> bool {
        timepoint.saturating_add(u64::from(self.expiration())) <= self.now()
    }

    /// Schedule `caller`'s call of `target` with `data` for `when` (or as soon
    /// as the caller's delay allows when `when` is zero).
    ///
    /// Only callers that are entitled to the call with a non-zero delay may
    /// schedule it.
    pub(crate) fn schedule(
        &self,
        caller: Address,
        target: Address,
        data: &[u8],
        when: Timepoint,
    ) -> Result<(OperationId, u32), AuthorityError> {
        let selector = selector_of(data)?;
        let (_, setback) = self.can_call_extended(caller, target, data)?;
        let min_when = self.now().saturating_add(u64::from(setback));

        if setback == 0 || (when > 0 && when < min_when) {
            return Err(AuthorityError::UnauthorizedCall {
                caller,
                target,
                selector,
            });
        }
        let timepoint = when.max(min_when);

        let id = hash_operation(caller, target, data);
        self.check_not_scheduled(id)?;
        let nonce = self.store.schedules.set(id, timepoint);

        info!(
            id = %id,
            nonce,
            timepoint,
            caller = %caller,
            target = %target,
            selector = %selector,
            "Operation scheduled"
        );
        self.events.emit(AuthorityEvent::OperationScheduled {
            id,
            nonce,
            schedule: timepoint,
            caller,
            target,
            data: data.to_vec(),
        });
        Ok((id, nonce))
    }

    /// An expired schedule does not block re-scheduling.
    fn check_not_scheduled(&self, id: OperationId) -> Result<(), AuthorityError> {
        let previous = self.store.schedules.get(id).timepoint;
        if previous != 0 && !self.is_expired(previous) {
            return Err(AuthorityError::AlreadyScheduled(id));
        }
        Ok(())
    }

    /// Run `caller`'s call of `target` with `data` through the authority.
    ///
    /// Delayed callers must have a due schedule, which is consumed. A matching
    /// schedule is consumed even when the caller could run the call
    /// immediately. Returns the consumed nonce, or zero when nothing was
    /// consumed.
    pub(crate) fn execute(
        &self,
        host: &Host,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<u32, CallError> {
        let selector = selector_of(data)?;
        let (immediate, setback) = self.can_call_extended(caller, target, data)?;
        if !immediate && setback == 0 {
            return Err(AuthorityError::UnauthorizedCall {
                caller,
                target,
                selector,
            }
            .into());
        }

        let id = hash_operation(caller, target, data);
        let nonce = if setback != 0 || self.get_schedule(id) != 0 {
            self.consume(id)?
        } else {
            0
        };

        let _marker = self.marker.enter(target, selector);
        debug!(caller = %caller, target = %target, selector = %selector, "Executing");
        host.call(self.address(), target, data)?;
        Ok(nonce)
    }

    /// Cancel a pending schedule.
    ///
    /// Allowed for the caller that scheduled it, any `ADMIN` member, and
    /// members of the guardian role of the role gating the function.
    pub(crate) fn cancel(
        &self,
        sender: Address,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<u32, AuthorityError> {
        let selector = selector_of(data)?;
        let id = hash_operation(caller, target, data);

        if self.store.schedules.get(id).timepoint == 0 {
            return Err(AuthorityError::NotScheduled(id));
        }
        if caller != sender {
            let (is_admin, _) = self.has_role(RoleId::ADMIN, sender);
            let guardian = self.get_role_guardian(self.get_target_function_role(target, selector));
            let (is_guardian, _) = self.has_role(guardian, sender);
            if !is_admin && !is_guardian {
                return Err(AuthorityError::UnauthorizedCancel {
                    sender,
                    caller,
                    target,
                    selector,
                });
            }
        }

        let nonce = self.store.schedules.clear(id);
        info!(id = %id, nonce, sender = %sender, "Operation canceled");
        self.events.emit(AuthorityEvent::OperationCanceled { id, nonce });
        Ok(nonce)
    }

    /// Consume the schedule for "`caller` invokes the sending resource with `data`".
    ///
    /// The sending resource must report, through `isConsumingScheduledOp()`,
    /// that it is in the middle of its own guarded call.
    pub(crate) fn consume_scheduled_op(
        &self,
        host: &Host,
        resource: Address,
        caller: Address,
        data: &[u8],
    ) -> Result<(), AuthorityError> {
        let probe = ManagedCall::IsConsumingScheduledOp.encode();
        let marker = host
            .static_call(self.address(), resource, &probe)
            .ok()
            .and_then(|ret| decode_marker(&ret).ok());
        if marker != Some(ManagedCall::consuming_marker()) {
            warn!(resource = %resource, caller = %caller, "Consume rejected: resource is not consuming");
            return Err(AuthorityError::UnauthorizedConsume(resource));
        }
        self.consume(hash_operation(caller, resource, data))
            .map(|_| ())
    }

    /// Mark a due, unexpired schedule as used. Returns its nonce.
    pub(crate) fn consume(&self, id: OperationId) -> Result<u32, AuthorityError> {
        let record = self.store.schedules.get(id);
        let result = if record.timepoint == 0 {
            Err(AuthorityError::NotScheduled(id))
        } else if record.timepoint > self.now() {
            Err(AuthorityError::NotReady(id))
        } else if self.is_expired(record.timepoint) {
            Err(AuthorityError::Expired(id))
        } else {
            Ok(())
        };
        if let Err(e) = result {
            warn!(id = %id, error = %e, "Consume rejected");
            return Err(e);
        }

        let nonce = self.store.schedules.clear(id);
        info!(id = %id, nonce, "Operation executed");
        self.events.emit(AuthorityEvent::OperationExecuted { id, nonce });
        Ok(nonce)
    }
}
