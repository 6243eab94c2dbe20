//! Read side of the authority: permission decisions and views.

use super::AccessManager;
use crate::clock::{Delay, Timepoint};
use crate::error::AuthorityError;
use gatehouse_abi::{hash_operation, Address, RoleId, Selector};
use tracing::debug;

impl AccessManager {
    /// Whether `caller` may invoke `selector` on `target` right now, and the
    /// delay that applies otherwise.
    ///
    /// A closed target denies everyone. The authority itself is only allowed
    /// the exact `(target, selector)` its own `execute` is running.
    pub fn can_call(&self, caller: Address, target: Address, selector: Selector) -> (bool, Delay) {
        if self.is_target_closed(target) {
            (false, 0)
        } else if caller == self.address() {
            (self.marker.is_executing(target, selector), 0)
        } else {
            let role = self.get_target_function_role(target, selector);
            match self.has_role(role, caller) {
                (true, delay) => (delay == 0, delay),
                (false, _) => (false, 0),
            }
        }
    }

    /// `(is_member, execution_delay)`. Every account holds `PUBLIC` with no delay.
    pub fn has_role(&self, role: RoleId, account: Address) -> (bool, Delay) {
        if role == RoleId::PUBLIC {
            return (true, 0);
        }
        let now = self.now();
        match self.store.roles.access(role, account) {
            Some(access) if access.since != 0 && access.since <= now => {
                (true, access.delay.get(now))
            }
            _ => (false, 0),
        }
    }

    /// `(since, current_delay, pending_delay, effect)` for one membership;
    /// all zero for non-members.
    pub fn get_access(&self, role: RoleId, account: Address) -> (Timepoint, Delay, Delay, Timepoint) {
        match self.store.roles.access(role, account) {
            Some(access) => {
                let (current, pending, effect) = access.delay.get_full(self.now());
                (access.since, current, pending, effect)
            }
            None => (0, 0, 0, 0),
        }
    }

    pub fn expiration(&self) -> Delay {
        self.policy.expiration
    }

    pub fn min_setback(&self) -> Delay {
        self.policy.min_setback
    }

    pub fn is_target_closed(&self, target: Address) -> bool {
        self.store.targets.config(target).closed
    }

    pub fn get_target_function_role(&self, target: Address, selector: Selector) -> RoleId {
        self.store.targets.function_role(target, selector)
    }

    pub fn get_target_admin_delay(&self, target: Address) -> Delay {
        self.store.targets.config(target).admin_delay.get(self.now())
    }

    pub fn get_role_admin(&self, role: RoleId) -> RoleId {
        self.store.roles.config(role).admin
    }

    pub fn get_role_guardian(&self, role: RoleId) -> RoleId {
        self.store.roles.config(role).guardian
    }

    pub fn get_role_grant_delay(&self, role: RoleId) -> Delay {
        self.store.roles.config(role).grant_delay.get(self.now())
    }

    /// Decision for arbitrary call data, routing calls on the authority
    /// itself through the self-administration table.
    pub(crate) fn can_call_extended(
        &self,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<(bool, Delay), AuthorityError> {
        if target == self.address() {
            return self.can_call_self(caller, data);
        }
        Ok(match Selector::from_calldata(data) {
            Some(selector) => self.can_call(caller, target, selector),
            None => (false, 0),
        })
    }

    /// Decision for call data addressed to the authority itself.
    ///
    /// Administrative functions bypass the authority's own closed flag;
    /// the effective delay is the larger of the function's delay and the
    /// caller's execution delay.
    pub(crate) fn can_call_self(
        &self,
        caller: Address,
        data: &[u8],
    ) -> Result<(bool, Delay), AuthorityError> {
        let Some(selector) = Selector::from_calldata(data) else {
            return Ok((false, 0));
        };
        if caller == self.address() {
            return Ok((self.marker.is_executing(self.address(), selector), 0));
        }

        let restriction = self.admin_restrictions(data)?;
        if !restriction.restricted && self.is_target_closed(self.address()) {
            return Ok((false, 0));
        }
        let (is_member, execution_delay) = self.has_role(restriction.role, caller);
        if !is_member {
            return Ok((false, 0));
        }
        let delay = restriction.delay.max(execution_delay);
        Ok((delay == 0, delay))
    }

    /// Gate for the authority's restricted functions.
    ///
    /// Immediate callers pass. Delayed callers pass by consuming a due
    /// schedule for exactly this call data.
    pub(crate) fn check_authorized(&self, caller: Address, data: &[u8]) -> Result<(), AuthorityError> {
        let (immediate, delay) = self.can_call_self(caller, data)?;
        if immediate {
            return Ok(());
        }
        if delay == 0 {
            let required = self.admin_restrictions(data)?.role;
            debug!(caller = %caller, required = %required, "Restricted call denied");
            return Err(AuthorityError::UnauthorizedAccount {
                account: caller,
                required,
            });
        }
        self.consume(hash_operation(caller, self.address(), data))
            .map(|_| ())
    }
}
