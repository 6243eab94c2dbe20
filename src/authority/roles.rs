//! Role administration.
//!
//! Callers reach these through the restricted-call gate; the functions here
//! only enforce the locked-role rules and write.

use super::AccessManager;
use crate::clock::Delay;
use crate::error::AuthorityError;
use crate::state::{Access, AuthorityEvent, PendingDelay};
use gatehouse_abi::{Address, RoleId};
use tracing::info;

impl AccessManager {
    /// Grant `role` to `account`, or update an existing member's execution delay.
    ///
    /// A new member becomes effective after `grant_delay`. For an existing
    /// member only the execution delay changes, through the pending-update
    /// mechanism with no minimum setback. Returns `true` for a new member.
    pub(crate) fn grant(
        &self,
        role: RoleId,
        account: Address,
        grant_delay: Delay,
        execution_delay: Delay,
    ) -> Result<bool, AuthorityError> {
        if role == RoleId::PUBLIC {
            return Err(AuthorityError::LockedRole(role));
        }
        let now = self.now();
        // `since` is when the grant (or the delay change) takes effect. An
        // existing member keeps its original membership timepoint.
        let (access, since, new_member) = match self.store.roles.access(role, account) {
            None => {
                // Zero is reserved for "not a member", even for a grant at time zero.
                let since = now.saturating_add(u64::from(grant_delay)).max(1);
                let access = Access {
                    since,
                    delay: PendingDelay::fixed(execution_delay),
                };
                (access, since, true)
            }
            Some(existing) => {
                let (delay, effect) = existing.delay.with_update(now, execution_delay, 0);
                (Access { delay, ..existing }, effect, false)
            }
        };
        self.store.roles.set_access(role, account, access);

        info!(
            role = %role,
            account = %account,
            execution_delay,
            since,
            new_member,
            "Role granted"
        );
        self.events.emit(AuthorityEvent::RoleGranted {
            role,
            account,
            delay: execution_delay,
            since,
            new_member,
        });
        Ok(new_member)
    }

    /// Remove `account` from `role`. Returns `false` (and records nothing)
    /// when the account was not a member.
    pub(crate) fn revoke(&self, role: RoleId, account: Address) -> Result<bool, AuthorityError> {
        if role == RoleId::PUBLIC {
            return Err(AuthorityError::LockedRole(role));
        }
        if self.store.roles.remove_access(role, account).is_none() {
            return Ok(false);
        }
        info!(role = %role, account = %account, "Role revoked");
        self.events.emit(AuthorityEvent::RoleRevoked { role, account });
        Ok(true)
    }

    /// Give up `role`. `confirmation` must repeat the caller's address.
    pub(crate) fn renounce(
        &self,
        caller: Address,
        role: RoleId,
        confirmation: Address,
    ) -> Result<bool, AuthorityError> {
        if confirmation != caller {
            return Err(AuthorityError::BadConfirmation);
        }
        self.revoke(role, confirmation)
    }

    pub(crate) fn label_role(&self, role: RoleId, label: String) -> Result<(), AuthorityError> {
        if role.is_reserved() {
            return Err(AuthorityError::LockedRole(role));
        }
        info!(role = %role, label = %label, "Role labelled");
        self.events.emit(AuthorityEvent::RoleLabel { role, label });
        Ok(())
    }

    pub(crate) fn set_role_admin(&self, role: RoleId, admin: RoleId) -> Result<(), AuthorityError> {
        if role.is_reserved() {
            return Err(AuthorityError::LockedRole(role));
        }
        self.store.roles.update_config(role, |cfg| cfg.admin = admin);
        info!(role = %role, admin = %admin, "Role admin changed");
        self.events.emit(AuthorityEvent::RoleAdminChanged { role, admin });
        Ok(())
    }

    pub(crate) fn set_role_guardian(
        &self,
        role: RoleId,
        guardian: RoleId,
    ) -> Result<(), AuthorityError> {
        if role.is_reserved() {
            return Err(AuthorityError::LockedRole(role));
        }
        self.store
            .roles
            .update_config(role, |cfg| cfg.guardian = guardian);
        info!(role = %role, guardian = %guardian, "Role guardian changed");
        self.events
            .emit(AuthorityEvent::RoleGuardianChanged { role, guardian });
        Ok(())
    }

    /// Change the grant delay of `role`, held back by at least `min_setback`.
    pub(crate) fn set_grant_delay(&self, role: RoleId, delay: Delay) -> Result<(), AuthorityError> {
        if role == RoleId::PUBLIC {
            return Err(AuthorityError::LockedRole(role));
        }
        let (now, min_setback) = (self.now(), self.min_setback());
        let since = self.store.roles.update_config(role, |cfg| {
            let (updated, effect) = cfg.grant_delay.with_update(now, delay, min_setback);
            cfg.grant_delay = updated;
            effect
        });
        info!(role = %role, delay, since, "Role grant delay changed");
        self.events
            .emit(AuthorityEvent::RoleGrantDelayChanged { role, delay, since });
        Ok(())
    }
}
