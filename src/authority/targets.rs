//! Target administration.

use super::AccessManager;
use crate::clock::Delay;
use crate::error::{AuthorityError, CallError};
use crate::host::Host;
use crate::state::AuthorityEvent;
use gatehouse_abi::{Address, ManagedCall, RoleId, Selector};
use tracing::info;

impl AccessManager {
    /// Wire every selector in `selectors` on `target` to `role`.
    pub(crate) fn set_target_function_role(&self, target: Address, selectors: &[Selector], role: RoleId) {
        for &selector in selectors {
            self.store.targets.set_function_role(target, selector, role);
            info!(target = %target, selector = %selector, role = %role, "Target function role updated");
            self.events.emit(AuthorityEvent::TargetFunctionRoleUpdated {
                target,
                selector,
                role,
            });
        }
    }

    /// Change the admin delay of `target`, held back by at least `min_setback`.
    pub(crate) fn set_target_admin_delay(&self, target: Address, delay: Delay) {
        let (now, min_setback) = (self.now(), self.min_setback());
        let since = self.store.targets.update_config(target, |cfg| {
            let (updated, effect) = cfg.admin_delay.with_update(now, delay, min_setback);
            cfg.admin_delay = updated;
            effect
        });
        info!(target = %target, delay, since, "Target admin delay updated");
        self.events
            .emit(AuthorityEvent::TargetAdminDelayUpdated { target, delay, since });
    }

    /// Open or close `target`. The authority can never close itself.
    pub(crate) fn set_target_closed(&self, target: Address, closed: bool) -> Result<(), AuthorityError> {
        if target == self.address() {
            return Err(AuthorityError::LockedAccount(target));
        }
        self.store.targets.update_config(target, |cfg| cfg.closed = closed);
        info!(target = %target, closed, "Target closed flag set");
        self.events.emit(AuthorityEvent::TargetClosed { target, closed });
        Ok(())
    }

    /// Hand `target` over to `new_authority` by calling its `setAuthority`.
    pub(crate) fn update_authority(
        &self,
        host: &Host,
        target: Address,
        new_authority: Address,
    ) -> Result<(), CallError> {
        host.call(
            self.address(),
            target,
            &ManagedCall::SetAuthority(new_authority).encode(),
        )?;
        info!(target = %target, new_authority = %new_authority, "Authority handed off");
        Ok(())
    }
}
