//! Which role and delay govern a call to the authority's own surface.
//!
//! | Functions | Role | Extra delay |
//! |-----------|------|-------------|
//! | `labelRole`, `setRoleAdmin`, `setRoleGuardian`, `setGrantDelay`, `setTargetAdminDelay` | `ADMIN` | none |
//! | `updateAuthority`, `setTargetClosed`, `setTargetFunctionRole` | `ADMIN` | admin delay of the named target |
//! | `grantRole`, `revokeRole` | admin of the named role | none |
//! | anything else | function role on the authority itself | none |
//!
//! Entries must track [`requires_authorization`]: every function listed there
//! resolves through one of the first three rows.

use super::AccessManager;
use crate::clock::Delay;
use crate::error::AuthorityError;
use gatehouse_abi::call::authority::{first_address_arg, first_role_arg};
use gatehouse_abi::{AuthorityFunction, RoleId, Selector};

/// How a self-call is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminRestriction {
    /// `true` when one of the administrative rows matched; such calls ignore
    /// the authority's own closed flag.
    pub restricted: bool,
    pub role: RoleId,
    pub delay: Delay,
}

/// Mutating functions that run only after the caller passes the table above.
pub fn requires_authorization(function: AuthorityFunction) -> bool {
    use AuthorityFunction as F;
    matches!(
        function,
        F::LabelRole
            | F::GrantRole
            | F::RevokeRole
            | F::SetRoleAdmin
            | F::SetRoleGuardian
            | F::SetGrantDelay
            | F::SetTargetFunctionRole
            | F::SetTargetAdminDelay
            | F::SetTargetClosed
            | F::UpdateAuthority
    )
}

impl AccessManager {
    /// Resolve the restriction for call data addressed to the authority.
    pub(crate) fn admin_restrictions(&self, data: &[u8]) -> Result<AdminRestriction, AuthorityError> {
        use AuthorityFunction as F;
        let selector = Selector::from_calldata(data).ok_or(AuthorityError::MalformedCalldata)?;
        let admin = |delay| AdminRestriction {
            restricted: true,
            role: RoleId::ADMIN,
            delay,
        };

        let restriction = match AuthorityFunction::from_selector(selector) {
            Some(
                F::LabelRole
                | F::SetRoleAdmin
                | F::SetRoleGuardian
                | F::SetGrantDelay
                | F::SetTargetAdminDelay,
            ) => admin(0),
            Some(F::UpdateAuthority | F::SetTargetClosed | F::SetTargetFunctionRole) => {
                let target =
                    first_address_arg(data).map_err(|_| AuthorityError::MalformedCalldata)?;
                admin(self.get_target_admin_delay(target))
            }
            Some(F::GrantRole | F::RevokeRole) => {
                let role = first_role_arg(data).map_err(|_| AuthorityError::MalformedCalldata)?;
                AdminRestriction {
                    restricted: true,
                    role: self.get_role_admin(role),
                    delay: 0,
                }
            }
            _ => AdminRestriction {
                restricted: false,
                role: self.get_target_function_role(self.address(), selector),
                delay: 0,
            },
        };
        Ok(restriction)
    }
}
