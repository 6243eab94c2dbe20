//! The permission and delayed-execution authority.
//!
//! An [`AccessManager`] is deployed into a [`Host`] at a fixed address and
//! answers two kinds of requests:
//!
//! - decisions (`canCall`, `hasRole`, and the other views), which any
//!   resource or caller may ask at any time;
//! - administration and operations (role and target management, and the
//!   schedule / execute / cancel / consume protocol), which the authority
//!   gates with its own role system.
//!
//! Calls addressed to the authority itself go through the self-administration
//! table in [`admin_table`], so the authority needs no separate bootstrap
//! mechanism beyond the initial `ADMIN` member.

pub mod admin_table;
mod decision;
mod marker;
mod operations;
mod roles;
mod targets;

pub use marker::{ExecutionMarker, MarkerGuard};

use crate::clock::{Clock, Delay, Timepoint};
use crate::error::{AuthorityError, CallError};
use crate::host::{CallContext, Checkpoint, Contract, Host};
use crate::metrics;
use crate::state::{AuthorityObserver, EventBuffer, Store};
use crate::telemetry::CallTimer;
use gatehouse_abi::{encode, Address, AuthorityCall, RoleId, Token};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// One week.
pub const DEFAULT_EXPIRATION: Delay = 7 * 24 * 60 * 60;

/// Five days.
pub const DEFAULT_MIN_SETBACK: Delay = 5 * 24 * 60 * 60;

/// Protocol-wide parameters, fixed for the lifetime of an authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// How long a schedule stays consumable after its timepoint.
    pub expiration: Delay,
    /// Minimum time before a grant-delay or admin-delay change lands.
    pub min_setback: Delay,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            expiration: DEFAULT_EXPIRATION,
            min_setback: DEFAULT_MIN_SETBACK,
        }
    }
}

pub struct AccessManager {
    address: Address,
    policy: Policy,
    clock: Arc<dyn Clock>,
    store: Store,
    events: EventBuffer,
    marker: ExecutionMarker,
}

impl AccessManager {
    /// Create an authority at `address` whose only member is `initial_admin`,
    /// holding `ADMIN` with no execution delay from now on.
    pub fn new(
        address: Address,
        initial_admin: Address,
        policy: Policy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthorityError> {
        if initial_admin.is_zero() {
            return Err(AuthorityError::InvalidInitialAdmin(initial_admin));
        }
        let manager = Self {
            address,
            policy,
            clock,
            store: Store::default(),
            events: EventBuffer::default(),
            marker: ExecutionMarker::default(),
        };
        manager.grant(RoleId::ADMIN, initial_admin, 0, 0)?;
        info!(address = %address, admin = %initial_admin, "Authority created");
        Ok(manager)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn now(&self) -> Timepoint {
        self.clock.now()
    }

    /// Register an observer for committed events.
    pub fn add_observer(&self, observer: Arc<dyn AuthorityObserver>) {
        self.events.add_observer(observer);
    }

    /// Run a decoded call from `sender`. Authorization of restricted
    /// functions has already happened.
    fn dispatch(&self, host: &Host, sender: Address, call: AuthorityCall) -> Result<Vec<u8>, CallError> {
        let delay = |d: Delay| Token::Uint(u64::from(d));
        let out = match call {
            AuthorityCall::CanCall {
                caller,
                target,
                selector,
            } => {
                let (immediate, d) = self.can_call(caller, target, selector);
                metrics::record_decision((immediate, d));
                encode(&[Token::Bool(immediate), delay(d)])
            }
            AuthorityCall::Expiration => encode(&[delay(self.expiration())]),
            AuthorityCall::MinSetback => encode(&[delay(self.min_setback())]),
            AuthorityCall::IsTargetClosed { target } => {
                encode(&[Token::Bool(self.is_target_closed(target))])
            }
            AuthorityCall::GetTargetFunctionRole { target, selector } => {
                encode(&[Token::Uint(self.get_target_function_role(target, selector).0)])
            }
            AuthorityCall::GetTargetAdminDelay { target } => {
                encode(&[delay(self.get_target_admin_delay(target))])
            }
            AuthorityCall::GetRoleAdmin { role } => encode(&[Token::Uint(self.get_role_admin(role).0)]),
            AuthorityCall::GetRoleGuardian { role } => {
                encode(&[Token::Uint(self.get_role_guardian(role).0)])
            }
            AuthorityCall::GetRoleGrantDelay { role } => {
                encode(&[delay(self.get_role_grant_delay(role))])
            }
            AuthorityCall::GetAccess { role, account } => {
                let (since, current, pending, effect) = self.get_access(role, account);
                encode(&[
                    Token::Uint(since),
                    delay(current),
                    delay(pending),
                    Token::Uint(effect),
                ])
            }
            AuthorityCall::HasRole { role, account } => {
                let (is_member, d) = self.has_role(role, account);
                encode(&[Token::Bool(is_member), delay(d)])
            }
            AuthorityCall::LabelRole { role, label } => {
                self.label_role(role, label)?;
                Vec::new()
            }
            AuthorityCall::GrantRole {
                role,
                account,
                execution_delay,
            } => {
                self.grant(role, account, self.get_role_grant_delay(role), execution_delay)?;
                Vec::new()
            }
            AuthorityCall::RevokeRole { role, account } => {
                self.revoke(role, account)?;
                Vec::new()
            }
            AuthorityCall::RenounceRole {
                role,
                caller_confirmation,
            } => {
                self.renounce(sender, role, caller_confirmation)?;
                Vec::new()
            }
            AuthorityCall::SetRoleAdmin { role, admin } => {
                self.set_role_admin(role, admin)?;
                Vec::new()
            }
            AuthorityCall::SetRoleGuardian { role, guardian } => {
                self.set_role_guardian(role, guardian)?;
                Vec::new()
            }
            AuthorityCall::SetGrantDelay { role, grant_delay } => {
                self.set_grant_delay(role, grant_delay)?;
                Vec::new()
            }
            AuthorityCall::SetTargetFunctionRole {
                target,
                selectors,
                role,
            } => {
                self.set_target_function_role(target, &selectors, role);
                Vec::new()
            }
            AuthorityCall::SetTargetAdminDelay {
                target,
                admin_delay,
            } => {
                self.set_target_admin_delay(target, admin_delay);
                Vec::new()
            }
            AuthorityCall::SetTargetClosed { target, closed } => {
                self.set_target_closed(target, closed)?;
                Vec::new()
            }
            AuthorityCall::GetSchedule { id } => encode(&[Token::Uint(self.get_schedule(id))]),
            AuthorityCall::GetNonce { id } => encode(&[Token::Uint(u64::from(self.get_nonce(id)))]),
            AuthorityCall::Schedule { target, data, when } => {
                let (id, nonce) = self.schedule(sender, target, &data, when)?;
                encode(&[Token::from(id), Token::Uint(u64::from(nonce))])
            }
            AuthorityCall::HashOperation {
                caller,
                target,
                data,
            } => encode(&[Token::from(self.hash_operation(caller, target, &data))]),
            AuthorityCall::Execute { target, data } => {
                let nonce = self.execute(host, sender, target, &data)?;
                encode(&[Token::Uint(u64::from(nonce))])
            }
            AuthorityCall::Cancel {
                caller,
                target,
                data,
            } => {
                let nonce = self.cancel(sender, caller, target, &data)?;
                encode(&[Token::Uint(u64::from(nonce))])
            }
            AuthorityCall::ConsumeScheduledOp { caller, data } => {
                self.consume_scheduled_op(host, sender, caller, &data)?;
                Vec::new()
            }
            AuthorityCall::UpdateAuthority {
                target,
                new_authority,
            } => {
                self.update_authority(host, target, new_authority)?;
                Vec::new()
            }
        };
        Ok(out)
    }
}

impl Contract for AccessManager {
    fn call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let call = AuthorityCall::decode(data)?;
        let function = call.function();
        let _timer = CallTimer::new(function.name());

        let result = (|| -> Result<Vec<u8>, CallError> {
            if !function.is_view() {
                ctx.require_mutable()?;
            }
            if admin_table::requires_authorization(function) {
                self.check_authorized(ctx.sender, data)?;
            }
            self.dispatch(host, ctx.sender, call)
        })();
        if let Err(e) = &result {
            metrics::record_call_error(function.name(), e.error_code());
        }
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        let mut marks = self.store.checkpoint();
        marks.push(self.events.checkpoint());
        Checkpoint(marks)
    }

    fn revert_to(&self, checkpoint: &Checkpoint) {
        if let Some((&events, store)) = checkpoint.0.split_last() {
            self.events.revert_to(events);
            self.store.revert_to(store);
        }
    }

    fn commit(&self) {
        self.store.commit();
        self.events.publish();
    }
}
