//! Apply the configured roles and targets to a freshly deployed authority.
//!
//! Every change is an ordinary call from the bootstrap admin, so genesis
//! obeys the same rules as any later administration. Steps run in an order
//! that keeps the admin able to finish: members are granted before a role
//! is handed to another admin role, and delays are raised last.

use crate::config::{Config, RoleBlock, TargetBlock};
use crate::error::CallError;
use crate::host::Host;
use crate::telemetry::spans;
use gatehouse_abi::{Address, AuthorityCall};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("genesis step `{step}` failed: {source}")]
pub struct GenesisError {
    pub step: String,
    pub source: CallError,
}

/// Apply `config`'s roles and targets. Returns the number of calls made.
pub fn apply(host: &Host, config: &Config) -> Result<usize, GenesisError> {
    let authority = config.authority.address;
    let admin = config.authority.admin;
    let _span = spans::genesis(&authority.to_string()).entered();

    let mut calls = Vec::new();
    for role in &config.roles {
        role_calls(role, &mut calls);
    }
    for target in &config.targets {
        target_calls(target, &mut calls);
    }
    for role in config.roles.iter().filter(|r| r.grant_delay > 0) {
        calls.push(AuthorityCall::SetGrantDelay {
            role: role.id,
            grant_delay: role.grant_delay,
        });
    }
    for target in config.targets.iter().filter(|t| t.admin_delay > 0) {
        calls.push(AuthorityCall::SetTargetAdminDelay {
            target: target.address,
            admin_delay: target.admin_delay,
        });
    }

    for call in &calls {
        send(host, admin, authority, call)?;
    }
    info!(calls = calls.len(), roles = config.roles.len(), targets = config.targets.len(), "Genesis applied");
    Ok(calls.len())
}

fn role_calls(role: &RoleBlock, calls: &mut Vec<AuthorityCall>) {
    if let Some(label) = &role.label {
        calls.push(AuthorityCall::LabelRole {
            role: role.id,
            label: label.clone(),
        });
    }
    for member in &role.members {
        calls.push(AuthorityCall::GrantRole {
            role: role.id,
            account: member.account,
            execution_delay: member.execution_delay,
        });
    }
    if let Some(guardian) = role.guardian {
        calls.push(AuthorityCall::SetRoleGuardian {
            role: role.id,
            guardian,
        });
    }
    if let Some(admin) = role.admin {
        calls.push(AuthorityCall::SetRoleAdmin { role: role.id, admin });
    }
}

fn target_calls(target: &TargetBlock, calls: &mut Vec<AuthorityCall>) {
    for function in &target.functions {
        if let Some(selector) = function.resolve_selector() {
            calls.push(AuthorityCall::SetTargetFunctionRole {
                target: target.address,
                selectors: vec![selector],
                role: function.role,
            });
        }
    }
    if target.closed {
        calls.push(AuthorityCall::SetTargetClosed {
            target: target.address,
            closed: true,
        });
    }
}

fn send(host: &Host, admin: Address, authority: Address, call: &AuthorityCall) -> Result<(), GenesisError> {
    host.call(admin, authority, &call.encode())
        .map(|_| ())
        .map_err(|source| GenesisError {
            step: call.function().name().to_string(),
            source,
        })
}
