//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use gatehouse_abi::{Address, RoleId};
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("authority.admin must not be the zero address")]
    ZeroAdmin,
    #[error("authority.address must not be the zero address")]
    ZeroAuthority,
    #[error("policy.expiration must be greater than zero")]
    ZeroExpiration,
    #[error("authority.start_time must be greater than zero")]
    ZeroStartTime,
    #[error("role {0} is reserved and cannot be configured")]
    ReservedRole(RoleId),
    #[error("role {0} is configured more than once")]
    DuplicateRole(RoleId),
    #[error("target {0} is configured more than once")]
    DuplicateTarget(Address),
    #[error("target {0} is the authority itself")]
    AuthorityAsTarget(Address),
    #[error("function #{index} of target {target} needs exactly one of selector or signature")]
    AmbiguousFunction { target: Address, index: usize },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.authority.admin.is_zero() {
        errors.push(ValidationError::ZeroAdmin);
    }
    if config.authority.address.is_zero() {
        errors.push(ValidationError::ZeroAuthority);
    }
    if config.policy.expiration == 0 {
        errors.push(ValidationError::ZeroExpiration);
    }
    if config.authority.start_time == Some(0) {
        errors.push(ValidationError::ZeroStartTime);
    }

    let mut roles = HashSet::new();
    for role in &config.roles {
        if role.id.is_reserved() {
            errors.push(ValidationError::ReservedRole(role.id));
        }
        if !roles.insert(role.id) {
            errors.push(ValidationError::DuplicateRole(role.id));
        }
    }

    let mut targets = HashSet::new();
    for target in &config.targets {
        if target.address == config.authority.address {
            errors.push(ValidationError::AuthorityAsTarget(target.address));
        }
        if !targets.insert(target.address) {
            errors.push(ValidationError::DuplicateTarget(target.address));
        }
        for (index, function) in target.functions.iter().enumerate() {
            if function.resolve_selector().is_none() {
                errors.push(ValidationError::AmbiguousFunction {
                    target: target.address,
                    index,
                });
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
