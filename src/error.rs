//! Unified error handling for gatehouse.
//!
//! Every failure is surfaced synchronously to the caller and aborts the whole
//! call frame; the host rolls back any state the frame touched.

use gatehouse_abi::{AbiError, Address, OperationId, RoleId, Selector};
use thiserror::Error;

/// Broad category of an authority failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks the role or ownership the action needs.
    Unauthorized,
    /// The action conflicts with current state (locked ids, schedule lifecycle).
    InvalidState,
    /// The request itself is malformed.
    BadInput,
}

// ============================================================================
// Authority Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("account {account} lacks role {required}")]
    UnauthorizedAccount { account: Address, required: RoleId },

    #[error("account {caller} may not call {selector} on {target}")]
    UnauthorizedCall {
        caller: Address,
        target: Address,
        selector: Selector,
    },

    #[error("account {sender} may not cancel {selector} on {target} scheduled by {caller}")]
    UnauthorizedCancel {
        sender: Address,
        caller: Address,
        target: Address,
        selector: Selector,
    },

    #[error("{0} is not consuming a scheduled operation")]
    UnauthorizedConsume(Address),

    #[error("role {0} is locked")]
    LockedRole(RoleId),

    #[error("account {0} is locked")]
    LockedAccount(Address),

    #[error("operation {0} is already scheduled")]
    AlreadyScheduled(OperationId),

    #[error("operation {0} is not scheduled")]
    NotScheduled(OperationId),

    #[error("operation {0} is not ready")]
    NotReady(OperationId),

    #[error("operation {0} has expired")]
    Expired(OperationId),

    #[error("confirmation does not match the caller")]
    BadConfirmation,

    #[error("malformed call data")]
    MalformedCalldata,

    #[error("invalid initial admin {0}")]
    InvalidInitialAdmin(Address),
}

impl AuthorityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnauthorizedAccount { .. }
            | Self::UnauthorizedCall { .. }
            | Self::UnauthorizedCancel { .. }
            | Self::UnauthorizedConsume(_) => ErrorKind::Unauthorized,
            Self::LockedRole(_)
            | Self::LockedAccount(_)
            | Self::AlreadyScheduled(_)
            | Self::NotScheduled(_)
            | Self::NotReady(_)
            | Self::Expired(_) => ErrorKind::InvalidState,
            Self::BadConfirmation | Self::MalformedCalldata | Self::InvalidInitialAdmin(_) => {
                ErrorKind::BadInput
            }
        }
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnauthorizedAccount { .. } => "unauthorized_account",
            Self::UnauthorizedCall { .. } => "unauthorized_call",
            Self::UnauthorizedCancel { .. } => "unauthorized_cancel",
            Self::UnauthorizedConsume(_) => "unauthorized_consume",
            Self::LockedRole(_) => "locked_role",
            Self::LockedAccount(_) => "locked_account",
            Self::AlreadyScheduled(_) => "already_scheduled",
            Self::NotScheduled(_) => "not_scheduled",
            Self::NotReady(_) => "not_ready",
            Self::Expired(_) => "expired",
            Self::BadConfirmation => "bad_confirmation",
            Self::MalformedCalldata => "malformed_calldata",
            Self::InvalidInitialAdmin(_) => "invalid_initial_admin",
        }
    }
}

// ============================================================================
// Managed Resource Errors
// ============================================================================

/// Failures raised by the guard embedded in a protected resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagedError {
    /// The caller may not run the guarded function now.
    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    /// The proposed authority has no deployed code.
    #[error("invalid authority {0}")]
    InvalidAuthority(Address),
}

impl ManagedError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "managed_unauthorized",
            Self::InvalidAuthority(_) => "managed_invalid_authority",
        }
    }
}

// ============================================================================
// Call Errors (host level)
// ============================================================================

/// Why a call frame failed. Any of these rolls the frame back.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error(transparent)]
    Managed(#[from] ManagedError),

    #[error("bad call data: {0}")]
    Abi(#[from] AbiError),

    #[error("no contract deployed at {0}")]
    NoCode(Address),

    #[error("state change attempted during a static call")]
    StaticCallViolation,

    #[error("call depth limit exceeded")]
    DepthExceeded,

    /// Failure defined by a protected resource itself.
    #[error("reverted: {0}")]
    Reverted(String),
}

impl CallError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authority(e) => e.error_code(),
            Self::Managed(e) => e.error_code(),
            Self::Abi(_) => "abi",
            Self::NoCode(_) => "no_code",
            Self::StaticCallViolation => "static_call_violation",
            Self::DepthExceeded => "depth_exceeded",
            Self::Reverted(_) => "reverted",
        }
    }

    /// The authority error behind this failure, if any.
    pub fn as_authority(&self) -> Option<&AuthorityError> {
        match self {
            Self::Authority(e) => Some(e),
            _ => None,
        }
    }
}
