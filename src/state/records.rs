//! Records stored in the authority's tables.

use super::delay::PendingDelay;
use crate::clock::Timepoint;
use gatehouse_abi::RoleId;
use serde::Serialize;

/// Per-role metadata. Membership lives in its own table, keyed by `(role, account)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleConfig {
    /// Role whose members may grant and revoke this one.
    pub admin: RoleId,
    /// Role whose members may cancel operations gated by this one.
    pub guardian: RoleId,
    /// Time between being granted this role and the grant taking effect.
    pub grant_delay: PendingDelay,
}

/// Membership of one account in one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Access {
    /// Timepoint the membership becomes effective; never zero. Revoked
    /// records are deleted, so a stored record is always a current or
    /// pending member.
    pub since: Timepoint,
    /// Delay the member must wait between scheduling and executing.
    pub delay: PendingDelay,
}

/// Per-target configuration. Function → role wiring lives in its own table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetConfig {
    /// Hard off-switch, independent of role wiring.
    pub closed: bool,
    /// Delay applied to administrative changes about this target.
    pub admin_delay: PendingDelay,
}

/// A scheduled operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// When the operation becomes executable; zero once consumed or cancelled.
    pub timepoint: Timepoint,
    /// Incremented on every schedule of the same operation id; never reset.
    pub nonce: u32,
}
