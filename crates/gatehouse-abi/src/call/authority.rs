//! The authority's public call surface.

use super::lookup;
use crate::codec::{encode_call, Decoder, Token};
use crate::error::{AbiError, Result};
use crate::types::{Address, OperationId, RoleId, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Every function the authority exposes, without arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityFunction {
    CanCall,
    Expiration,
    MinSetback,
    IsTargetClosed,
    GetTargetFunctionRole,
    GetTargetAdminDelay,
    GetRoleAdmin,
    GetRoleGuardian,
    GetRoleGrantDelay,
    GetAccess,
    HasRole,
    LabelRole,
    GrantRole,
    RevokeRole,
    RenounceRole,
    SetRoleAdmin,
    SetRoleGuardian,
    SetGrantDelay,
    SetTargetFunctionRole,
    SetTargetAdminDelay,
    SetTargetClosed,
    GetSchedule,
    GetNonce,
    Schedule,
    HashOperation,
    Execute,
    Cancel,
    ConsumeScheduledOp,
    UpdateAuthority,
}

impl AuthorityFunction {
    pub const ALL: [AuthorityFunction; 29] = [
        Self::CanCall,
        Self::Expiration,
        Self::MinSetback,
        Self::IsTargetClosed,
        Self::GetTargetFunctionRole,
        Self::GetTargetAdminDelay,
        Self::GetRoleAdmin,
        Self::GetRoleGuardian,
        Self::GetRoleGrantDelay,
        Self::GetAccess,
        Self::HasRole,
        Self::LabelRole,
        Self::GrantRole,
        Self::RevokeRole,
        Self::RenounceRole,
        Self::SetRoleAdmin,
        Self::SetRoleGuardian,
        Self::SetGrantDelay,
        Self::SetTargetFunctionRole,
        Self::SetTargetAdminDelay,
        Self::SetTargetClosed,
        Self::GetSchedule,
        Self::GetNonce,
        Self::Schedule,
        Self::HashOperation,
        Self::Execute,
        Self::Cancel,
        Self::ConsumeScheduledOp,
        Self::UpdateAuthority,
    ];

    /// Canonical signature the selector is derived from.
    pub fn signature(self) -> &'static str {
        match self {
            Self::CanCall => "canCall(address,address,bytes4)",
            Self::Expiration => "expiration()",
            Self::MinSetback => "minSetback()",
            Self::IsTargetClosed => "isTargetClosed(address)",
            Self::GetTargetFunctionRole => "getTargetFunctionRole(address,bytes4)",
            Self::GetTargetAdminDelay => "getTargetAdminDelay(address)",
            Self::GetRoleAdmin => "getRoleAdmin(uint64)",
            Self::GetRoleGuardian => "getRoleGuardian(uint64)",
            Self::GetRoleGrantDelay => "getRoleGrantDelay(uint64)",
            Self::GetAccess => "getAccess(uint64,address)",
            Self::HasRole => "hasRole(uint64,address)",
            Self::LabelRole => "labelRole(uint64,string)",
            Self::GrantRole => "grantRole(uint64,address,uint32)",
            Self::RevokeRole => "revokeRole(uint64,address)",
            Self::RenounceRole => "renounceRole(uint64,address)",
            Self::SetRoleAdmin => "setRoleAdmin(uint64,uint64)",
            Self::SetRoleGuardian => "setRoleGuardian(uint64,uint64)",
            Self::SetGrantDelay => "setGrantDelay(uint64,uint32)",
            Self::SetTargetFunctionRole => "setTargetFunctionRole(address,bytes4[],uint64)",
            Self::SetTargetAdminDelay => "setTargetAdminDelay(address,uint32)",
            Self::SetTargetClosed => "setTargetClosed(address,bool)",
            Self::GetSchedule => "getSchedule(bytes32)",
            Self::GetNonce => "getNonce(bytes32)",
            Self::Schedule => "schedule(address,bytes,uint48)",
            Self::HashOperation => "hashOperation(address,address,bytes)",
            Self::Execute => "execute(address,bytes)",
            Self::Cancel => "cancel(address,address,bytes)",
            Self::ConsumeScheduledOp => "consumeScheduledOp(address,bytes)",
            Self::UpdateAuthority => "updateAuthority(address,address)",
        }
    }

    /// Function name without the argument list, e.g. `canCall`.
    pub fn name(self) -> &'static str {
        let signature = self.signature();
        signature.split_once('(').map_or(signature, |(name, _)| name)
    }

    pub fn selector(self) -> Selector {
        Selector::from_signature(self.signature())
    }

    /// Look up the function behind a selector.
    pub fn from_selector(selector: Selector) -> Option<Self> {
        selectors().get(&selector).copied()
    }

    /// Returns `true` for functions that never mutate state.
    pub fn is_view(self) -> bool {
        matches!(
            self,
            Self::CanCall
                | Self::Expiration
                | Self::MinSetback
                | Self::IsTargetClosed
                | Self::GetTargetFunctionRole
                | Self::GetTargetAdminDelay
                | Self::GetRoleAdmin
                | Self::GetRoleGuardian
                | Self::GetRoleGrantDelay
                | Self::GetAccess
                | Self::HasRole
                | Self::GetSchedule
                | Self::GetNonce
                | Self::HashOperation
        )
    }
}

fn selectors() -> &'static HashMap<Selector, AuthorityFunction> {
    static TABLE: OnceLock<HashMap<Selector, AuthorityFunction>> = OnceLock::new();
    TABLE.get_or_init(|| lookup(&AuthorityFunction::ALL, |f| f.signature()))
}

/// A fully decoded call to the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityCall {
    CanCall {
        caller: Address,
        target: Address,
        selector: Selector,
    },
    Expiration,
    MinSetback,
    IsTargetClosed {
        target: Address,
    },
    GetTargetFunctionRole {
        target: Address,
        selector: Selector,
    },
    GetTargetAdminDelay {
        target: Address,
    },
    GetRoleAdmin {
        role: RoleId,
    },
    GetRoleGuardian {
        role: RoleId,
    },
    GetRoleGrantDelay {
        role: RoleId,
    },
    GetAccess {
        role: RoleId,
        account: Address,
    },
    HasRole {
        role: RoleId,
        account: Address,
    },
    LabelRole {
        role: RoleId,
        label: String,
    },
    GrantRole {
        role: RoleId,
        account: Address,
        execution_delay: u32,
    },
    RevokeRole {
        role: RoleId,
        account: Address,
    },
    RenounceRole {
        role: RoleId,
        caller_confirmation: Address,
    },
    SetRoleAdmin {
        role: RoleId,
        admin: RoleId,
    },
    SetRoleGuardian {
        role: RoleId,
        guardian: RoleId,
    },
    SetGrantDelay {
        role: RoleId,
        grant_delay: u32,
    },
    SetTargetFunctionRole {
        target: Address,
        selectors: Vec<Selector>,
        role: RoleId,
    },
    SetTargetAdminDelay {
        target: Address,
        admin_delay: u32,
    },
    SetTargetClosed {
        target: Address,
        closed: bool,
    },
    GetSchedule {
        id: OperationId,
    },
    GetNonce {
        id: OperationId,
    },
    Schedule {
        target: Address,
        data: Vec<u8>,
        when: u64,
    },
    HashOperation {
        caller: Address,
        target: Address,
        data: Vec<u8>,
    },
    Execute {
        target: Address,
        data: Vec<u8>,
    },
    Cancel {
        caller: Address,
        target: Address,
        data: Vec<u8>,
    },
    ConsumeScheduledOp {
        caller: Address,
        data: Vec<u8>,
    },
    UpdateAuthority {
        target: Address,
        new_authority: Address,
    },
}

impl AuthorityCall {
    /// The function this call invokes.
    pub fn function(&self) -> AuthorityFunction {
        use AuthorityFunction as F;
        match self {
            Self::CanCall { .. } => F::CanCall,
            Self::Expiration => F::Expiration,
            Self::MinSetback => F::MinSetback,
            Self::IsTargetClosed { .. } => F::IsTargetClosed,
            Self::GetTargetFunctionRole { .. } => F::GetTargetFunctionRole,
            Self::GetTargetAdminDelay { .. } => F::GetTargetAdminDelay,
            Self::GetRoleAdmin { .. } => F::GetRoleAdmin,
            Self::GetRoleGuardian { .. } => F::GetRoleGuardian,
            Self::GetRoleGrantDelay { .. } => F::GetRoleGrantDelay,
            Self::GetAccess { .. } => F::GetAccess,
            Self::HasRole { .. } => F::HasRole,
            Self::LabelRole { .. } => F::LabelRole,
            Self::GrantRole { .. } => F::GrantRole,
            Self::RevokeRole { .. } => F::RevokeRole,
            Self::RenounceRole { .. } => F::RenounceRole,
            Self::SetRoleAdmin { .. } => F::SetRoleAdmin,
            Self::SetRoleGuardian { .. } => F::SetRoleGuardian,
            Self::SetGrantDelay { .. } => F::SetGrantDelay,
            Self::SetTargetFunctionRole { .. } => F::SetTargetFunctionRole,
            Self::SetTargetAdminDelay { .. } => F::SetTargetAdminDelay,
            Self::SetTargetClosed { .. } => F::SetTargetClosed,
            Self::GetSchedule { .. } => F::GetSchedule,
            Self::GetNonce { .. } => F::GetNonce,
            Self::Schedule { .. } => F::Schedule,
            Self::HashOperation { .. } => F::HashOperation,
            Self::Execute { .. } => F::Execute,
            Self::Cancel { .. } => F::Cancel,
            Self::ConsumeScheduledOp { .. } => F::ConsumeScheduledOp,
            Self::UpdateAuthority { .. } => F::UpdateAuthority,
        }
    }

    /// Encode as call data.
    pub fn encode(&self) -> Vec<u8> {
        let role = |r: &RoleId| Token::Uint(r.0);
        let delay = |d: &u32| Token::Uint(u64::from(*d));
        let tokens: Vec<Token<'_>> = match self {
            Self::CanCall {
                caller,
                target,
                selector,
            } => vec![
                Token::Address(*caller),
                Token::Address(*target),
                Token::Selector(*selector),
            ],
            Self::Expiration | Self::MinSetback => vec![],
            Self::IsTargetClosed { target } | Self::GetTargetAdminDelay { target } => {
                vec![Token::Address(*target)]
            }
            Self::GetTargetFunctionRole { target, selector } => {
                vec![Token::Address(*target), Token::Selector(*selector)]
            }
            Self::GetRoleAdmin { role: r }
            | Self::GetRoleGuardian { role: r }
            | Self::GetRoleGrantDelay { role: r } => vec![role(r)],
            Self::GetAccess { role: r, account }
            | Self::HasRole { role: r, account }
            | Self::RevokeRole { role: r, account } => vec![role(r), Token::Address(*account)],
            Self::RenounceRole {
                role: r,
                caller_confirmation,
            } => vec![role(r), Token::Address(*caller_confirmation)],
            Self::LabelRole { role: r, label } => vec![role(r), Token::Str(label)],
            Self::GrantRole {
                role: r,
                account,
                execution_delay,
            } => vec![role(r), Token::Address(*account), delay(execution_delay)],
            Self::SetRoleAdmin { role: r, admin } => vec![role(r), role(admin)],
            Self::SetRoleGuardian { role: r, guardian } => vec![role(r), role(guardian)],
            Self::SetGrantDelay {
                role: r,
                grant_delay,
            } => vec![role(r), delay(grant_delay)],
            Self::SetTargetFunctionRole {
                target,
                selectors,
                role: r,
            } => vec![Token::Address(*target), Token::Selectors(selectors), role(r)],
            Self::SetTargetAdminDelay {
                target,
                admin_delay,
            } => vec![Token::Address(*target), delay(admin_delay)],
            Self::SetTargetClosed { target, closed } => {
                vec![Token::Address(*target), Token::Bool(*closed)]
            }
            Self::GetSchedule { id } | Self::GetNonce { id } => vec![Token::Word(id.0)],
            Self::Schedule { target, data, when } => vec![
                Token::Address(*target),
                Token::Bytes(data),
                Token::Uint(*when),
            ],
            Self::HashOperation {
                caller,
                target,
                data,
            }
            | Self::Cancel {
                caller,
                target,
                data,
            } => vec![
                Token::Address(*caller),
                Token::Address(*target),
                Token::Bytes(data),
            ],
            Self::Execute { target, data } => vec![Token::Address(*target), Token::Bytes(data)],
            Self::ConsumeScheduledOp { caller, data } => {
                vec![Token::Address(*caller), Token::Bytes(data)]
            }
            Self::UpdateAuthority {
                target,
                new_authority,
            } => vec![Token::Address(*target), Token::Address(*new_authority)],
        };
        encode_call(self.function().selector(), &tokens)
    }

    /// Decode call data addressed to the authority.
    pub fn decode(data: &[u8]) -> Result<Self> {
        use AuthorityFunction as F;
        let selector = Selector::from_calldata(data).ok_or(AbiError::MissingSelector)?;
        let function = AuthorityFunction::from_selector(selector)
            .ok_or_else(|| AbiError::UnknownSelector(selector.to_string()))?;
        let mut d = Decoder::for_call(data)?;
        let role = |d: &mut Decoder<'_>| d.uint(64).map(RoleId);

        let call = match function {
            F::CanCall => Self::CanCall {
                caller: d.address()?,
                target: d.address()?,
                selector: d.selector()?,
            },
            F::Expiration => Self::Expiration,
            F::MinSetback => Self::MinSetback,
            F::IsTargetClosed => Self::IsTargetClosed {
                target: d.address()?,
            },
            F::GetTargetFunctionRole => Self::GetTargetFunctionRole {
                target: d.address()?,
                selector: d.selector()?,
            },
            F::GetTargetAdminDelay => Self::GetTargetAdminDelay {
                target: d.address()?,
            },
            F::GetRoleAdmin => Self::GetRoleAdmin { role: role(&mut d)? },
            F::GetRoleGuardian => Self::GetRoleGuardian { role: role(&mut d)? },
            F::GetRoleGrantDelay => Self::GetRoleGrantDelay { role: role(&mut d)? },
            F::GetAccess => Self::GetAccess {
                role: role(&mut d)?,
                account: d.address()?,
            },
            F::HasRole => Self::HasRole {
                role: role(&mut d)?,
                account: d.address()?,
            },
            F::LabelRole => Self::LabelRole {
                role: role(&mut d)?,
                label: d.string()?,
            },
            F::GrantRole => Self::GrantRole {
                role: role(&mut d)?,
                account: d.address()?,
                execution_delay: d.uint32()?,
            },
            F::RevokeRole => Self::RevokeRole {
                role: role(&mut d)?,
                account: d.address()?,
            },
            F::RenounceRole => Self::RenounceRole {
                role: role(&mut d)?,
                caller_confirmation: d.address()?,
            },
            F::SetRoleAdmin => Self::SetRoleAdmin {
                role: role(&mut d)?,
                admin: role(&mut d)?,
            },
            F::SetRoleGuardian => Self::SetRoleGuardian {
                role: role(&mut d)?,
                guardian: role(&mut d)?,
            },
            F::SetGrantDelay => Self::SetGrantDelay {
                role: role(&mut d)?,
                grant_delay: d.uint32()?,
            },
            F::SetTargetFunctionRole => Self::SetTargetFunctionRole {
                target: d.address()?,
                selectors: d.selectors()?,
                role: role(&mut d)?,
            },
            F::SetTargetAdminDelay => Self::SetTargetAdminDelay {
                target: d.address()?,
                admin_delay: d.uint32()?,
            },
            F::SetTargetClosed => Self::SetTargetClosed {
                target: d.address()?,
                closed: d.bool()?,
            },
            F::GetSchedule => Self::GetSchedule {
                id: d.operation_id()?,
            },
            F::GetNonce => Self::GetNonce {
                id: d.operation_id()?,
            },
            F::Schedule => Self::Schedule {
                target: d.address()?,
                data: d.bytes()?,
                when: d.uint(48)?,
            },
            F::HashOperation => Self::HashOperation {
                caller: d.address()?,
                target: d.address()?,
                data: d.bytes()?,
            },
            F::Execute => Self::Execute {
                target: d.address()?,
                data: d.bytes()?,
            },
            F::Cancel => Self::Cancel {
                caller: d.address()?,
                target: d.address()?,
                data: d.bytes()?,
            },
            F::ConsumeScheduledOp => Self::ConsumeScheduledOp {
                caller: d.address()?,
                data: d.bytes()?,
            },
            F::UpdateAuthority => Self::UpdateAuthority {
                target: d.address()?,
                new_authority: d.address()?,
            },
        };
        Ok(call)
    }
}

/// Read the leading address argument of a call without decoding the rest.
///
/// Used by the self-administration resolver, which only needs the target or
/// role named by the first argument.
pub fn first_address_arg(data: &[u8]) -> Result<Address> {
    Decoder::for_call(data)?.address()
}

/// Read the leading `uint64` argument of a call without decoding the rest.
pub fn first_role_arg(data: &[u8]) -> Result<RoleId> {
    Decoder::for_call(data)?.uint(64).map(RoleId)
}
