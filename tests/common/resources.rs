//! Mock protected resources and authorities.

#![allow(dead_code)]

use gatehouse::host::{CallContext, Checkpoint, Contract, Host};
use gatehouse::state::{AuthorityObserver, JournaledCell};
use gatehouse::{AccessManaged, CallError};
use gatehouse_abi::{
    encode, encode_call, AbiError, Address, AuthorityCall, AuthorityFunction, Decoder, ManagedCall,
    Selector, Token,
};
use std::collections::HashSet;
use std::sync::Arc;

/// A balance guarded by an authority.
///
/// `deposit`, `withdraw` and `explode` are guarded; `balance` is open.
pub struct Vault {
    managed: AccessManaged,
    balance: JournaledCell<u64>,
}

impl Vault {
    pub const DEPOSIT: &'static str = "deposit(uint64)";
    pub const WITHDRAW: &'static str = "withdraw(uint64)";
    pub const EXPLODE: &'static str = "explode()";
    pub const BALANCE: &'static str = "balance()";

    pub fn new(authority: Address) -> Self {
        Self {
            managed: AccessManaged::new(authority),
            balance: JournaledCell::new(0),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn AuthorityObserver>) {
        self.managed.add_observer(observer);
    }

    pub fn selector(signature: &str) -> Selector {
        Selector::from_signature(signature)
    }

    pub fn deposit(amount: u64) -> Vec<u8> {
        encode_call(Self::selector(Self::DEPOSIT), &[Token::Uint(amount)])
    }

    pub fn withdraw(amount: u64) -> Vec<u8> {
        encode_call(Self::selector(Self::WITHDRAW), &[Token::Uint(amount)])
    }

    pub fn explode() -> Vec<u8> {
        encode_call(Self::selector(Self::EXPLODE), &[])
    }

    pub fn balance(&self) -> u64 {
        self.balance.get()
    }

    pub fn authority(&self) -> Address {
        self.managed.authority()
    }
}

impl Contract for Vault {
    fn call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if let Some(result) = self.managed.handle(host, ctx, data) {
            return result;
        }
        let selector = Selector::from_calldata(data).ok_or(AbiError::MissingSelector)?;
        if selector == Self::selector(Self::BALANCE) {
            return Ok(encode(&[Token::Uint(self.balance())]));
        }

        ctx.require_mutable()?;
        self.managed.check_can_call(host, ctx, data)?;

        if selector == Self::selector(Self::DEPOSIT) {
            let amount = Decoder::for_call(data)?.uint(64)?;
            self.balance.set(self.balance() + amount);
        } else if selector == Self::selector(Self::WITHDRAW) {
            let amount = Decoder::for_call(data)?.uint(64)?;
            let balance = self.balance();
            if amount > balance {
                return Err(CallError::Reverted("insufficient balance".into()));
            }
            self.balance.set(balance - amount);
        } else if selector == Self::selector(Self::EXPLODE) {
            return Err(CallError::Reverted("boom".into()));
        } else {
            return Err(AbiError::UnknownSelector(selector.to_string()).into());
        }
        Ok(Vec::new())
    }

    fn checkpoint(&self) -> Checkpoint {
        let [authority, events] = self.managed.checkpoint();
        Checkpoint(vec![authority, events, self.balance.checkpoint()])
    }

    fn revert_to(&self, checkpoint: &Checkpoint) {
        if let [authority, events, balance] = checkpoint.0[..] {
            self.balance.revert_to(balance);
            self.managed.revert_to([authority, events]);
        }
    }

    fn commit(&self) {
        self.balance.commit();
        self.managed.commit();
    }
}

/// A guarded resource whose `replay()` passes its guard and then asks the
/// authority to consume `caller`'s schedule for the same call again.
pub struct Replayer {
    managed: AccessManaged,
    caller: Address,
}

impl Replayer {
    pub const REPLAY: &'static str = "replay()";

    pub fn new(authority: Address, caller: Address) -> Self {
        Self {
            managed: AccessManaged::new(authority),
            caller,
        }
    }

    pub fn replay() -> Vec<u8> {
        encode_call(Selector::from_signature(Self::REPLAY), &[])
    }
}

impl Contract for Replayer {
    fn call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if let Some(result) = self.managed.handle(host, ctx, data) {
            return result;
        }
        ctx.require_mutable()?;
        self.managed.check_can_call(host, ctx, data)?;
        let again = CallContext {
            sender: self.caller,
            ..ctx
        };
        self.managed.check_can_call(host, again, data)?;
        Ok(Vec::new())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.managed.checkpoint().to_vec())
    }

    fn revert_to(&self, checkpoint: &Checkpoint) {
        if let [authority, events] = checkpoint.0[..] {
            self.managed.revert_to([authority, events]);
        }
    }

    fn commit(&self) {
        self.managed.commit();
    }
}

/// An authority that answers `canCall` with a bare `bool`.
pub struct LegacyAuthority {
    allowed: HashSet<Address>,
}

impl LegacyAuthority {
    pub fn new(allowed: impl IntoIterator<Item = Address>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl Contract for LegacyAuthority {
    fn call(&self, _host: &Host, _ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError> {
        match AuthorityCall::decode(data)? {
            AuthorityCall::CanCall { caller, .. } => {
                Ok(encode(&[Token::Bool(self.allowed.contains(&caller))]))
            }
            other => Err(CallError::Reverted(format!(
                "legacy authority does not implement {}",
                other.function().name()
            ))),
        }
    }
}

/// A contract that asks the authority to consume schedules without
/// declaring that it is consuming one.
pub struct Impostor {
    authority: Address,
    claims_marker: bool,
}

impl Impostor {
    pub fn new(authority: Address, claims_marker: bool) -> Self {
        Self {
            authority,
            claims_marker,
        }
    }
}

impl Contract for Impostor {
    fn call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if let Ok(Some(ManagedCall::IsConsumingScheduledOp)) = ManagedCall::decode(data) {
            let marker = if self.claims_marker {
                ManagedCall::consuming_marker()
            } else {
                AuthorityFunction::CanCall.selector()
            };
            return Ok(encode(&[Token::Selector(marker)]));
        }
        let consume = AuthorityCall::ConsumeScheduledOp {
            caller: ctx.sender,
            data: data.to_vec(),
        };
        host.call(ctx.this, self.authority, &consume.encode())
    }
}
