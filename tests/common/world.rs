//! Test world: host, clock, authority and one vault.

#![allow(dead_code)]

use super::resources::Vault;
use gatehouse::authority::Policy;
use gatehouse::state::{AuthorityEvent, RecordingObserver};
use gatehouse::{AccessManager, AuthorityError, CallError, Host, ManualClock};
use gatehouse_abi::{Address, AuthorityCall, Decoder, OperationId, RoleId, Selector};
use std::sync::Arc;

pub const AUTHORITY: Address = Address::from_low_u64(0xa0);
pub const ADMIN: Address = Address::from_low_u64(0xad);
pub const ALICE: Address = Address::from_low_u64(0xa11ce);
pub const BOB: Address = Address::from_low_u64(0xb0b);
pub const CAROL: Address = Address::from_low_u64(0xca201);
pub const VAULT: Address = Address::from_low_u64(0x7a);

/// Timepoint every world starts at.
pub const GENESIS: u64 = 1_700_000_000;

pub struct TestWorld {
    pub host: Arc<Host>,
    pub clock: Arc<ManualClock>,
    pub authority: Arc<AccessManager>,
    pub recorder: Arc<RecordingObserver>,
    pub vault: Arc<Vault>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_policy(Policy::default())
    }

    pub fn with_policy(policy: Policy) -> Self {
        let clock = Arc::new(ManualClock::new(GENESIS));
        let host = Arc::new(Host::new(clock.clone()));
        let recorder = Arc::new(RecordingObserver::new());
        let authority = Arc::new(
            AccessManager::new(AUTHORITY, ADMIN, policy, clock.clone())
                .expect("authority construction"),
        );
        authority.add_observer(recorder.clone());
        host.deploy(AUTHORITY, authority.clone());

        let vault = Arc::new(Vault::new(AUTHORITY));
        vault.add_observer(recorder.clone());
        host.deploy(VAULT, vault.clone());
        recorder.drain();

        Self {
            host,
            clock,
            authority,
            recorder,
            vault,
        }
    }

    pub fn now(&self) -> u64 {
        self.authority.now()
    }

    pub fn advance(&self, seconds: u64) {
        self.clock.advance(seconds);
    }

    /// Send `call` to the authority from `from`.
    pub fn call(&self, from: Address, call: AuthorityCall) -> Result<Vec<u8>, CallError> {
        self.host.call(from, AUTHORITY, &call.encode())
    }

    /// Send `call` as the bootstrap admin; it must succeed.
    pub fn admin(&self, call: AuthorityCall) {
        let name = call.function().name();
        self.call(ADMIN, call)
            .unwrap_or_else(|e| panic!("admin {name} failed: {e}"));
    }

    pub fn grant(&self, role: u64, account: Address, execution_delay: u32) {
        self.admin(AuthorityCall::GrantRole {
            role: RoleId(role),
            account,
            execution_delay,
        });
    }

    pub fn wire(&self, target: Address, selectors: &[Selector], role: u64) {
        self.admin(AuthorityCall::SetTargetFunctionRole {
            target,
            selectors: selectors.to_vec(),
            role: RoleId(role),
        });
    }

    pub fn schedule(
        &self,
        from: Address,
        target: Address,
        data: &[u8],
        when: u64,
    ) -> Result<(OperationId, u32), CallError> {
        let ret = self.call(
            from,
            AuthorityCall::Schedule {
                target,
                data: data.to_vec(),
                when,
            },
        )?;
        let mut d = Decoder::new(&ret);
        Ok((d.operation_id()?, d.uint32()?))
    }

    pub fn execute(&self, from: Address, target: Address, data: &[u8]) -> Result<u32, CallError> {
        let ret = self.call(
            from,
            AuthorityCall::Execute {
                target,
                data: data.to_vec(),
            },
        )?;
        Ok(Decoder::new(&ret).uint32()?)
    }

    pub fn cancel(
        &self,
        from: Address,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<u32, CallError> {
        let ret = self.call(
            from,
            AuthorityCall::Cancel {
                caller,
                target,
                data: data.to_vec(),
            },
        )?;
        Ok(Decoder::new(&ret).uint32()?)
    }

    /// Call the vault directly from `from`.
    pub fn call_vault(&self, from: Address, data: &[u8]) -> Result<Vec<u8>, CallError> {
        self.host.call(from, VAULT, data)
    }

    pub fn events(&self) -> Vec<AuthorityEvent> {
        self.recorder.drain()
    }
}

/// The authority error behind a failed call; panics on success or other failures.
pub fn authority_err<T: std::fmt::Debug>(result: Result<T, CallError>) -> AuthorityError {
    match result {
        Err(CallError::Authority(e)) => e,
        other => panic!("expected an authority error, got {other:?}"),
    }
}
