//! In-process host that deployed contracts run inside.
//!
//! The host owns a registry of [`Contract`]s keyed by address, the clock
//! they all read, and the call stack. It processes one top-level call at a
//! time. Each call frame snapshots every contract's journal before running;
//! a failed frame rolls every contract back to that snapshot, and the
//! outermost successful frame commits them all, publishing their events.

use crate::clock::{Clock, Timepoint};
use crate::error::CallError;
use dashmap::DashMap;
use gatehouse_abi::{Address, Selector};
use parking_lot::ReentrantMutex;
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, trace};

/// Nested frames beyond this depth fail with [`CallError::DepthExceeded`].
pub const MAX_CALL_DEPTH: usize = 64;

/// Who is calling, which contract is running, and whether it may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller of this frame.
    pub sender: Address,
    /// Address of the contract handling the frame.
    pub this: Address,
    /// Set for static calls and everything nested under one.
    pub is_static: bool,
}

impl CallContext {
    /// Fail if this frame may not change state.
    pub fn require_mutable(&self) -> Result<(), CallError> {
        if self.is_static {
            Err(CallError::StaticCallViolation)
        } else {
            Ok(())
        }
    }
}

/// Opaque journal marks produced by [`Contract::checkpoint`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint(pub Vec<usize>);

/// Code deployed at an address.
///
/// Contracts take `&self`: a call may re-enter the same contract through the
/// host, so no lock may be held across a nested [`Host::call`].
pub trait Contract: Send + Sync {
    fn call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<Vec<u8>, CallError>;

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint::default()
    }

    fn revert_to(&self, _checkpoint: &Checkpoint) {}

    /// Called when the outermost frame succeeds.
    fn commit(&self) {}
}

#[derive(Default)]
struct Stack {
    depth: usize,
    static_depth: usize,
}

pub struct Host {
    contracts: DashMap<Address, Arc<dyn Contract>>,
    clock: Arc<dyn Clock>,
    /// Serializes top-level calls; re-entered by nested frames on the same thread.
    stack: ReentrantMutex<Cell<Stack>>,
}

impl Host {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            contracts: DashMap::new(),
            clock,
            stack: ReentrantMutex::new(Cell::new(Stack::default())),
        }
    }

    pub fn now(&self) -> Timepoint {
        self.clock.now()
    }

    /// Install `contract` at `address`, replacing whatever was there.
    ///
    /// Anything the contract recorded while being constructed is committed.
    pub fn deploy(&self, address: Address, contract: Arc<dyn Contract>) {
        contract.commit();
        self.contracts.insert(address, contract);
        debug!(address = %address, "Contract deployed");
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    /// State-changing call from `from` to `to`.
    pub fn call(&self, from: Address, to: Address, data: &[u8]) -> Result<Vec<u8>, CallError> {
        self.frame(from, to, data, false)
    }

    /// Read-only call; any attempted write fails the frame.
    pub fn static_call(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, CallError> {
        self.frame(from, to, data, true)
    }

    fn frame(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
        is_static: bool,
    ) -> Result<Vec<u8>, CallError> {
        let stack = self.stack.lock();
        let outer = stack.take();
        if outer.depth >= MAX_CALL_DEPTH {
            stack.set(outer);
            return Err(CallError::DepthExceeded);
        }
        let is_static = is_static || outer.static_depth > 0;

        let contract = match self.contracts.get(&to) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                stack.set(outer);
                return Err(CallError::NoCode(to));
            }
        };
        let snapshot: Vec<(Arc<dyn Contract>, Checkpoint)> = self
            .contracts
            .iter()
            .map(|entry| {
                let c = Arc::clone(entry.value());
                let cp = c.checkpoint();
                (c, cp)
            })
            .collect();

        let depth = outer.depth;
        stack.set(Stack {
            depth: depth + 1,
            static_depth: outer.static_depth + usize::from(is_static),
        });
        trace!(
            from = %from,
            to = %to,
            selector = ?Selector::from_calldata(data),
            depth,
            is_static,
            "Call"
        );

        let ctx = CallContext {
            sender: from,
            this: to,
            is_static,
        };
        let result = contract.call(self, ctx, data);
        stack.set(outer);

        match &result {
            Err(e) => {
                debug!(to = %to, depth, error = %e, "Call reverted");
                for (c, cp) in snapshot.iter().rev() {
                    c.revert_to(cp);
                }
            }
            Ok(_) if depth == 0 => {
                for (c, _) in &snapshot {
                    c.commit();
                }
            }
            Ok(_) => {}
        }
        result
    }
}
