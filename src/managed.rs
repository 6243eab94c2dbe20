//! The guard a protected resource embeds to defer to an authority.
//!
//! A resource holds an [`AccessManaged`] and, for each sensitive function,
//! calls [`AccessManaged::check_can_call`] before doing any work. The guard
//! also answers the managed surface (`authority()`, `setAuthority(address)`,
//! `isConsumingScheduledOp()`) through [`AccessManaged::handle`].

use crate::error::{CallError, ManagedError};
use crate::host::{CallContext, Host};
use crate::probe::can_call_with_delay;
use crate::state::{AuthorityEvent, AuthorityObserver, EventBuffer, JournaledCell};
use gatehouse_abi::call::managed::encode_marker;
use gatehouse_abi::{encode, AbiError, Address, AuthorityCall, ManagedCall, Selector, Token};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AccessManaged {
    authority: JournaledCell<Address>,
    /// Set only while this resource is asking its authority to consume a schedule.
    consuming: Mutex<bool>,
    events: EventBuffer,
}

impl AccessManaged {
    pub fn new(initial_authority: Address) -> Self {
        Self {
            authority: JournaledCell::new(initial_authority),
            consuming: Mutex::new(false),
            events: EventBuffer::default(),
        }
    }

    pub fn authority(&self) -> Address {
        self.authority.get()
    }

    pub fn add_observer(&self, observer: Arc<dyn AuthorityObserver>) {
        self.events.add_observer(observer);
    }

    /// Authorize the call arriving in `ctx` with `data`.
    ///
    /// Immediate callers pass. Callers with a delay pass only if the authority
    /// consumes a due schedule for `(caller, this resource, data)`.
    pub fn check_can_call(&self, host: &Host, ctx: CallContext, data: &[u8]) -> Result<(), CallError> {
        let caller = ctx.sender;
        let selector = Selector::from_calldata(data).ok_or(AbiError::MissingSelector)?;
        let authority = self.authority();
        let (immediate, delay) = can_call_with_delay(host, authority, caller, ctx.this, selector);
        if immediate {
            return Ok(());
        }
        if delay == 0 {
            debug!(caller = %caller, resource = %ctx.this, selector = %selector, "Guarded call denied");
            return Err(ManagedError::Unauthorized(caller).into());
        }

        let _consuming = ConsumingGuard::new(&self.consuming);
        let consume = AuthorityCall::ConsumeScheduledOp {
            caller,
            data: data.to_vec(),
        }
        .encode();
        host.call(ctx.this, authority, &consume)?;
        Ok(())
    }

    /// Answer a managed-surface call. Returns `None` when `data` is for one of
    /// the resource's own functions.
    pub fn handle(
        &self,
        host: &Host,
        ctx: CallContext,
        data: &[u8],
    ) -> Option<Result<Vec<u8>, CallError>> {
        let call = match ManagedCall::decode(data) {
            Ok(Some(call)) => call,
            Ok(None) => return None,
            Err(e) => return Some(Err(e.into())),
        };
        Some(match call {
            ManagedCall::Authority => Ok(encode(&[Token::Address(self.authority())])),
            ManagedCall::IsConsumingScheduledOp => {
                let marker = if *self.consuming.lock() {
                    ManagedCall::consuming_marker()
                } else {
                    Selector([0; 4])
                };
                Ok(encode_marker(marker))
            }
            ManagedCall::SetAuthority(new_authority) => self
                .set_authority(host, ctx, new_authority)
                .map(|()| Vec::new()),
        })
    }

    /// Accept a handoff. Only the current authority may call this, and the
    /// new authority must be deployed.
    fn set_authority(&self, host: &Host, ctx: CallContext, new_authority: Address) -> Result<(), CallError> {
        ctx.require_mutable()?;
        if ctx.sender != self.authority() {
            return Err(ManagedError::Unauthorized(ctx.sender).into());
        }
        if !host.has_code(new_authority) {
            return Err(ManagedError::InvalidAuthority(new_authority).into());
        }
        self.authority.set(new_authority);
        info!(resource = %ctx.this, authority = %new_authority, "Authority updated");
        self.events.emit(AuthorityEvent::AuthorityUpdated {
            resource: ctx.this,
            authority: new_authority,
        });
        Ok(())
    }

    /// Journal marks, for the embedding resource's [`Contract::checkpoint`].
    ///
    /// [`Contract::checkpoint`]: crate::host::Contract::checkpoint
    pub fn checkpoint(&self) -> [usize; 2] {
        [self.authority.checkpoint(), self.events.checkpoint()]
    }

    pub fn revert_to(&self, marks: [usize; 2]) {
        self.events.revert_to(marks[1]);
        self.authority.revert_to(marks[0]);
    }

    pub fn commit(&self) {
        self.authority.commit();
        self.events.publish();
    }
}

/// Holds the consuming flag up for one consume request.
struct ConsumingGuard<'a> {
    flag: &'a Mutex<bool>,
}

impl<'a> ConsumingGuard<'a> {
    fn new(flag: &'a Mutex<bool>) -> Self {
        *flag.lock() = true;
        Self { flag }
    }
}

impl Drop for ConsumingGuard<'_> {
    fn drop(&mut self) {
        *self.flag.lock() = false;
    }
}
