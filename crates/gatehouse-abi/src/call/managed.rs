//! The surface every managed resource exposes to its authority.

use crate::codec::{encode, encode_call, Decoder, Token};
use crate::error::{AbiError, Result};
use crate::types::{Address, Selector};

/// Calls an authority (or anyone) may send to a managed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedCall {
    /// `authority() -> address`
    Authority,
    /// `setAuthority(address)`; only honoured when sent by the current authority.
    SetAuthority(Address),
    /// `isConsumingScheduledOp() -> bytes4`
    IsConsumingScheduledOp,
}

impl ManagedCall {
    pub const AUTHORITY_SIGNATURE: &'static str = "authority()";
    pub const SET_AUTHORITY_SIGNATURE: &'static str = "setAuthority(address)";
    pub const IS_CONSUMING_SIGNATURE: &'static str = "isConsumingScheduledOp()";

    /// Selector of `isConsumingScheduledOp()`.
    ///
    /// A resource returns exactly this value while it is in the middle of
    /// consuming a schedule, and anything else otherwise.
    pub fn consuming_marker() -> Selector {
        Selector::from_signature(Self::IS_CONSUMING_SIGNATURE)
    }

    pub fn selector(&self) -> Selector {
        Selector::from_signature(match self {
            Self::Authority => Self::AUTHORITY_SIGNATURE,
            Self::SetAuthority(_) => Self::SET_AUTHORITY_SIGNATURE,
            Self::IsConsumingScheduledOp => Self::IS_CONSUMING_SIGNATURE,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::SetAuthority(addr) => encode_call(self.selector(), &[Token::Address(*addr)]),
            _ => encode_call(self.selector(), &[]),
        }
    }

    /// Decode a managed-surface call.
    ///
    /// Returns `Ok(None)` when the selector belongs to the resource's own
    /// functions, so the resource can dispatch it itself.
    pub fn decode(data: &[u8]) -> Result<Option<Self>> {
        let selector = Selector::from_calldata(data).ok_or(AbiError::MissingSelector)?;
        let call = if selector == Self::Authority.selector() {
            Self::Authority
        } else if selector == Self::SetAuthority(Address::ZERO).selector() {
            Self::SetAuthority(Decoder::for_call(data)?.address()?)
        } else if selector == Self::IsConsumingScheduledOp.selector() {
            Self::IsConsumingScheduledOp
        } else {
            return Ok(None);
        };
        Ok(Some(call))
    }
}

/// Encode the return value of `isConsumingScheduledOp()`.
pub fn encode_marker(marker: Selector) -> Vec<u8> {
    encode(&[Token::Selector(marker)])
}

/// Decode the return value of `isConsumingScheduledOp()`.
pub fn decode_marker(ret: &[u8]) -> Result<Selector> {
    Decoder::new(ret).selector()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_managed_calls() {
        let addr = Address::from_low_u64(3);
        assert_eq!(
            ManagedCall::decode(&ManagedCall::SetAuthority(addr).encode()).unwrap(),
            Some(ManagedCall::SetAuthority(addr))
        );
        assert_eq!(
            ManagedCall::decode(&ManagedCall::IsConsumingScheduledOp.encode()).unwrap(),
            Some(ManagedCall::IsConsumingScheduledOp)
        );
    }

    #[test]
    fn test_foreign_selector_is_not_managed() {
        assert_eq!(ManagedCall::decode(&[0xaa, 0xbb, 0xcc, 0xdd]).unwrap(), None);
        assert!(ManagedCall::decode(&[0xaa]).is_err());
    }

    #[test]
    fn test_marker_word() {
        let marker = ManagedCall::consuming_marker();
        assert_eq!(decode_marker(&encode_marker(marker)).unwrap(), marker);
        assert_eq!(marker, ManagedCall::IsConsumingScheduledOp.selector());
    }
}
