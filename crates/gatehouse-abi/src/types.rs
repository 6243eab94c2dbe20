//! Identifier types shared across the authority and its resources.
//!
//! | Type | Width | Textual form |
//! |------|-------|--------------|
//! | [`Address`] | 20 bytes | `0x` + 40 hex digits |
//! | [`Selector`] | 4 bytes | `0x` + 8 hex digits |
//! | [`OperationId`] | 32 bytes | `0x` + 64 hex digits |
//! | [`RoleId`] | 64 bits | decimal |

use crate::error::AbiError;
use crate::util::{from_hex_fixed, to_hex};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Account or contract address inside the host.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address whose low 8 bytes hold `n`; handy for fixtures and configs.
    pub const fn from_low_u64(n: u64) -> Self {
        let b = n.to_be_bytes();
        let mut out = [0u8; 20];
        let mut i = 0;
        while i < 8 {
            out[12 + i] = b[i];
            i += 1;
        }
        Address(out)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns `true` for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_hex_fixed::<20>(s).map(Address)
    }
}

/// Four-byte function selector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Derive a selector from a canonical signature such as `canCall(address,address,bytes4)`.
    pub fn from_signature(signature: &str) -> Self {
        let digest = Sha256::digest(signature.as_bytes());
        Selector([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Read the selector at the head of `data`, if there is one.
    pub fn from_calldata(data: &[u8]) -> Option<Self> {
        data.get(..4).map(|head| Selector([head[0], head[1], head[2], head[3]]))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self {
        Selector(value.to_be_bytes())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}

impl FromStr for Selector {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 8 {
            return Err(AbiError::InvalidHex(s.to_string()));
        }
        from_hex_fixed::<4>(s).map(Selector)
    }
}

/// Identifier of a scheduled operation: a hash of `(caller, target, data)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OperationId(pub [u8; 32]);

impl OperationId {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId({self})")
    }
}

impl FromStr for OperationId {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 64 {
            return Err(AbiError::InvalidHex(s.to_string()));
        }
        from_hex_fixed::<32>(s).map(OperationId)
    }
}

/// Role identifier.
///
/// Two values are reserved: [`RoleId::ADMIN`] (0) and [`RoleId::PUBLIC`] (`u64::MAX`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoleId(pub u64);

impl RoleId {
    /// Administrative role; the root of every admin chain.
    pub const ADMIN: RoleId = RoleId(0);
    /// Implicitly held by every account with zero delay.
    pub const PUBLIC: RoleId = RoleId(u64::MAX);

    /// Returns `true` for `ADMIN` and `PUBLIC`.
    pub fn is_reserved(self) -> bool {
        self == Self::ADMIN || self == Self::PUBLIC
    }
}

impl From<u64> for RoleId {
    fn from(value: u64) -> Self {
        RoleId(value)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ADMIN => f.write_str("ADMIN"),
            Self::PUBLIC => f.write_str("PUBLIC"),
            RoleId(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Debug for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleId({self})")
    }
}

// Hex-string serde for the byte identifiers; `RoleId` derives above.
#[cfg(feature = "serde")]
macro_rules! hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(feature = "serde")]
hex_serde!(Address);
#[cfg(feature = "serde")]
hex_serde!(Selector);
#[cfg(feature = "serde")]
hex_serde!(OperationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0x00000000000000000000000000000000000000ab".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(0xab));
        assert_eq!(
            addr.to_string(),
            "0x00000000000000000000000000000000000000ab"
        );
    }

    #[test]
    fn test_address_short_form_is_left_padded() {
        let addr: Address = "0x05".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(5));
        assert!(!addr.is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_selector_requires_eight_digits() {
        let sel: Selector = "0xaabbccdd".parse().unwrap();
        assert_eq!(sel, Selector::from(0xaabbccdd));
        assert!("0xaabb".parse::<Selector>().is_err());
    }

    #[test]
    fn test_selector_from_signature_is_stable() {
        let a = Selector::from_signature("canCall(address,address,bytes4)");
        let b = Selector::from_signature("canCall(address,address,bytes4)");
        let c = Selector::from_signature("hasRole(uint64,address)");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_selector_from_calldata() {
        assert_eq!(
            Selector::from_calldata(&[0xaa, 0xbb, 0xcc, 0xdd, 0x01]),
            Some(Selector::from(0xaabbccdd))
        );
        assert_eq!(Selector::from_calldata(&[0xaa, 0xbb]), None);
    }

    #[test]
    fn test_reserved_roles() {
        assert!(RoleId::ADMIN.is_reserved());
        assert!(RoleId::PUBLIC.is_reserved());
        assert!(!RoleId(5).is_reserved());
        assert_eq!(RoleId::PUBLIC.to_string(), "PUBLIC");
        assert_eq!(RoleId(5).to_string(), "5");
    }
}
