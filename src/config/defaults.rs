//! Default value functions for configuration.

use gatehouse_abi::Address;

/// Where the authority is deployed unless configured otherwise.
pub fn default_authority_address() -> Address {
    Address::from_low_u64(0x0a11_7401)
}

pub fn default_false() -> bool {
    false
}
