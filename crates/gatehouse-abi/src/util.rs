//! Hexadecimal helpers for identifiers and raw call data.

use crate::error::{AbiError, Result};

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Encode bytes as a lowercase `0x`-prefixed hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, with or without a `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_prefix(s)).map_err(|e| AbiError::InvalidHex(format!("{s}: {e}")))
}

/// Decode a hex string into a fixed-size array, left-padding short input with
/// zeros. An odd number of digits is read as if it had a leading `0`.
pub(crate) fn from_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
    let digits = strip_prefix(s);
    let decoded = if digits.len() % 2 == 0 {
        hex::decode(digits)
    } else {
        hex::decode(format!("0{digits}"))
    };
    let bytes = decoded.map_err(|e| AbiError::InvalidHex(format!("{s}: {e}")))?;
    if bytes.len() > N {
        return Err(AbiError::InvalidHex(format!("{s}: longer than {N} bytes")));
    }
    let mut out = [0u8; N];
    out[N - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}
