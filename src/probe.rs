//! Tolerant `canCall` probe used by protected resources.
//!
//! Authorities come in two shapes: ones answering `canCall` with
//! `(bool immediate, uint32 delay)` and older ones answering with a bare
//! `bool`. The probe normalizes both into `(immediate, delay)` and never
//! fails: anything it cannot make sense of means "no permission, no delay".

use crate::clock::Delay;
use crate::host::Host;
use gatehouse_abi::codec::{word_to_bool, word_to_uint};
use gatehouse_abi::{Address, AuthorityCall, Selector, WORD};
use tracing::debug;

/// Ask `authority` whether `caller` may invoke `selector` on `target`.
///
/// The question is sent as a static call from `target`.
pub fn can_call_with_delay(
    host: &Host,
    authority: Address,
    caller: Address,
    target: Address,
    selector: Selector,
) -> (bool, Delay) {
    let data = AuthorityCall::CanCall {
        caller,
        target,
        selector,
    }
    .encode();
    match host.static_call(target, authority, &data) {
        Ok(ret) => decode_response(&ret),
        Err(e) => {
            debug!(authority = %authority, error = %e, "canCall probe failed");
            (false, 0)
        }
    }
}

/// Normalize a raw `canCall` return buffer.
///
/// | Length | Result |
/// |--------|--------|
/// | < 32 | `(false, 0)` |
/// | 32..64 | `(bool, 0)` |
/// | >= 64 | `(bool, uint32)`, or `(false, 0)` if either word is out of range |
pub fn decode_response(ret: &[u8]) -> (bool, Delay) {
    let word = |i: usize| -> Option<[u8; WORD]> { ret.get(i * WORD..(i + 1) * WORD)?.try_into().ok() };

    let Some(first) = word(0) else {
        return (false, 0);
    };
    let Ok(immediate) = word_to_bool(&first) else {
        return (false, 0);
    };
    let Some(second) = word(1) else {
        return (immediate, 0);
    };
    match word_to_uint(&second, 32).map(Delay::try_from) {
        Ok(Ok(delay)) => (immediate, delay),
        _ => (false, 0),
    }
}
