//! Hashes that identify scheduled operations and in-flight executions.

use crate::codec::{encode, Token};
use crate::types::{Address, OperationId, Selector};
use sha2::{Digest, Sha256};

/// Identifier of the operation "`caller` invokes `target` with `data`".
///
/// Hashes the tuple encoding of `(address, address, bytes)`, so distinct
/// triples cannot collide through concatenation ambiguity.
pub fn hash_operation(caller: Address, target: Address, data: &[u8]) -> OperationId {
    let encoded = encode(&[
        Token::Address(caller),
        Token::Address(target),
        Token::Bytes(data),
    ]);
    OperationId(Sha256::digest(&encoded).into())
}

/// Identifier of the `(target, selector)` pair an `execute` is currently running.
pub fn hash_execution_id(target: Address, selector: Selector) -> [u8; 32] {
    let encoded = encode(&[Token::Address(target), Token::Selector(selector)]);
    Sha256::digest(&encoded).into()
}
