//! Function tables and typed calls for both sides of the protocol.
//!
//! - [`authority`]: everything the authority exposes to callers and resources.
//! - [`managed`]: the surface a managed resource exposes back to its authority.

pub mod authority;
pub mod managed;

use crate::types::Selector;
use std::collections::HashMap;
use std::hash::Hash;

/// Build a selector → function table from a list of functions.
fn lookup<F, S>(all: &[F], signature: S) -> HashMap<Selector, F>
where
    F: Copy + Eq + Hash,
    S: Fn(F) -> &'static str,
{
    all.iter()
        .map(|f| (Selector::from_signature(signature(*f)), *f))
        .collect()
}
