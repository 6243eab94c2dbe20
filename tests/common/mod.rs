//! Integration test common infrastructure.
//!
//! Builds a host with a manual clock, an authority and a guarded vault, and
//! wraps the authority's call surface in typed helpers.

pub mod resources;
pub mod world;

#[allow(unused_imports)]
pub use resources::{Impostor, LegacyAuthority, Replayer, Vault};
#[allow(unused_imports)]
pub use world::{authority_err, TestWorld, ADMIN, ALICE, AUTHORITY, BOB, CAROL, GENESIS, VAULT};
