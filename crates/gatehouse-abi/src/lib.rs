//! # gatehouse-abi
//!
//! Call-data codec shared by the gatehouse authority, the resources it
//! manages, and anything that talks to either of them.
//!
//! ## Features
//!
//! - Fixed-width identifiers: [`Address`], [`Selector`], [`RoleId`], [`OperationId`]
//! - 32-byte word encoding with dynamic `bytes`, `string` and `bytes4[]` tails
//! - Typed calls for the authority ([`AuthorityCall`]) and the managed-resource
//!   surface ([`ManagedCall`])
//! - Operation and execution identifiers ([`hash_operation`], [`hash_execution_id`])
//!
//! ## Quick Start
//!
//! ```rust
//! use gatehouse_abi::{Address, AuthorityCall, RoleId};
//!
//! let data = AuthorityCall::GrantRole {
//!     role: RoleId(5),
//!     account: Address::from_low_u64(0xa11ce),
//!     execution_delay: 3600,
//! }
//! .encode();
//!
//! let decoded = AuthorityCall::decode(&data).expect("valid call data");
//! assert!(matches!(decoded, AuthorityCall::GrantRole { execution_delay: 3600, .. }));
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod call;
pub mod codec;
pub mod error;
pub mod hash;
pub mod types;
pub mod util;

pub use self::call::authority::{AuthorityCall, AuthorityFunction};
pub use self::call::managed::ManagedCall;
pub use self::codec::{encode, encode_call, Decoder, Token, WORD};
pub use self::error::AbiError;
pub use self::hash::{hash_execution_id, hash_operation};
pub use self::types::{Address, OperationId, RoleId, Selector};
pub use self::util::{from_hex, to_hex};
