//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that go beyond parsing

mod defaults;
mod types;
pub mod validation;

pub use types::{
    AuthorityConfig, ClockKind, Config, ConfigError, FunctionBlock, MemberBlock, RoleBlock,
    TargetBlock,
};
pub use validation::{validate, ValidationError};
