//! Core configuration types and loading.

use super::defaults::{default_authority_address, default_false};
use crate::authority::Policy;
use crate::clock::{Delay, Timepoint};
use gatehouse_abi::{Address, RoleId, Selector};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<super::ValidationError>),
}

fn join_errors(errors: &[super::ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub authority: AuthorityConfig,
    /// Expiration window and minimum setback.
    #[serde(default)]
    pub policy: Policy,
    /// Roles to configure at startup.
    #[serde(default)]
    pub roles: Vec<RoleBlock>,
    /// Targets to configure at startup.
    #[serde(default)]
    pub targets: Vec<TargetBlock>,
    /// Serve Prometheus metrics on this port when set.
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        super::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityConfig {
    /// Address the authority is deployed at.
    #[serde(default = "default_authority_address")]
    pub address: Address,
    /// Bootstrap `ADMIN` member. Genesis is applied as this account.
    pub admin: Address,
    #[serde(default)]
    pub clock: ClockKind,
    /// Initial time of the manual clock, defaulting to the wall clock;
    /// ignored for the system clock.
    pub start_time: Option<Timepoint>,
}

/// Time source for the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    #[default]
    System,
    /// Only moves on `advance` requests; for simulations.
    Manual,
}

/// A role configured at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleBlock {
    pub id: RoleId,
    pub label: Option<String>,
    pub admin: Option<RoleId>,
    pub guardian: Option<RoleId>,
    /// Applied after the members below are granted.
    #[serde(default)]
    pub grant_delay: Delay,
    #[serde(default)]
    pub members: Vec<MemberBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberBlock {
    pub account: Address,
    #[serde(default)]
    pub execution_delay: Delay,
}

/// A target configured at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetBlock {
    pub address: Address,
    #[serde(default = "default_false")]
    pub closed: bool,
    /// Applied after the function roles below are set.
    #[serde(default)]
    pub admin_delay: Delay,
    #[serde(default)]
    pub functions: Vec<FunctionBlock>,
}

/// One function → role wiring. Exactly one of `selector` and `signature` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionBlock {
    pub selector: Option<Selector>,
    pub signature: Option<String>,
    pub role: RoleId,
}

impl FunctionBlock {
    pub fn resolve_selector(&self) -> Option<Selector> {
        match (&self.selector, &self.signature) {
            (Some(selector), None) => Some(*selector),
            (None, Some(signature)) => Some(Selector::from_signature(signature)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
metrics_port = 9100

[authority]
address = "0xa0"
admin = "0xad"
clock = "manual"
start_time = 1000

[policy]
expiration = 86400

[[roles]]
id = 5
label = "operators"
guardian = 6
grant_delay = 3600
members = [{ account = "0xa11ce" }, { account = "0xb0b", execution_delay = 3600 }]

[[targets]]
address = "0x7a"
functions = [
    { selector = "0xaabbccdd", role = 5 },
    { signature = "withdraw(uint64)", role = 5 },
]
"#;

    #[test]
    fn test_load_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.authority.address, Address::from_low_u64(0xa0));
        assert_eq!(config.authority.clock, ClockKind::Manual);
        assert_eq!(config.policy.expiration, 86_400);
        assert_eq!(
            config.policy.min_setback,
            crate::authority::DEFAULT_MIN_SETBACK
        );
        assert_eq!(config.roles[0].members[1].execution_delay, 3_600);
        assert_eq!(config.roles[0].admin, None);
        assert_eq!(
            config.targets[0].functions[1].resolve_selector(),
            Some(Selector::from_signature("withdraw(uint64)"))
        );
        assert_eq!(config.metrics_port, Some(9100));
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("[authority]\nadmin = \"0x01\"\n").unwrap();
        assert_eq!(config.authority.clock, ClockKind::System);
        assert_eq!(config.authority.address, default_authority_address());
        assert_eq!(config.policy, Policy::default());
        assert!(config.roles.is_empty());
    }

    #[test]
    fn test_malformed_address_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[authority]\nadmin = \"0xzz\"\n").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
