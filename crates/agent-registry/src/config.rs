//! # Registry Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AR_GOVERNANCE` | (required) | Hex address of the initial governance principal |
//! | `AR_DATA_DIR` | unset | Data directory; enables the file snapshot store |
//! | `AR_PAUSE_SCOPE` | `create_agent,fund,withdraw,execute_action` | Operations disabled by global pause |
//! | `AR_ALLOW_TERMINATED_WITHDRAW` | `false` | Let owners withdraw from Terminated agents |
//! | `AR_COLLECTION_NAME` | `Non-Fungible Agent` | Display name of the identity collection |
//! | `AR_COLLECTION_SYMBOL` | `NFA` | Ticker symbol of the identity collection |
//!
//! The governance principal only seeds a fresh registry; once a snapshot
//! exists, the persisted principal wins.

use crate::domain::authorization::{PausePolicy, TerminationPolicy};
use crate::domain::value_objects::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Collection name used when none is configured.
pub const DEFAULT_COLLECTION_NAME: &str = "Non-Fungible Agent";

/// Collection symbol used when none is configured.
pub const DEFAULT_COLLECTION_SYMBOL: &str = "NFA";

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Governance principal missing or zero.
    #[error("governance principal must be a non-zero address (set AR_GOVERNANCE)")]
    MissingGovernance,

    /// A variable could not be parsed.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// Complete registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Initial governance principal for a fresh registry.
    pub governance: Address,
    /// Data directory for the file store; None keeps state in memory.
    pub data_dir: Option<PathBuf>,
    /// What global pause disables.
    pub pause_policy: PausePolicy,
    /// What a Terminated agent still accepts.
    pub termination_policy: TerminationPolicy,
    /// Display name of the identity collection.
    pub collection_name: String,
    /// Ticker symbol of the identity collection.
    pub collection_symbol: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            governance: Address::ZERO,
            data_dir: None,
            pause_policy: PausePolicy::default(),
            termination_policy: TerminationPolicy::default(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            collection_symbol: DEFAULT_COLLECTION_SYMBOL.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Configuration governed by `governance`, everything else default.
    #[must_use]
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            ..Self::default()
        }
    }

    /// Load from `AR_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for unparsable values or a missing governance principal.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for unparsable values or a missing governance principal.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("AR_GOVERNANCE") {
            config.governance = raw.parse().map_err(|e: crate::domain::ParseAddressError| {
                ConfigError::InvalidValue {
                    key: "AR_GOVERNANCE",
                    reason: e.to_string(),
                }
            })?;
        }

        config.data_dir = lookup("AR_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if let Some(scope) = lookup("AR_PAUSE_SCOPE") {
            config.pause_policy =
                PausePolicy::parse(&scope).map_err(|e| ConfigError::InvalidValue {
                    key: "AR_PAUSE_SCOPE",
                    reason: e.to_string(),
                })?;
        }

        if let Some(flag) = lookup("AR_ALLOW_TERMINATED_WITHDRAW") {
            config.termination_policy.allow_withdraw_after_termination =
                parse_flag(&flag).ok_or_else(|| ConfigError::InvalidValue {
                    key: "AR_ALLOW_TERMINATED_WITHDRAW",
                    reason: format!("expected true/false, got {flag:?}"),
                })?;
        }

        if let Some(name) = lookup("AR_COLLECTION_NAME") {
            config.collection_name = name.trim().to_string();
        }
        if let Some(symbol) = lookup("AR_COLLECTION_SYMBOL") {
            config.collection_symbol = symbol.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the registry cannot start with.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingGovernance`] for a zero governance principal
    /// - [`ConfigError::InvalidValue`] for an empty collection name or symbol
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.governance.is_zero() {
            return Err(ConfigError::MissingGovernance);
        }
        if self.collection_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "AR_COLLECTION_NAME",
                reason: "must not be empty".to_string(),
            });
        }
        if self.collection_symbol.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "AR_COLLECTION_SYMBOL",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
