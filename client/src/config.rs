//! Client configuration.
//!
//! Built once, validated, then shared read-only as `Arc<ClientConfig>`.

use std::env;
use std::path::Path;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use eerc_lib::{MAX_DECIMALS, MAX_DLOG_BOUND};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractsConfig {
    pub registrar: Address,
    pub token: Address,
    #[serde(default)]
    pub token_id: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            symbol: default_symbol(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProverConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecryptionConfig {
    /// Largest balance, in base units, the discrete-log search will find.
    #[serde(default = "default_max_balance")]
    pub max_balance: u64,
}

impl Default for DecryptionConfig {
    fn default() -> Self {
        Self {
            max_balance: default_max_balance(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub token: TokenConfig,
    pub prover: ProverConfig,
    #[serde(default)]
    pub decryption: DecryptionConfig,
}

fn default_decimals() -> u8 {
    2
}

fn default_symbol() -> String {
    "PRIV".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_balance() -> u64 {
    1 << 32
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_var<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn optional<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => parse_var(key, &value),
        Err(_) => Ok(default),
    }
}

impl ClientConfig {
    /// Load from environment variables. Binaries call `dotenv` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            network: NetworkConfig {
                rpc_url: required("RPC_URL")?,
                chain_id: parse_var("CHAIN_ID", &required("CHAIN_ID")?)?,
            },
            contracts: ContractsConfig {
                registrar: parse_var("REGISTRAR_ADDRESS", &required("REGISTRAR_ADDRESS")?)?,
                token: parse_var("TOKEN_ADDRESS", &required("TOKEN_ADDRESS")?)?,
                token_id: optional("TOKEN_ID", U256::ZERO)?,
            },
            token: TokenConfig {
                decimals: optional("TOKEN_DECIMALS", default_decimals())?,
                symbol: env::var("TOKEN_SYMBOL").unwrap_or_else(|_| default_symbol()),
            },
            prover: ProverConfig {
                url: required("PROVER_URL")?,
                timeout_secs: optional("PROVER_TIMEOUT_SECS", default_timeout_secs())?,
            },
            decryption: DecryptionConfig {
                max_balance: optional("MAX_DECRYPTABLE_BALANCE", default_max_balance())?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("network.rpc_url", &self.network.rpc_url)?;
        check_url("prover.url", &self.prover.url)?;
        if self.token.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                key: "token.decimals",
                reason: format!("{} exceeds {}", self.token.decimals, MAX_DECIMALS),
            });
        }
        if self.prover.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "prover.timeout_secs",
                reason: "must be positive".into(),
            });
        }
        if self.decryption.max_balance == 0 {
            return Err(ConfigError::Invalid {
                key: "decryption.max_balance",
                reason: "must be positive".into(),
            });
        }
        if self.decryption.max_balance > MAX_DLOG_BOUND {
            return Err(ConfigError::Invalid {
                key: "decryption.max_balance",
                reason: format!(
                    "{} exceeds {MAX_DLOG_BOUND}, the largest searchable balance",
                    self.decryption.max_balance
                ),
            });
        }
        Ok(())
    }

    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        check_url("network.rpc_url", &self.network.rpc_url)
    }

    /// Prover base URL, normalised to end in `/` so endpoints join beneath it.
    pub fn prover_url(&self) -> Result<Url, ConfigError> {
        let mut url = check_url("prover.url", &self.prover.url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

fn check_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "empty".into(),
        });
    }
    Url::parse(value.trim()).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
