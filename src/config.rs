// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into an
//! [`AppConfig`], which is then passed to every component.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `VERIFREE_API_KEY` | Key expected in `x-api-key` on control endpoints | Required for control calls |
//! | `DB_API_URL` | Document store Data API base URL | In-memory store when unset |
//! | `DB_API_KEY` | Data API key | Required with `DB_API_URL` |
//! | `DB_DATA_SOURCE` | Data API data source (cluster) | Required with `DB_API_URL` |
//! | `DB_DATABASE` | Database name | Required with `DB_API_URL` |
//! | `DB_ALLOW_LIST_COLLECTION` | Allowlist collection | `allowlist` |
//! | `DB_ALLOWED_DOMAINS_COLLECTION` | Email domain collection | `alloweddomains` |
//! | `DB_SUBNET_MESSAGES_COLLECTION` | Relay ledger collection; needs a unique index on `message` | `subnetmessages` |
//! | `HTTP_TIMEOUT_SECS` | Timeout for store and RPC calls | `8` |
//! | `VERIFREE_SLEEP_TIME_MS` | Maximum allowlist jitter delay | `5000` |
//! | `SUBNET_RPC_URL` | Subnet JSON-RPC endpoint | Relay disabled when unset |
//! | `SUBNET_CHAIN_ID` | Subnet chain id | Required with `SUBNET_RPC_URL` |
//! | `SUBNET_NAME` | Subnet display name | `VeriFree Subnet` |
//! | `SUBNET_CURRENCY_NAME` | Native currency name | `VeriFree Token` |
//! | `SUBNET_CURRENCY_SYMBOL` | Native currency symbol | `VFT` |
//! | `SUBNET_CURRENCY_DECIMALS` | Native currency decimals | `18` |
//! | `SUBNET_PRIVATE_KEY` | Relay signer key (hex or PEM) | Required with `SUBNET_RPC_URL` |
//! | `SUBNET_CONTROL_ADDRESS` | Subnet control contract | Required with `SUBNET_RPC_URL` |
//! | `ORIGIN_CHAIN_ID` | Origin chain id (bytes32 hex or short string) | Required with `SUBNET_RPC_URL` |
//! | `ORIGIN_SENDER_ADDRESS` | Origin contract address | Required with `SUBNET_RPC_URL` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use crate::blockchain::{ChainConfig, NativeCurrency};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const API_KEY_ENV: &str = "VERIFREE_API_KEY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 8;
const DEFAULT_MAX_JITTER_MS: u64 = 5000;

const DEFAULT_ALLOW_LIST_COLLECTION: &str = "allowlist";
const DEFAULT_DOMAINS_COLLECTION: &str = "alloweddomains";
const DEFAULT_MESSAGES_COLLECTION: &str = "subnetmessages";

const DEFAULT_SUBNET_NAME: &str = "VeriFree Subnet";
const DEFAULT_CURRENCY_NAME: &str = "VeriFree Token";
const DEFAULT_CURRENCY_SYMBOL: &str = "VFT";
const DEFAULT_CURRENCY_DECIMALS: u8 = 18;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Collection names, one per record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub allow_list: String,
    pub domains: String,
    pub messages: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            allow_list: DEFAULT_ALLOW_LIST_COLLECTION.to_string(),
            domains: DEFAULT_DOMAINS_COLLECTION.to_string(),
            messages: DEFAULT_MESSAGES_COLLECTION.to_string(),
        }
    }
}

/// Location and credentials of the hosted Data API.
#[derive(Clone, PartialEq, Eq)]
pub struct DataApiConfig {
    pub url: String,
    pub api_key: String,
    pub data_source: String,
    pub database: String,
}

impl std::fmt::Debug for DataApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataApiConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("data_source", &self.data_source)
            .field("database", &self.database)
            .finish()
    }
}

/// Everything the relay dispatcher needs to reach the subnet.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub chain: ChainConfig,
    pub private_key: String,
    pub subnet_control_address: String,
    pub origin_chain_id: String,
    pub origin_sender_address: String,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("chain", &self.chain)
            .field("private_key", &"<redacted>")
            .field("subnet_control_address", &self.subnet_control_address)
            .field("origin_chain_id", &self.origin_chain_id)
            .field("origin_sender_address", &self.origin_sender_address)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` rejects every control call (the key is not configured).
    pub api_key: Option<String>,
    /// `None` selects the in-memory store.
    pub store: Option<DataApiConfig>,
    pub collections: Collections,
    pub http_timeout: Duration,
    pub max_jitter: Duration,
    /// `None` disables the relay endpoint.
    pub relay: Option<RelayConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            store: None,
            collections: Collections::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
            relay: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let store = match env.optional("DB_API_URL") {
            Some(url) => Some(DataApiConfig {
                url,
                api_key: env.required("DB_API_KEY")?,
                data_source: env.required("DB_DATA_SOURCE")?,
                database: env.required("DB_DATABASE")?,
            }),
            None => None,
        };

        let relay = match env.optional("SUBNET_RPC_URL") {
            Some(rpc_url) => Some(RelayConfig {
                chain: ChainConfig {
                    name: env.or_default("SUBNET_NAME", DEFAULT_SUBNET_NAME),
                    chain_id: env.parsed_required("SUBNET_CHAIN_ID")?,
                    rpc_url,
                    currency: NativeCurrency {
                        name: env.or_default("SUBNET_CURRENCY_NAME", DEFAULT_CURRENCY_NAME),
                        symbol: env.or_default("SUBNET_CURRENCY_SYMBOL", DEFAULT_CURRENCY_SYMBOL),
                        decimals: env
                            .parsed("SUBNET_CURRENCY_DECIMALS")?
                            .unwrap_or(DEFAULT_CURRENCY_DECIMALS),
                    },
                },
                private_key: env.required("SUBNET_PRIVATE_KEY")?.replace("\\n", "\n"),
                subnet_control_address: env.required("SUBNET_CONTROL_ADDRESS")?,
                origin_chain_id: env.required("ORIGIN_CHAIN_ID")?,
                origin_sender_address: env.required("ORIGIN_SENDER_ADDRESS")?,
            }),
            None => None,
        };

        Ok(Self {
            host: env.or_default(HOST_ENV, DEFAULT_HOST),
            port: env.parsed(PORT_ENV)?.unwrap_or(DEFAULT_PORT),
            api_key: env.optional(API_KEY_ENV),
            store,
            collections: Collections {
                allow_list: env.or_default("DB_ALLOW_LIST_COLLECTION", DEFAULT_ALLOW_LIST_COLLECTION),
                domains: env.or_default("DB_ALLOWED_DOMAINS_COLLECTION", DEFAULT_DOMAINS_COLLECTION),
                messages: env.or_default("DB_SUBNET_MESSAGES_COLLECTION", DEFAULT_MESSAGES_COLLECTION),
            },
            http_timeout: Duration::from_secs(
                env.parsed("HTTP_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            max_jitter: Duration::from_millis(
                env.parsed("VERIFREE_SLEEP_TIME_MS")?
                    .unwrap_or(DEFAULT_MAX_JITTER_MS),
            ),
            relay,
        })
    }
}

/// Trimmed, non-empty variable access.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value.parse::<T>().map_err(|e| ConfigError::Invalid {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn parsed_required<T>(&self, name: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.parsed(name)?
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }
}
