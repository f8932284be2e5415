//! Runtime configuration loaded from environment variables.
//!
//! | Variable              | Default | Meaning                                             |
//! |-----------------------|---------|-----------------------------------------------------|
//! | `ASSETLAYER_URL_BASE` | unset   | User-facing base URL the REST base URI derives from |
//! | `ASSETLAYER_ID_START` | `0`     | Identifier counter start; first id is `start + 1`   |
//! | `ASSETLAYER_LOG`      | `info`  | Tracing filter used when `RUST_LOG` is not set      |

use std::env;

use thiserror::Error;

pub const URL_BASE_VAR: &str = "ASSETLAYER_URL_BASE";
pub const ID_START_VAR: &str = "ASSETLAYER_ID_START";
pub const LOG_VAR: &str = "ASSETLAYER_LOG";

const DEFAULT_LOG_FILTER: &str = "info";
const REST_PATH: &str = "ma/v1/";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {name}: {value:?}")]
    InvalidValue { name: String, value: String },
}

/// Runtime configuration for an asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL under which users reach the server, if it differs from the request URL.
    pub url_base: Option<String>,
    /// Value the identifier counter starts from.
    pub id_start: u64,
    /// Default tracing filter directive.
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url_base: None,
            id_start: 0,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads an optional `.env` file, then loads configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self::from_env()?;

        tracing::debug!(
            url_base = ?config.url_base,
            id_start = config.id_start,
            log_filter = %config.log_filter,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Loads configuration from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let load = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            url_base: load(URL_BASE_VAR),
            id_start: load(ID_START_VAR)
                .map(|value| {
                    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        name: ID_START_VAR.to_string(),
                        value,
                    })
                })
                .transpose()?
                .unwrap_or(defaults.id_start),
            log_filter: load(LOG_VAR).unwrap_or(defaults.log_filter),
        })
    }

    /// Base URI of the REST application, derived from the configured URL base.
    ///
    /// `http://example.org/wibble` becomes `http://example.org/wibble/ma/v1/`. Returns `None`
    /// when no URL base is configured and the request URL has to be used instead.
    pub fn rest_base_uri(&self) -> Option<String> {
        self.url_base.as_deref().map(|base| {
            let mut uri = String::from(base);
            if !uri.ends_with('/') {
                uri.push('/');
            }
            uri.push_str(REST_PATH);
            uri
        })
    }
}
