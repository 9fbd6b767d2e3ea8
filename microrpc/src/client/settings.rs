//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Client settings loaded from TOML.
//!
//! ```toml
//! address = "10.0.0.5:9000"
//! content_type = "application/postcard"
//! retries = 2
//! request_timeout_ms = 1500
//!
//! [pool]
//! initial = 2
//! capacity = 8
//! ttl_ms = 30000
//! ```
//!
//! Every key is optional and falls back to the library default.

use crate::client::{CallOptions, ClientOptions};
use crate::pool::PoolConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod defaults {
    use crate::client::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRIES};
    use crate::codec::CONTENT_TYPE_JSON;
    use crate::pool::{
        DEFAULT_DIAL_TIMEOUT, DEFAULT_POOL_CAPACITY, DEFAULT_POOL_TTL,
    };

    pub fn content_type() -> String { CONTENT_TYPE_JSON.to_string() }
    pub fn retries() -> u32 { DEFAULT_RETRIES }
    pub fn request_timeout_ms() -> u64 { DEFAULT_REQUEST_TIMEOUT.as_millis() as u64 }
    pub fn dial_timeout_ms() -> u64 { DEFAULT_DIAL_TIMEOUT.as_millis() as u64 }

    pub fn pool_capacity() -> usize { DEFAULT_POOL_CAPACITY }
    pub fn pool_ttl_ms() -> u64 { DEFAULT_POOL_TTL.as_millis() as u64 }
}

/// Errors loading [`ClientSettings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Pool section of [`ClientSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Defaults to the library default, lowered to `capacity`.
    #[serde(default)]
    pub initial: Option<usize>,
    #[serde(default = "defaults::pool_capacity")]
    pub capacity: usize,
    #[serde(default = "defaults::pool_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            initial: None,
            capacity: defaults::pool_capacity(),
            ttl_ms: defaults::pool_ttl_ms(),
        }
    }
}

/// Serializable subset of [`ClientOptions`].
///
/// Codecs, wrappers, the broker and the resolver are code, not settings;
/// attach them to the options returned by [`ClientSettings::into_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub address: String,
    #[serde(default = "defaults::content_type")]
    pub content_type: String,
    #[serde(default = "defaults::retries")]
    pub retries: u32,
    #[serde(default = "defaults::request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "defaults::dial_timeout_ms")]
    pub dial_timeout_ms: u64,
    #[serde(default)]
    pub pool: PoolSettings,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            address: String::new(),
            content_type: defaults::content_type(),
            retries: defaults::retries(),
            request_timeout_ms: defaults::request_timeout_ms(),
            dial_timeout_ms: defaults::dial_timeout_ms(),
            pool: PoolSettings::default(),
        }
    }
}

impl ClientSettings {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_type.is_empty() {
            return Err(ConfigError::Invalid {
                key: "content_type",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        self.pool_config()
            .validate()
            .map_err(|reason| ConfigError::Invalid { key: "pool", reason })
    }

    fn pool_config(&self) -> PoolConfig {
        let config = PoolConfig::default()
            .with_capacity(self.pool.capacity)
            .with_ttl(Duration::from_millis(self.pool.ttl_ms))
            .with_dial_timeout(Duration::from_millis(self.dial_timeout_ms));
        match self.pool.initial {
            Some(initial) => config.with_initial(initial),
            None => config,
        }
    }

    /// Converts the settings into client options with default codecs,
    /// broker and no wrappers.
    pub fn into_options(self) -> ClientOptions {
        let call_options = CallOptions::default()
            .with_retries(self.retries)
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_dial_timeout(Duration::from_millis(self.dial_timeout_ms));
        let pool = self.pool_config();
        ClientOptions::default()
            .with_address(self.address)
            .with_content_type(self.content_type)
            .with_pool(pool)
            .with_call_options(call_options)
    }
}
