// File:    config.rs
// Author:  apezoo
// Date:    2025-08-05
//
// Description: Daemon configuration, loaded from an optional JSON file and overridden from the command line.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use otpnet_core::{Direction, Origin};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::MAX_CONCURRENT;

/// Default limit on `textLength + keyLength` accepted by a worker.
pub const DEFAULT_MAX_PAYLOAD: u64 = 1024 * 1024;

/// Which direction a daemon serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Accepts encode clients and encodes.
    #[value(alias = "enc")]
    Encode,
    /// Accepts decode clients and decodes.
    #[value(alias = "dec")]
    Decode,
}

impl Role {
    /// The transform this daemon applies.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Encode => Direction::Encode,
            Self::Decode => Direction::Decode,
        }
    }

    /// The only origin tag this daemon serves.
    #[must_use]
    pub const fn accepted_origin(self) -> Origin {
        Origin::for_direction(self.direction())
    }

    /// The fixed response sent to a client of the other direction.
    #[must_use]
    pub const fn mismatch_diagnostic(self) -> &'static [u8] {
        match self {
            Self::Encode => b"ERROR: connection not from an encode client.",
            Self::Decode => b"ERROR: connection not from a decode client.",
        }
    }
}

/// Errors raised while building a [`DaemonConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`DaemonConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the dispatcher and its workers need to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind; `0` picks a free port.
    pub port: u16,
    /// Direction served.
    pub role: Role,
    /// Maximum number of concurrently running workers.
    pub max_workers: usize,
    /// Largest `textLength + keyLength` a worker will read.
    pub max_payload: u64,
    /// Optional deadline for one whole exchange, in seconds.
    pub io_timeout_secs: Option<u64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            role: Role::Encode,
            max_workers: MAX_CONCURRENT,
            max_payload: DEFAULT_MAX_PAYLOAD,
            io_timeout_secs: None,
        }
    }
}

impl DaemonConfig {
    /// Loads a configuration from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&config_str)?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.io_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "io_timeout_secs must be at least 1 when set".to_string(),
            ));
        }
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        Ok(())
    }

    /// The per-exchange deadline, if any.
    #[must_use]
    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_secs.map(Duration::from_secs)
    }
}
