//! Configuration loading (spec §6 "Configuration").

mod defaults;
mod types;
mod validation;

pub use types::{Config, LinkingConfig, OperatorConfig, PeerConfig, RateLimitConfig, ServerConfig};
pub use validation::{validate, ValidationError};

use std::path::Path;
use thiserror::Error;

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load and parse a TOML configuration file. Does not validate; call
    /// [`validate`] separately so the caller can log every error found.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// This server's own SID, preferring `linking.sid` when set.
    pub fn sid(&self) -> &str {
        self.linking.sid.as_deref().unwrap_or(&self.server.sid)
    }
}
