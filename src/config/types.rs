//! Configuration type definitions (spec §6 "Configuration").

use serde::Deserialize;

use super::defaults::{
    default_burst, default_linking_enabled, default_max_clients, default_messages_per_second,
    default_ping_interval_seconds, default_send_queue_len, default_timeout_seconds,
};

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub linking: LinkingConfig,
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
}

/// `[server]` — identity, listen address, and session timing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Announced server name, e.g. `irc.example.com`.
    pub name: String,
    /// This server's 3-character SID (spec §4.B), used for UID generation
    /// whether or not linking is enabled.
    pub sid: String,
    /// Plain-text address to accept client connections on. TLS termination
    /// and any upgrade path are an external concern this core does not own.
    pub listen: String,
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_ping_interval_seconds")]
    pub ping_interval_seconds: u64,
    #[serde(default = "default_send_queue_len")]
    pub send_queue_len: usize,
}

/// `[rate_limit]` — the per-session flood-control token bucket (spec §4.C).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_messages_per_second")]
    pub messages_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            messages_per_second: default_messages_per_second(),
            burst: default_burst(),
        }
    }
}

/// `[linking]` — server-to-server participation (spec §4.H).
#[derive(Debug, Clone, Deserialize)]
pub struct LinkingConfig {
    #[serde(default = "default_linking_enabled")]
    pub enabled: bool,
    /// This server's own SID as presented during handshake. Falls back to
    /// `server.sid` when absent; kept distinct to allow a link-specific
    /// identity override.
    pub sid: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sid: None,
            password: None,
            description: String::new(),
            peers: Vec::new(),
        }
    }
}

/// One entry of `linking.peers` — a known or expected remote server.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    pub name: String,
    pub sid: String,
    pub host: String,
    pub port: u16,
    pub password: String,
    #[serde(default)]
    pub auto_connect: bool,
    #[serde(default)]
    pub is_hub: bool,
}

/// One entry of `operators` — a server-operator credential (spec §4.L).
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    pub name: String,
    /// Argon2 PHC string, verified by [`crate::security::password`].
    pub hashed_password: String,
}
