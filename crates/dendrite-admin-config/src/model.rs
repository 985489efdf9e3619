//! The typed configuration document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Persisted configuration document.
///
/// Recognized keys are typed below; anything else found in the file is
/// preserved verbatim across the read-fully/write-fully cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Admin access token used for bearer authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Homeserver base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Database URI for the directory listing commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_uri: Option<String>,
    /// Proxy URL routed through for every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxies: Option<String>,
    /// Admin endpoint dialect (`stable` or `legacy`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
    /// HTTP timeouts, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutSettings>,
    /// Extra headers sent with every request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Disable the local 72-byte password length check.
    #[serde(
        default,
        rename = "override-password-length-check",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub override_password_length_check: bool,
    /// Unrecognized keys, preserved as-is.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// HTTP timeouts in seconds, mirroring the client defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Connection establishment deadline.
    #[serde(default = "default_connect")]
    pub connect: u64,
    /// Per-read deadline; admin operations can be slow to acknowledge.
    #[serde(default = "default_read")]
    pub read: u64,
    /// Per-write deadline.
    #[serde(default = "default_write")]
    pub write: u64,
    /// Idle pooled connection lifetime.
    #[serde(default = "default_pool")]
    pub pool: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect: default_connect(),
            read: default_read(),
            write: default_write(),
            pool: default_pool(),
        }
    }
}

const fn default_connect() -> u64 {
    10
}

const fn default_read() -> u64 {
    180
}

const fn default_write() -> u64 {
    60
}

const fn default_pool() -> u64 {
    10
}
