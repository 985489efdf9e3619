//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("failed to access config file {path}")]
    Io {
        /// Path of the config file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid TOML.
    #[error("config file {path} is not valid TOML")]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// The document could not be serialized back to TOML.
    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),
    /// No home directory is available for the default config path.
    #[error("cannot determine the default config path: $HOME is not set")]
    MissingHome,
}
