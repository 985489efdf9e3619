//! Shared error types, application context, and prompt helpers.

use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, Write};
use std::sync::LazyLock;

use anyhow::anyhow;
use dendrite_admin_api::AdminClient;
use rand::Rng;
use regex::Regex;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational
/// failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<dendrite_admin_api::Error> for CliError {
    fn from(error: dendrite_admin_api::Error) -> Self {
        use dendrite_admin_api::Error;
        match &error {
            Error::PasswordTooLong { .. } | Error::Validation(_) => {
                Self::Validation(error.to_string())
            }
            _ => Self::Failure(error.into()),
        }
    }
}

impl From<dendrite_admin_config::ConfigError> for CliError {
    fn from(error: dendrite_admin_config::ConfigError) -> Self {
        Self::Failure(error.into())
    }
}

impl From<dendrite_admin_data::DataError> for CliError {
    fn from(error: dendrite_admin_data::DataError) -> Self {
        use dendrite_admin_data::DataError;
        match &error {
            DataError::InvalidUri { .. } | DataError::MissingDatabaseFile { .. } => {
                Self::Validation(error.to_string())
            }
            DataError::QueryFailed { .. } => Self::Failure(error.into()),
        }
    }
}

/// Context passed to command handlers that talk to the homeserver.
pub(crate) struct AppContext {
    pub(crate) admin: AdminClient,
    pub(crate) output: OutputFormat,
    pub(crate) assume_yes: bool,
}

/// Shape check applied to user IDs before anything destructive is sent.
static USER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[a-z0-9._=/+-]+:[A-Za-z0-9.-]+(?::\d{1,5})?$").expect("pattern compiles")
});

pub(crate) fn ensure_user_id(user_id: &str) -> CliResult<()> {
    if USER_ID_PATTERN.is_match(user_id) {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "'{user_id}' does not look like a Matrix user ID (@localpart:server)"
        )))
    }
}

pub(crate) fn ensure_room_id(room_id: &str) -> CliResult<()> {
    if room_id.starts_with('!') && room_id.contains(':') {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "'{room_id}' does not look like a Matrix room ID (!opaque:server)"
        )))
    }
}

/// Ask the user to confirm. Skipped entirely under `--yes`.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N]: ");
    io::stdout()
        .flush()
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Prompt for a secret without echoing it.
pub(crate) fn prompt_hidden(label: &str) -> CliResult<String> {
    rpassword::prompt_password(format!("{label}: "))
        .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))
}

/// Prompt for a plain line of input, trimmed.
pub(crate) fn prompt_line(label: &str) -> CliResult<String> {
    print!("{label}: ");
    io::stdout()
        .flush()
        .map_err(|err| CliError::failure(anyhow!("failed to write prompt: {err}")))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
    Ok(line.trim().to_string())
}

/// 32 random bytes, hex-encoded: 64 characters, safely under the 72-byte
/// password limit.
#[must_use]
pub(crate) fn random_password() -> String {
    hex::encode(rand::rng().random::<[u8; 32]>())
}
