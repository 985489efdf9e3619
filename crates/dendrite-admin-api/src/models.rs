//! Wire models for admin API requests and responses.

use serde::{Deserialize, Serialize};

/// Result of evacuating a room or a user.
///
/// For rooms, `affected` holds the user IDs that were parted; for users,
/// the room IDs they were removed from. A second evacuation of the same
/// target yields an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvacuationReport {
    /// Identifiers affected by the evacuation.
    pub affected: Vec<String>,
}

/// Result of an admin password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    /// Whether the server actually updated the password.
    pub password_updated: bool,
}

/// Response to a successful shared-secret registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// Access token for the freshly created account.
    pub access_token: String,
    /// Fully qualified user ID.
    pub user_id: String,
    /// Server name the account was created on.
    #[serde(default)]
    pub home_server: Option<String>,
    /// Device created alongside the account.
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Response to a password login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
    /// Short-lived access token scoped to the logged-in user.
    pub access_token: String,
    /// Device the login created, when reported.
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Result of sending a server notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerNotice {
    /// Event ID of the delivered notice.
    pub event_id: String,
}

/// Interactive-auth challenge body returned with HTTP 401.
///
/// The session identifier must be echoed back verbatim in the follow-up
/// request.
#[derive(Debug, Clone, Deserialize)]
pub struct UiaChallenge {
    /// Server-issued session identifier for this auth attempt.
    pub session: String,
    /// Ordered list of acceptable authentication flows.
    #[serde(default)]
    pub flows: Vec<UiaFlow>,
}

/// One interactive-auth flow: an ordered list of stage identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct UiaFlow {
    /// Stage identifiers, e.g. `m.login.password`.
    #[serde(default)]
    pub stages: Vec<String>,
}

impl UiaChallenge {
    /// First flow whose leading stage matches `stage`, if any.
    #[must_use]
    pub fn flow_starting_with(&self, stage: &str) -> Option<&UiaFlow> {
        self.flows
            .iter()
            .find(|flow| flow.stages.first().is_some_and(|first| first == stage))
    }
}

/// Nonce envelope returned by the shared-secret registration endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NonceEnvelope {
    pub(crate) nonce: String,
}
