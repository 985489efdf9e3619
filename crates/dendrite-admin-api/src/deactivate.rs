//! Three-step deactivation handshake.
//!
//! Dendrite exposes no direct "deactivate by admin" endpoint, so the
//! client orchestrates: reset the password to a throwaway value, log in
//! as the user with it, then drive the interactive-auth deactivation
//! dance (expect 401 challenge, echo the session back with password
//! auth). Partial completion leaves the account with a reset password;
//! error messages name the step that failed so the operator knows.

use rand::Rng;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::client::{AdminClient, PASSWORD_STAGE, ensure_success};
use crate::error::{Error, Result};
use crate::models::UiaChallenge;

/// 256 bits of entropy, hex-encoded: 64 characters, comfortably under the
/// 72-byte password limit.
fn throwaway_password() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

impl AdminClient {
    /// Deactivate a local user, erasing their account data.
    ///
    /// Three round trips, each attempted only if the prior succeeded:
    /// password reset, login, interactive-auth deactivation. Not safe to
    /// run concurrently for the same user; independent users are
    /// independent.
    ///
    /// # Errors
    ///
    /// [`Error::Operation`] when the password reset postcondition fails,
    /// [`Error::Protocol`] when the deactivation challenge is not a 401,
    /// [`Error::UnsupportedFlow`] when no flow starts with a password
    /// stage, plus the usual remote contract for each round trip.
    pub async fn deactivate(&self, user_id: &str) -> Result<()> {
        info!(user_id, "deactivating user (step 1): resetting password");
        let password = throwaway_password();
        let reset = self.reset_password(user_id, &password, false).await?;
        if !reset.password_updated {
            return Err(Error::Operation(format!(
                "deactivation step 1 failed: server did not confirm the password reset for {user_id}"
            )));
        }

        info!(user_id, "deactivating user (step 2): logging in");
        let session = self.login(user_id, &password).await?;
        debug!(user_id, "obtained short-lived access token");

        info!(user_id, "deactivating user (step 3): interactive-auth deactivation");
        let url = self.endpoint(&["_matrix", "client", "v3", "account", "deactivate"])?;

        let challenge_response = self
            .http()
            .post(url.clone())
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if challenge_response.status() != StatusCode::UNAUTHORIZED {
            return Err(Error::Protocol(format!(
                "deactivation step 3 failed: expected a 401 interactive-auth challenge, got {}",
                challenge_response.status()
            )));
        }
        let challenge: UiaChallenge = challenge_response.json().await.map_err(|err| {
            Error::Protocol(format!("interactive-auth challenge is not valid JSON: {err}"))
        })?;
        if challenge.flow_starting_with(PASSWORD_STAGE).is_none() {
            return Err(Error::UnsupportedFlow);
        }

        let body = serde_json::json!({
            "auth": {
                "type": PASSWORD_STAGE,
                "identifier": { "type": "m.id.user", "user": user_id },
                "password": password,
                "session": challenge.session,
                "user": user_id,
            },
            "erase": true,
        });
        let response = self
            .http()
            .post(url)
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?;
        ensure_success(user_id, response).await?;
        info!(user_id, "done deactivating user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    const DEACTIVATE_PATH: &str = "/_matrix/client/v3/account/deactivate";

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::builder(server.base_url().parse().expect("valid URL"), "syt_admin")
            .build()
            .expect("client builds")
    }

    #[test]
    fn throwaway_password_is_64_hex_chars() {
        let password = throwaway_password();
        assert_eq!(password.len(), 64);
        assert!(password.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(password, throwaway_password());
    }

    #[tokio::test]
    async fn deactivate_walks_the_three_step_sequence() {
        let server = MockServer::start_async().await;

        let reset = server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@victim:example.test")
                .header("authorization", "Bearer syt_admin");
            then.status(200).json_body(json!({"password_updated": true}));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/_matrix/client/v3/login");
            then.status(200).json_body(json!({
                "access_token": "syt_victim",
                "device_id": "DEV",
            }));
        });
        // The unauthenticated-UIA probe carries no body; the follow-up
        // echoes the session back with password auth.
        let challenge = server.mock(|when, then| {
            when.method(POST)
                .path(DEACTIVATE_PATH)
                .header("authorization", "Bearer syt_victim")
                .body("");
            then.status(401).json_body(json!({
                "session": "uia-session",
                "flows": [{"stages": ["m.login.password"]}],
            }));
        });
        let finish = server.mock(|when, then| {
            when.method(POST)
                .path(DEACTIVATE_PATH)
                .header("authorization", "Bearer syt_victim")
                .body_contains(r#""session":"uia-session""#)
                .body_contains(r#""erase":true"#);
            then.status(200).json_body(json!({"id_server_unbind_result": "success"}));
        });

        client_for(&server)
            .deactivate("@victim:example.test")
            .await
            .expect("deactivation succeeds");

        reset.assert();
        login.assert();
        challenge.assert();
        finish.assert();
    }

    #[tokio::test]
    async fn deactivate_aborts_when_password_not_updated() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@victim:example.test");
            then.status(200).json_body(json!({"password_updated": false}));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/_matrix/client/v3/login");
            then.status(200).json_body(json!({"access_token": "syt_victim"}));
        });

        let err = client_for(&server)
            .deactivate("@victim:example.test")
            .await
            .expect_err("unconfirmed reset should abort");
        assert!(matches!(err, Error::Operation(message) if message.contains("step 1")));
        assert_eq!(login.hits(), 0);
    }

    #[tokio::test]
    async fn deactivate_rejects_non_401_challenge() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@victim:example.test");
            then.status(200).json_body(json!({"password_updated": true}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/_matrix/client/v3/login");
            then.status(200).json_body(json!({"access_token": "syt_victim"}));
        });
        server.mock(|when, then| {
            when.method(POST).path(DEACTIVATE_PATH);
            then.status(200).json_body(json!({}));
        });

        let err = client_for(&server)
            .deactivate("@victim:example.test")
            .await
            .expect_err("non-401 challenge violates the protocol");
        assert!(matches!(err, Error::Protocol(message) if message.contains("401")));
    }

    #[tokio::test]
    async fn deactivate_requires_a_password_flow() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@victim:example.test");
            then.status(200).json_body(json!({"password_updated": true}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/_matrix/client/v3/login");
            then.status(200).json_body(json!({"access_token": "syt_victim"}));
        });
        server.mock(|when, then| {
            when.method(POST).path(DEACTIVATE_PATH);
            then.status(401).json_body(json!({
                "session": "uia-session",
                "flows": [{"stages": ["m.login.sso"]}],
            }));
        });

        let err = client_for(&server)
            .deactivate("@victim:example.test")
            .await
            .expect_err("sso-only flows are unsupported");
        assert!(matches!(err, Error::UnsupportedFlow));
    }
}
