//! Two-phase shared-secret registration handshake.
//!
//! Phase one fetches a single-use nonce; phase two proves knowledge of the
//! server-side shared secret with an HMAC-SHA1 over a canonical byte
//! sequence and submits the new account. A stale or reused nonce is
//! rejected by the server; the caller must fetch a fresh one.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::info;

use crate::client::{AdminClient, ensure_success};
use crate::error::Result;
use crate::models::{NonceEnvelope, RegisteredUser};

type HmacSha1 = Hmac<Sha1>;

/// Parameters for the registration submission.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Single-use nonce from [`AdminClient::register_nonce`].
    pub nonce: String,
    /// Shared secret configured on the server.
    pub shared_secret: String,
    /// Localpart of the account to create.
    pub username: String,
    /// Initial password for the account.
    pub password: String,
    /// Display name; defaults to the username when absent.
    pub displayname: Option<String>,
    /// Whether to grant the new account server admin rights.
    pub admin: bool,
}

/// Canonical HMAC message: `nonce 0x00 username 0x00 password 0x00
/// ("admin" | "notadmin")`.
///
/// Servers validate the literal byte sequence, NUL separators included;
/// the ordering here is load-bearing.
fn mac_message(nonce: &str, username: &str, password: &str, admin: bool) -> Vec<u8> {
    let admin_flag: &[u8] = if admin { b"admin" } else { b"notadmin" };
    let mut message =
        Vec::with_capacity(nonce.len() + username.len() + password.len() + admin_flag.len() + 3);
    message.extend_from_slice(nonce.as_bytes());
    message.push(0x00);
    message.extend_from_slice(username.as_bytes());
    message.push(0x00);
    message.extend_from_slice(password.as_bytes());
    message.push(0x00);
    message.extend_from_slice(admin_flag);
    message
}

/// Hex-encoded HMAC-SHA1 of `message` keyed with `key`.
fn mac_hex(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Compute the registration MAC for the given request fields.
#[must_use]
pub fn registration_mac(
    shared_secret: &str,
    nonce: &str,
    username: &str,
    password: &str,
    admin: bool,
) -> String {
    mac_hex(
        shared_secret.as_bytes(),
        &mac_message(nonce, username, password, admin),
    )
}

impl AdminClient {
    /// Fetch a single-use nonce for shared-secret registration. No
    /// authentication is required for this step.
    ///
    /// # Errors
    ///
    /// The usual remote contract.
    pub async fn register_nonce(&self) -> Result<String> {
        info!("requesting registration nonce");
        let url = self.endpoint(&["_synapse", "admin", "v1", "register"])?;
        let response = self.http().get(url).send().await?;
        let response = ensure_success("registration nonce", response).await?;
        let envelope: NonceEnvelope = response.json().await?;
        Ok(envelope.nonce)
    }

    /// Submit a shared-secret registration for a consumed nonce.
    ///
    /// # Errors
    ///
    /// [`crate::Error::PasswordTooLong`] locally when the password exceeds
    /// 72 UTF-8 bytes and the override is not set. A wrong shared secret
    /// or a stale/reused nonce surfaces as a 4xx
    /// [`crate::Error::Remote`]; the caller must fetch a fresh nonce, the
    /// client does not retry.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<RegisteredUser> {
        self.check_password_length(&request.password)?;

        let mac = registration_mac(
            &request.shared_secret,
            &request.nonce,
            &request.username,
            &request.password,
            request.admin,
        );
        let displayname = request
            .displayname
            .as_deref()
            .unwrap_or(&request.username);

        info!(username = %request.username, "registering user");
        let body = serde_json::json!({
            "nonce": request.nonce,
            "username": request.username,
            "displayname": displayname,
            "password": request.password,
            "admin": if request.admin { "admin" } else { "notadmin" },
            "mac": mac,
        });
        let url = self.endpoint(&["_synapse", "admin", "v1", "register"])?;
        let response = self.http().post(url).json(&body).send().await?;
        let response = ensure_success(&request.username, response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn mac_message_uses_nul_separators_in_canonical_order() {
        assert_eq!(
            mac_message("thenonce", "alice", "hunter2", false),
            b"thenonce\x00alice\x00hunter2\x00notadmin"
        );
        assert_eq!(
            mac_message("thenonce", "alice", "hunter2", true),
            b"thenonce\x00alice\x00hunter2\x00admin"
        );
    }

    #[test]
    fn mac_hex_matches_rfc_2202_vector() {
        // RFC 2202 test case 2 for HMAC-SHA1.
        assert_eq!(
            mac_hex(b"Jefe", b"what do ya do for a nonce?"),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn changing_any_component_changes_the_mac() {
        let base = registration_mac("secret", "nonce", "alice", "hunter2", false);
        assert_ne!(base, registration_mac("secret", "nonce", "alice", "hunter2", true));
        assert_ne!(base, registration_mac("secret", "nonce", "alicia", "hunter2", false));
        assert_ne!(base, registration_mac("wrong", "nonce", "alice", "hunter2", false));
    }

    #[tokio::test]
    async fn register_nonce_issues_get_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/_synapse/admin/v1/register");
            then.status(200).json_body(json!({"nonce": "abc123"}));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .build()
        .expect("client builds");

        let nonce = client.register_nonce().await.expect("nonce fetched");
        assert_eq!(nonce, "abc123");
        mock.assert();
    }

    #[tokio::test]
    async fn register_submits_canonical_payload() {
        let server = MockServer::start_async().await;
        let mac = registration_mac("s3cret", "abc123", "alice", "hunter2", true);
        let mock = server.mock(move |when, then| {
            when.method(POST)
                .path("/_synapse/admin/v1/register")
                .json_body(json!({
                    "nonce": "abc123",
                    "username": "alice",
                    "displayname": "Alice",
                    "password": "hunter2",
                    "admin": "admin",
                    "mac": mac,
                }));
            then.status(200).json_body(json!({
                "access_token": "syt_alice",
                "user_id": "@alice:example.test",
                "home_server": "example.test",
                "device_id": "DEV",
            }));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .build()
        .expect("client builds");

        let registered = client
            .register(&RegistrationRequest {
                nonce: "abc123".to_string(),
                shared_secret: "s3cret".to_string(),
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                displayname: Some("Alice".to_string()),
                admin: true,
            })
            .await
            .expect("registration succeeds");
        assert_eq!(registered.user_id, "@alice:example.test");
        mock.assert();
    }

    #[tokio::test]
    async fn register_rejects_long_password_locally() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/_synapse/admin/v1/register");
            then.status(200).json_body(json!({}));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .build()
        .expect("client builds");

        let err = client
            .register(&RegistrationRequest {
                nonce: "abc123".to_string(),
                shared_secret: "s3cret".to_string(),
                username: "alice".to_string(),
                password: "x".repeat(80),
                displayname: None,
                admin: false,
            })
            .await
            .expect_err("long password should fail locally");
        assert!(matches!(err, Error::PasswordTooLong { bytes: 80 }));
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn reused_nonce_surfaces_server_rejection() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/_synapse/admin/v1/register");
            then.status(400)
                .json_body(json!({"errcode": "M_UNKNOWN", "error": "unknown nonce"}));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .build()
        .expect("client builds");

        let err = client
            .register(&RegistrationRequest {
                nonce: "stale".to_string(),
                shared_secret: "s3cret".to_string(),
                username: "alice".to_string(),
                password: "hunter2".to_string(),
                displayname: None,
                admin: false,
            })
            .await
            .expect_err("stale nonce should fail");
        assert!(matches!(err, Error::Remote { status, .. } if status.as_u16() == 400));
    }
}
