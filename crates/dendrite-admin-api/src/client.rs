//! The admin API client and its single-round-trip operations.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, MAX_PASSWORD_BYTES, Result};
use crate::models::{EvacuationReport, LoginSession, PasswordReset, ServerNotice};

const USER_AGENT: &str = concat!("dendrite-admin/", env!("CARGO_PKG_VERSION"));

/// Device name attached to logins performed by this tool.
pub(crate) const DEVICE_DISPLAY_NAME: &str = "dendrite-admin";

/// The UIA stage identifier this client can satisfy.
pub(crate) const PASSWORD_STAGE: &str = "m.login.password";

/// Timeouts applied to the underlying HTTP client.
///
/// Admin operations such as reindexing can be slow to acknowledge, hence
/// the generous read timeout. The write timeout is recorded for parity
/// with the config file but reqwest exposes no per-write deadline; the
/// read timeout is the effective cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Connection establishment deadline.
    pub connect: Duration,
    /// Per-read deadline.
    pub read: Duration,
    /// Per-write deadline (informational, see above).
    pub write: Duration,
    /// Idle pooled connection lifetime.
    pub pool: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(180),
            write: Duration::from_secs(60),
            pool: Duration::from_secs(10),
        }
    }
}

/// Admin endpoint dialect.
///
/// Dendrite's admin API has two historical payload shapes for the password
/// reset endpoint. The dialect is a configuration concern: it must match
/// the target server version, not be guessed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Current Dendrite releases: `password` field.
    #[default]
    Stable,
    /// Older releases expecting a `new_password` field.
    Legacy,
}

impl Dialect {
    pub(crate) const fn password_field(self) -> &'static str {
        match self {
            Self::Stable => "password",
            Self::Legacy => "new_password",
        }
    }

    /// Canonical configuration value for this dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Legacy => "legacy",
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "legacy" => Ok(Self::Legacy),
            other => Err(Error::Validation(format!(
                "unknown dialect '{other}' (expected 'stable' or 'legacy')"
            ))),
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Builder for [`AdminClient`].
#[derive(Debug, Clone)]
pub struct AdminClientBuilder {
    base_url: Url,
    access_token: String,
    timeouts: Timeouts,
    proxy: Option<String>,
    headers: Vec<(String, String)>,
    dialect: Dialect,
    allow_long_passwords: bool,
}

impl AdminClientBuilder {
    /// Override the default timeouts.
    #[must_use]
    pub const fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Route every request through the given proxy URL.
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a default header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Select the admin endpoint dialect.
    #[must_use]
    pub const fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Disable the local 72-byte password length check.
    #[must_use]
    pub const fn allow_long_passwords(mut self, allow: bool) -> Self {
        self.allow_long_passwords = allow;
        self
    }

    /// Construct the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the access token or an extra
    /// header is not a valid header value, or when the proxy URL is
    /// malformed; [`Error::Transport`] when the HTTP client cannot be
    /// built.
    pub fn build(self) -> Result<AdminClient> {
        let mut default_headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| Error::Validation("access token contains invalid characters".into()))?;
        bearer.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, bearer);

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Validation(format!("invalid header name '{name}'")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Validation(format!("invalid value for header '{name}'")))?;
            default_headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers)
            .connect_timeout(self.timeouts.connect)
            .read_timeout(self.timeouts.read)
            .pool_idle_timeout(self.timeouts.pool);

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(AdminClient {
            http: builder.build()?,
            base_url: self.base_url,
            dialect: self.dialect,
            allow_long_passwords: self.allow_long_passwords,
        })
    }
}

/// Client for the Dendrite admin HTTP API.
///
/// Owns the bearer-token authentication and the base URL; every operation
/// is a single authenticated round trip unless documented otherwise. The
/// client performs no automatic retries.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    dialect: Dialect,
    allow_long_passwords: bool,
}

impl AdminClient {
    /// Start building a client for `base_url` authenticating with
    /// `access_token`.
    #[must_use]
    pub fn builder(base_url: Url, access_token: impl Into<String>) -> AdminClientBuilder {
        AdminClientBuilder {
            base_url,
            access_token: access_token.into(),
            timeouts: Timeouts::default(),
            proxy: None,
            headers: Vec::new(),
            dialect: Dialect::default(),
            allow_long_passwords: false,
        }
    }

    /// Base URL this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Validation(format!("base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn check_password_length(&self, password: &str) -> Result<()> {
        let bytes = password.len();
        if bytes > MAX_PASSWORD_BYTES {
            if self.allow_long_passwords {
                debug!("password length check is disabled");
            } else {
                return Err(Error::PasswordTooLong { bytes });
            }
        }
        Ok(())
    }

    /// Part all local users from `room_id`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the room is unknown, [`Error::Remote`] for
    /// other non-2xx responses, [`Error::Transport`] for transport
    /// failures.
    pub async fn evacuate_room(&self, room_id: &str) -> Result<EvacuationReport> {
        info!(room_id, "evacuating room");
        let url = self.endpoint(&["_dendrite", "admin", "evacuateRoom", room_id])?;
        let response = self.http.post(url).send().await?;
        let response = ensure_success(room_id, response).await?;
        Ok(response.json().await?)
    }

    /// Part `user_id` from every room they are joined to.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::evacuate_room`], keyed on user existence.
    pub async fn evacuate_user(&self, user_id: &str) -> Result<EvacuationReport> {
        info!(user_id, "evacuating user");
        let url = self.endpoint(&["_dendrite", "admin", "evacuateUser", user_id])?;
        let response = self.http.post(url).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Reset the password of a local user.
    ///
    /// # Errors
    ///
    /// [`Error::PasswordTooLong`] locally, before any network call, when
    /// the password exceeds 72 UTF-8 bytes and the override is not set;
    /// otherwise the usual remote contract.
    pub async fn reset_password(
        &self,
        user_id: &str,
        new_password: &str,
        logout_devices: bool,
    ) -> Result<PasswordReset> {
        self.check_password_length(new_password)?;

        info!(user_id, "resetting password");
        let mut body = serde_json::Map::new();
        body.insert(
            self.dialect.password_field().to_string(),
            Value::String(new_password.to_string()),
        );
        body.insert("logout_devices".to_string(), Value::Bool(logout_devices));

        let url = self.endpoint(&["_dendrite", "admin", "resetPassword", user_id])?;
        let response = self.http.post(url).json(&body).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Ask the server to reindex all searchable events.
    ///
    /// Fire and forget: a success response means the request was accepted,
    /// not that indexing completed.
    ///
    /// # Errors
    ///
    /// The usual remote contract.
    pub async fn reindex_events(&self) -> Result<()> {
        info!("requesting full-text reindex");
        let url = self.endpoint(&["_dendrite", "admin", "fulltext", "reindex"])?;
        let response = self.http.post(url).send().await?;
        ensure_success("reindex", response).await?;
        Ok(())
    }

    /// Re-query a federated user's devices, refreshing local device/key
    /// storage.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the user is unknown; otherwise the usual
    /// remote contract.
    pub async fn refresh_devices(&self, user_id: &str) -> Result<Option<Value>> {
        info!(user_id, "refreshing devices");
        let url = self.endpoint(&["_dendrite", "admin", "refreshDevices", user_id])?;
        let response = self.http.post(url).send().await?;
        let response = ensure_success(user_id, response).await?;
        optional_json(response).await
    }

    /// Purge all events in a room. Irreversible on the server side.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the room is unknown; otherwise the usual
    /// remote contract.
    pub async fn purge_room(&self, room_id: &str) -> Result<Option<Value>> {
        info!(room_id, "purging room");
        let url = self.endpoint(&["_dendrite", "admin", "purgeRoom", room_id])?;
        let response = self.http.post(url).send().await?;
        let response = ensure_success(room_id, response).await?;
        optional_json(response).await
    }

    /// Send a server notice to a local user.
    ///
    /// # Errors
    ///
    /// [`Error::Remote`] with status 400 when the server rejects the
    /// payload; the usual remote contract otherwise.
    pub async fn send_server_notice(&self, user_id: &str, content: &Value) -> Result<ServerNotice> {
        info!(user_id, "sending server notice");
        let url = self.endpoint(&["_synapse", "admin", "v1", "send_server_notice"])?;
        let body = serde_json::json!({ "user_id": user_id, "content": content });
        let response = self.http.post(url).json(&body).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Fetch admin-level information about a user (devices, sessions).
    ///
    /// Remote users are looked up via server delegation.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the user is unknown; otherwise the usual
    /// remote contract.
    pub async fn whois(&self, user_id: &str) -> Result<Value> {
        info!(user_id, "fetching whois information");
        let url = self
            .client_api_url(user_id, &["_matrix", "client", "v3", "admin", "whois", user_id])
            .await?;
        let response = self.http.get(url).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Fetch a user's public profile (display name and avatar).
    ///
    /// Less information than [`Self::whois`], but needs no admin
    /// privileges. Remote users are looked up via server delegation.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the user is unknown; otherwise the usual
    /// remote contract.
    pub async fn get_profile(&self, user_id: &str) -> Result<Value> {
        info!(user_id, "fetching profile");
        let url = self
            .client_api_url(user_id, &["_matrix", "client", "v3", "profile", user_id])
            .await?;
        let response = self.http.get(url).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Log in as a local user with a password, obtaining a short-lived
    /// access token scoped to that user.
    ///
    /// # Errors
    ///
    /// The usual remote contract; 403 when the credentials are wrong.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<LoginSession> {
        debug!(user_id, "logging in");
        let url = self.endpoint(&["_matrix", "client", "v3", "login"])?;
        let body = serde_json::json!({
            "type": PASSWORD_STAGE,
            "identifier": { "type": "m.id.user", "user": user_id },
            "password": password,
            "initial_device_display_name": DEVICE_DISPLAY_NAME,
        });
        let response = self.http.post(url).json(&body).send().await?;
        let response = ensure_success(user_id, response).await?;
        Ok(response.json().await?)
    }

    /// Resolve client-server delegation for `domain` per the well-known
    /// discovery rules, returning the validated base URL.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] when the well-known document or the advertised
    /// homeserver is malformed; the usual remote contract for HTTP
    /// failures.
    pub async fn resolve_delegation(&self, domain: &str) -> Result<Url> {
        info!(domain, "resolving delegation");
        let well_known: Url = format!("https://{domain}/.well-known/matrix/client")
            .parse()
            .map_err(|_| Error::Validation(format!("invalid domain '{domain}'")))?;

        let response = self
            .http
            .get(well_known)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            // No delegation in place; the domain serves the API directly.
            return format!("https://{domain}:443")
                .parse()
                .map_err(|_| Error::Validation(format!("invalid domain '{domain}'")));
        }
        let response = ensure_success(domain, response).await?;

        let document: Value = response
            .json()
            .await
            .map_err(|err| Error::Protocol(format!("well-known document is not JSON: {err}")))?;
        let base_url = document
            .pointer("/m.homeserver/base_url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Protocol("well-known document lacks m.homeserver.base_url".into())
            })?
            .trim_end_matches('/');

        let base: Url = base_url
            .parse()
            .map_err(|err| Error::Protocol(format!("invalid base URL in well-known: {err}")))?;
        if base.scheme() != "https" {
            return Err(Error::Protocol(format!(
                "delegated base URL must be HTTPS, got '{}'",
                base.scheme()
            )));
        }
        if base.host_str().is_none() {
            return Err(Error::Protocol("delegated base URL has no host".into()));
        }

        let versions_url: Url = format!("{base_url}/_matrix/client/versions")
            .parse()
            .map_err(|err| Error::Protocol(format!("invalid versions URL: {err}")))?;
        let response = self.http.get(versions_url).send().await?;
        let response = ensure_success(domain, response).await?;
        let versions: Value = response
            .json()
            .await
            .map_err(|err| Error::Protocol(format!("versions response is not JSON: {err}")))?;
        if versions.get("versions").is_none() {
            return Err(Error::Protocol(
                "delegated homeserver did not advertise supported versions".into(),
            ));
        }

        info!(domain, base_url, "resolved delegation");
        Ok(base)
    }

    /// Build a client-API URL for `user_id`, following delegation when the
    /// user's domain differs from the configured server.
    async fn client_api_url(&self, user_id: &str, segments: &[&str]) -> Result<Url> {
        let domain = user_id.split_once(':').map(|(_, domain)| domain);
        match domain {
            Some(domain)
                if !domain.is_empty() && self.base_url.host_str() != Some(domain) =>
            {
                warn!(
                    user_id,
                    domain, "user is not local to this server; contacting their homeserver"
                );
                let mut url = self.resolve_delegation(domain).await?;
                let url_display = url.to_string();
                url.path_segments_mut()
                    .map_err(|()| {
                        Error::Protocol(format!(
                            "delegated base URL '{url_display}' cannot carry a path"
                        ))
                    })?
                    .pop_if_empty()
                    .extend(segments);
                Ok(url)
            }
            _ => self.endpoint(segments),
        }
    }
}

/// Map a non-2xx response to the typed remote error, passing 2xx through.
pub(crate) async fn ensure_success(what: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        Err(Error::NotFound {
            what: what.to_string(),
            body,
        })
    } else {
        Err(Error::Remote { status, body })
    }
}

/// Parse a response body as JSON, treating an empty body or an empty
/// object as no payload.
async fn optional_json(response: Response) -> Result<Option<Value>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(&text)
        .map_err(|err| Error::Protocol(format!("response body is not JSON: {err}")))?;
    if value.as_object().is_some_and(serde_json::Map::is_empty) {
        return Ok(None);
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::builder(server.base_url().parse().expect("valid URL"), "syt_admin")
            .build()
            .expect("client builds")
    }

    #[tokio::test]
    async fn evacuate_room_returns_affected_users() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/evacuateRoom/!room:example.test")
                .header("authorization", "Bearer syt_admin");
            then.status(200)
                .json_body(json!({"affected": ["@a:example.test", "@b:example.test"]}));
        });

        let report = client_for(&server)
            .evacuate_room("!room:example.test")
            .await
            .expect("evacuation succeeds");
        assert_eq!(report.affected.len(), 2);
        mock.assert();
    }

    #[tokio::test]
    async fn evacuate_room_maps_404_to_not_found() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/evacuateRoom/!doesntexist:example.local");
            then.status(404).json_body(json!({"errcode": "M_NOT_FOUND"}));
        });

        let err = client_for(&server)
            .evacuate_room("!doesntexist:example.local")
            .await
            .expect_err("unknown room should fail");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn evacuate_user_returns_affected_rooms() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/evacuateUser/@user:example.test");
            then.status(200)
                .json_body(json!({"affected": ["!room:example.test"]}));
        });

        let report = client_for(&server)
            .evacuate_user("@user:example.test")
            .await
            .expect("evacuation succeeds");
        assert_eq!(report.affected, vec!["!room:example.test"]);
        mock.assert();
    }

    #[tokio::test]
    async fn reset_password_rejects_long_password_without_network() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path_contains("resetPassword");
            then.status(200).json_body(json!({"password_updated": true}));
        });

        let long_password = "x".repeat(73);
        let err = client_for(&server)
            .reset_password("@user:example.test", &long_password, false)
            .await
            .expect_err("long password should fail locally");
        assert!(matches!(err, Error::PasswordTooLong { bytes: 73 }));
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn reset_password_override_allows_long_password() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@user:example.test")
                .json_body(json!({"password": "x".repeat(73), "logout_devices": true}));
            then.status(200).json_body(json!({"password_updated": true}));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .allow_long_passwords(true)
        .build()
        .expect("client builds");

        let result = client
            .reset_password("@user:example.test", &"x".repeat(73), true)
            .await
            .expect("override should proceed");
        assert!(result.password_updated);
        mock.assert();
    }

    #[tokio::test]
    async fn reset_password_legacy_dialect_uses_new_password_field() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/resetPassword/@user:example.test")
                .json_body(json!({"new_password": "hunter2", "logout_devices": false}));
            then.status(200).json_body(json!({"password_updated": true}));
        });

        let client = AdminClient::builder(
            server.base_url().parse().expect("valid URL"),
            "syt_admin",
        )
        .dialect(Dialect::Legacy)
        .build()
        .expect("client builds");

        client
            .reset_password("@user:example.test", "hunter2", false)
            .await
            .expect("reset succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn reindex_events_posts_to_fulltext_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/_dendrite/admin/fulltext/reindex");
            then.status(200).json_body(json!({}));
        });

        client_for(&server)
            .reindex_events()
            .await
            .expect("reindex accepted");
        mock.assert();
    }

    #[tokio::test]
    async fn refresh_devices_treats_empty_object_as_no_payload() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/refreshDevices/@user:example.test");
            then.status(200).json_body(json!({}));
        });

        let payload = client_for(&server)
            .refresh_devices("@user:example.test")
            .await
            .expect("refresh succeeds");
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn purge_room_maps_404_to_not_found() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST)
                .path("/_dendrite/admin/purgeRoom/!doesntexist:example.local");
            then.status(404).body("room does not exist");
        });

        let err = client_for(&server)
            .purge_room("!doesntexist:example.local")
            .await
            .expect_err("unknown room should fail");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn send_server_notice_returns_event_id() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_synapse/admin/v1/send_server_notice")
                .json_body(json!({
                    "user_id": "@user:example.test",
                    "content": {"msgtype": "m.text", "body": "maintenance at noon"}
                }));
            then.status(200).json_body(json!({"event_id": "$notice"}));
        });

        let notice = client_for(&server)
            .send_server_notice(
                "@user:example.test",
                &json!({"msgtype": "m.text", "body": "maintenance at noon"}),
            )
            .await
            .expect("notice delivered");
        assert_eq!(notice.event_id, "$notice");
        mock.assert();
    }

    #[tokio::test]
    async fn whois_fetches_local_user_directly() {
        let server = MockServer::start_async().await;
        let host = server.address().ip().to_string();
        let user_id = format!("@ghost:{host}");
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/_matrix/client/v3/admin/whois/{user_id}"));
            then.status(200)
                .json_body(json!({"user_id": user_id.clone(), "devices": {}}));
        });

        let info = client_for(&server)
            .whois(&user_id)
            .await
            .expect("whois succeeds");
        assert_eq!(info["user_id"].as_str(), Some(user_id.as_str()));
        mock.assert();
    }

    #[tokio::test]
    async fn non_2xx_surfaces_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path_contains("evacuateUser");
            then.status(502).body("bad gateway");
        });

        let err = client_for(&server)
            .evacuate_user("@user:example.test")
            .await
            .expect_err("gateway error should surface");
        match err {
            Error::Remote { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn dialect_parses_canonical_names() {
        assert_eq!("stable".parse::<Dialect>().expect("parses"), Dialect::Stable);
        assert_eq!("Legacy".parse::<Dialect>().expect("parses"), Dialect::Legacy);
        assert!("camel".parse::<Dialect>().is_err());
    }

    #[test]
    fn endpoint_preserves_identifier_segments() {
        let client = AdminClient::builder(
            "http://localhost:8008".parse().expect("valid URL"),
            "syt_admin",
        )
        .build()
        .expect("client builds");

        let url = client
            .endpoint(&["_dendrite", "admin", "evacuateRoom", "!room:example.test"])
            .expect("endpoint builds");
        assert_eq!(
            url.as_str(),
            "http://localhost:8008/_dendrite/admin/evacuateRoom/!room:example.test"
        );
    }
}
