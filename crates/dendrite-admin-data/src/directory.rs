//! Directory queries for accounts and rooms.

use sqlx::postgres::{PgConnectOptions, PgRow, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, PgConnection, Row, SqliteConnection};
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};
use crate::uri::{DatabaseUri, PostgresTarget, SslMode};

const ACCOUNTS_QUERY: &str = "SELECT \
     userapi_accounts.localpart, userapi_accounts.server_name, created_ts, \
     appservice_id, is_deactivated, account_type, display_name, avatar_url \
     FROM userapi_accounts \
     INNER JOIN userapi_profiles \
     ON userapi_accounts.localpart = userapi_profiles.localpart";

const ROOMS_QUERY: &str = "SELECT alias, roomserver_rooms.room_id, room_version \
     FROM roomserver_rooms \
     LEFT JOIN roomserver_room_aliases \
     ON roomserver_rooms.room_id = roomserver_room_aliases.room_id";

/// One row of the server's account directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Local part of the Matrix user ID.
    pub localpart: String,
    /// Server name the account belongs to.
    pub server_name: String,
    /// Creation time in milliseconds since the Unix epoch, when recorded.
    pub created_ts: Option<i64>,
    /// Owning appservice, for appservice-managed accounts.
    pub appservice_id: Option<String>,
    /// Whether the account has been deactivated.
    pub is_deactivated: bool,
    /// Numeric account type (user, guest, admin, appservice).
    pub account_type: i64,
    /// Profile display name, when set.
    pub display_name: Option<String>,
    /// Profile avatar URL, when set.
    pub avatar_url: Option<String>,
}

/// One row of the server's room directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
    /// Canonical alias, when one is registered.
    pub alias: Option<String>,
    /// Opaque room ID.
    pub room_id: String,
    /// Room version the room was created with.
    pub room_version: String,
}

/// List every account known to the server, joined with its profile.
///
/// # Errors
///
/// [`DataError::QueryFailed`] when the connection or query fails.
pub async fn list_accounts(uri: &DatabaseUri) -> DataResult<Vec<AccountRecord>> {
    match uri {
        DatabaseUri::Postgres(target) => {
            let rows = fetch_postgres(target, ACCOUNTS_QUERY, "list_accounts").await?;
            rows.iter().map(account_from_postgres).collect()
        }
        DatabaseUri::Sqlite(path) => {
            let rows = fetch_sqlite(path, ACCOUNTS_QUERY, "list_accounts").await?;
            rows.iter().map(account_from_sqlite).collect()
        }
    }
}

/// List every room known to the server, with its alias when one exists.
///
/// # Errors
///
/// [`DataError::QueryFailed`] when the connection or query fails.
pub async fn list_rooms(uri: &DatabaseUri) -> DataResult<Vec<RoomRecord>> {
    match uri {
        DatabaseUri::Postgres(target) => {
            let rows = fetch_postgres(target, ROOMS_QUERY, "list_rooms").await?;
            rows.iter().map(room_from_postgres).collect()
        }
        DatabaseUri::Sqlite(path) => {
            let rows = fetch_sqlite(path, ROOMS_QUERY, "list_rooms").await?;
            rows.iter().map(room_from_sqlite).collect()
        }
    }
}

fn postgres_options(target: &PostgresTarget) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .port(target.port)
        .database(&target.database)
        .ssl_mode(ssl_mode(target.sslmode));
    if let Some(host) = &target.host {
        options = options.host(host);
    }
    if let Some(user) = &target.user {
        options = options.username(user);
    }
    if let Some(password) = &target.password {
        options = options.password(password);
    }
    options
}

const fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

async fn fetch_postgres(
    target: &PostgresTarget,
    query: &str,
    operation: &'static str,
) -> DataResult<Vec<PgRow>> {
    debug!(operation, "opening postgres connection");
    let mut conn = PgConnection::connect_with(&postgres_options(target))
        .await
        .map_err(DataError::query(operation))?;
    let rows = sqlx::query(query).fetch_all(&mut conn).await;
    if let Err(err) = conn.close().await {
        warn!(operation, error = %err, "failed to close postgres connection");
    }
    rows.map_err(DataError::query(operation))
}

async fn fetch_sqlite(
    path: &std::path::Path,
    query: &str,
    operation: &'static str,
) -> DataResult<Vec<SqliteRow>> {
    debug!(operation, path = %path.display(), "opening sqlite connection");
    let options = SqliteConnectOptions::new().filename(path).read_only(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(DataError::query(operation))?;
    let rows = sqlx::query(query).fetch_all(&mut conn).await;
    if let Err(err) = conn.close().await {
        warn!(operation, error = %err, "failed to close sqlite connection");
    }
    rows.map_err(DataError::query(operation))
}

fn account_from_postgres(row: &PgRow) -> DataResult<AccountRecord> {
    let decode = DataError::query("decode_account");
    Ok(AccountRecord {
        localpart: row.try_get("localpart").map_err(&decode)?,
        server_name: row.try_get("server_name").map_err(&decode)?,
        created_ts: row.try_get("created_ts").map_err(&decode)?,
        appservice_id: row.try_get("appservice_id").map_err(&decode)?,
        is_deactivated: row.try_get("is_deactivated").map_err(&decode)?,
        account_type: i64::from(row.try_get::<i16, _>("account_type").map_err(&decode)?),
        display_name: row.try_get("display_name").map_err(&decode)?,
        avatar_url: row.try_get("avatar_url").map_err(&decode)?,
    })
}

fn account_from_sqlite(row: &SqliteRow) -> DataResult<AccountRecord> {
    let decode = DataError::query("decode_account");
    Ok(AccountRecord {
        localpart: row.try_get("localpart").map_err(&decode)?,
        server_name: row.try_get("server_name").map_err(&decode)?,
        created_ts: row.try_get("created_ts").map_err(&decode)?,
        appservice_id: row.try_get("appservice_id").map_err(&decode)?,
        is_deactivated: row.try_get::<i64, _>("is_deactivated").map_err(&decode)? != 0,
        account_type: row.try_get("account_type").map_err(&decode)?,
        display_name: row.try_get("display_name").map_err(&decode)?,
        avatar_url: row.try_get("avatar_url").map_err(&decode)?,
    })
}

fn room_from_postgres(row: &PgRow) -> DataResult<RoomRecord> {
    let decode = DataError::query("decode_room");
    Ok(RoomRecord {
        alias: row.try_get("alias").map_err(&decode)?,
        room_id: row.try_get("room_id").map_err(&decode)?,
        room_version: row.try_get("room_version").map_err(&decode)?,
    })
}

fn room_from_sqlite(row: &SqliteRow) -> DataResult<RoomRecord> {
    let decode = DataError::query("decode_room");
    Ok(RoomRecord {
        alias: row.try_get("alias").map_err(&decode)?,
        room_id: row.try_get("room_id").map_err(&decode)?,
        room_version: row.try_get("room_version").map_err(&decode)?,
    })
}
