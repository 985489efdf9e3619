//! Table and JSON renderers for command results.

use anyhow::anyhow;
use chrono::{TimeZone, Utc};
use dendrite_admin_api::models::EvacuationReport;
use dendrite_admin_data::{AccountRecord, RoomRecord};
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Placeholder for rooms with no registered alias.
const NO_ALIAS: &str = "<no alias>";
/// Placeholder for accounts with no recorded creation time.
const UNKNOWN_TIMESTAMP: &str = "<unknown>";

fn to_pretty(value: &Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

/// Render an arbitrary JSON document. The table format prints one
/// `key: value` line per top-level field.
pub(crate) fn render_value(value: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_pretty(value)?),
        OutputFormat::Table => {
            if let Value::Object(map) = value {
                for (key, entry) in map {
                    match entry {
                        Value::String(text) => println!("{key}: {text}"),
                        other => println!("{key}: {}", compact(other)?),
                    }
                }
            } else {
                println!("{}", to_pretty(value)?);
            }
        }
    }
    Ok(())
}

fn compact(value: &Value) -> CliResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_evacuation(report: &EvacuationReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", to_pretty(&json!({ "affected": report.affected }))?);
        }
        OutputFormat::Table => {
            if report.affected.is_empty() {
                println!("no one affected");
            } else {
                for id in &report.affected {
                    println!("{id}");
                }
                println!("{} affected", report.affected.len());
            }
        }
    }
    Ok(())
}

/// Render the account directory, oldest account first. Accounts without a
/// creation time sort to the top.
pub(crate) fn render_accounts(accounts: &[AccountRecord], format: OutputFormat) -> CliResult<()> {
    let mut sorted: Vec<&AccountRecord> = accounts.iter().collect();
    sorted.sort_by_key(|account| account.created_ts.unwrap_or(0));

    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = sorted
                .iter()
                .map(|account| {
                    json!({
                        "user_id": format!("@{}:{}", account.localpart, account.server_name),
                        "created_ts": account.created_ts,
                        "account_type": account_type_label(account.account_type),
                        "is_deactivated": account.is_deactivated,
                        "appservice_id": account.appservice_id,
                        "display_name": account.display_name,
                        "avatar_url": account.avatar_url,
                    })
                })
                .collect();
            println!("{}", to_pretty(&Value::Array(rows))?);
        }
        OutputFormat::Table => {
            println!(
                "{:<40} {:<20} {:<11} {:<12} {:<14} DISPLAY NAME",
                "USER", "CREATED", "TYPE", "STATUS", "APPSERVICE"
            );
            for account in sorted {
                let user_id = format!("@{}:{}", account.localpart, account.server_name);
                println!(
                    "{user_id:<40} {:<20} {:<11} {:<12} {:<14} {}",
                    format_created(account.created_ts),
                    account_type_label(account.account_type),
                    if account.is_deactivated {
                        "deactivated"
                    } else {
                        "active"
                    },
                    account.appservice_id.as_deref().unwrap_or("-"),
                    account.display_name.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_rooms(rooms: &[RoomRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = rooms
                .iter()
                .map(|room| {
                    json!({
                        "alias": room.alias,
                        "room_id": room.room_id,
                        "room_version": room.room_version,
                    })
                })
                .collect();
            println!("{}", to_pretty(&Value::Array(rows))?);
        }
        OutputFormat::Table => {
            println!("{:<40} {:<48} VERSION", "ALIAS", "ROOM ID");
            for room in rooms {
                println!(
                    "{:<40} {:<48} {}",
                    room.alias.as_deref().unwrap_or(NO_ALIAS),
                    room.room_id,
                    room.room_version
                );
            }
        }
    }
    Ok(())
}

fn format_created(created_ts: Option<i64>) -> String {
    created_ts
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .map_or_else(
            || UNKNOWN_TIMESTAMP.to_string(),
            |when| when.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

/// Dendrite's numeric account types.
const fn account_type_label(account_type: i64) -> &'static str {
    match account_type {
        1 => "user",
        2 => "guest",
        3 => "admin",
        4 => "appservice",
        _ => "unknown",
    }
}
