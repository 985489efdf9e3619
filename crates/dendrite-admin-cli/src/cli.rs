//! Argument parsing, configuration merge, and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dendrite_admin_api::{AdminClient, Dialect, Timeouts};
use dendrite_admin_config::{ConfigDocument, ConfigStore, TimeoutSettings};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, prompt_hidden};
use crate::commands::{directory, register, rooms, server, users};

const DEFAULT_SERVER: &str = "http://localhost:8008";
const HEADER_REQUEST_ID: &str = "x-request-id";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn init_tracing(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn execute(cli: Cli) -> CliResult<()> {
    let store = if let Some(path) = &cli.config {
        ConfigStore::new(path.clone())
    } else {
        ConfigStore::default_location()?
    };
    let mut doc = store.load()?;
    let saved = doc.clone();
    merge_flags(&cli, &mut doc);

    let result = dispatch(cli.command, cli.output, cli.yes, &mut doc).await;

    // One write per invocation, and only when something changed; a failed
    // command still keeps any token or URI the user just typed in.
    if doc != saved {
        if let Err(err) = store.save(&doc) {
            if result.is_ok() {
                return Err(err.into());
            }
            warn!(error = %err, "failed to persist configuration");
        }
    }
    result
}

fn merge_flags(cli: &Cli, doc: &mut ConfigDocument) {
    if let Some(server) = &cli.server {
        doc.server = Some(server.clone());
    }
    if let Some(token) = &cli.access_token {
        doc.access_token = Some(token.clone());
    }
    if let Some(dialect) = cli.dialect {
        doc.dialect = Some(dialect.as_str().to_string());
    }
}

async fn dispatch(
    command: Command,
    output: OutputFormat,
    assume_yes: bool,
    doc: &mut ConfigDocument,
) -> CliResult<()> {
    match command {
        Command::ListAccounts(args) => directory::handle_list_accounts(&args, output, doc).await,
        Command::ListRooms(args) => directory::handle_list_rooms(&args, output, doc).await,
        Command::Evacuate(EvacuateCommand::Room(args)) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            rooms::handle_evacuate_room(&ctx, &args).await
        }
        Command::Evacuate(EvacuateCommand::User(args)) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_evacuate_user(&ctx, &args).await
        }
        Command::ResetPassword(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_reset_password(&ctx, &args).await
        }
        Command::ReindexEvents => {
            let ctx = admin_context(doc, output, assume_yes)?;
            server::handle_reindex_events(&ctx).await
        }
        Command::RefreshDevices(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_refresh_devices(&ctx, &args).await
        }
        Command::PurgeRoom(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            rooms::handle_purge_room(&ctx, &args).await
        }
        Command::Register(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            register::handle_register(&ctx, args).await
        }
        Command::Whois(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_whois(&ctx, &args).await
        }
        Command::Deactivate(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_deactivate(&ctx, &args).await
        }
        Command::SendNotice(args) => {
            let ctx = admin_context(doc, output, assume_yes)?;
            users::handle_send_notice(&ctx, &args).await
        }
    }
}

/// Build the admin client context, prompting for a missing access token
/// (which is then persisted alongside the rest of the document).
fn admin_context(
    doc: &mut ConfigDocument,
    output: OutputFormat,
    assume_yes: bool,
) -> CliResult<AppContext> {
    if doc.access_token.is_none() {
        let token = prompt_hidden("Access token")?;
        let token = token.trim();
        if token.is_empty() {
            return Err(CliError::validation(
                "an access token is required (pass --access-token or set DENDRITE_ADMIN_TOKEN)",
            ));
        }
        doc.access_token = Some(token.to_string());
    }
    Ok(AppContext {
        admin: build_admin_client(doc)?,
        output,
        assume_yes,
    })
}

fn build_admin_client(doc: &ConfigDocument) -> CliResult<AdminClient> {
    let server = doc.server.as_deref().unwrap_or(DEFAULT_SERVER);
    let base_url = server
        .parse::<Url>()
        .map_err(|err| CliError::validation(format!("invalid server URL '{server}': {err}")))?;
    let token = doc.access_token.clone().unwrap_or_default();
    let dialect = doc
        .dialect
        .as_deref()
        .map(str::parse::<Dialect>)
        .transpose()?
        .unwrap_or_default();

    let mut builder = AdminClient::builder(base_url, token)
        .timeouts(timeouts_from(doc.timeout.unwrap_or_default()))
        .dialect(dialect)
        .allow_long_passwords(doc.override_password_length_check)
        .header(HEADER_REQUEST_ID, Uuid::new_v4().to_string());
    if let Some(proxy) = &doc.proxies {
        builder = builder.proxy(proxy.clone());
    }
    for (name, value) in &doc.headers {
        builder = builder.header(name.clone(), value.clone());
    }
    Ok(builder.build()?)
}

const fn timeouts_from(settings: TimeoutSettings) -> Timeouts {
    Timeouts {
        connect: Duration::from_secs(settings.connect),
        read: Duration::from_secs(settings.read),
        write: Duration::from_secs(settings.write),
        pool: Duration::from_secs(settings.pool),
    }
}

fn parse_dialect(input: &str) -> Result<Dialect, String> {
    input.parse::<Dialect>().map_err(|err| err.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "dendrite-admin",
    about = "Administrative CLI for a Dendrite homeserver",
    version
)]
pub(crate) struct Cli {
    /// Homeserver base URL.
    #[arg(short, long, global = true, env = "DENDRITE_ADMIN_SERVER")]
    pub(crate) server: Option<String>,
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,
    /// Admin access token.
    #[arg(short = 't', long, global = true, env = "DENDRITE_ADMIN_TOKEN")]
    pub(crate) access_token: Option<String>,
    /// Log filter, e.g. `info` or `dendrite_admin=debug`.
    #[arg(short = 'l', long, global = true, default_value = "info")]
    pub(crate) log_level: String,
    /// Output format for command results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) output: OutputFormat,
    /// Skip confirmation prompts.
    #[arg(short = 'y', long, global = true)]
    pub(crate) yes: bool,
    /// Admin endpoint dialect (stable or legacy).
    #[arg(long, global = true, value_parser = parse_dialect)]
    pub(crate) dialect: Option<Dialect>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Kick local users out of a room, or a user out of their rooms.
    #[command(subcommand)]
    Evacuate(EvacuateCommand),
    /// Reset a local user's password.
    ResetPassword(ResetPasswordArgs),
    /// Rebuild the full-text search index.
    ReindexEvents,
    /// Re-query a remote user's devices and cross-signing keys.
    RefreshDevices(UserArgs),
    /// Irreversibly purge a room from the database.
    PurgeRoom(PurgeRoomArgs),
    /// Register an account via the shared-secret flow.
    Register(RegisterArgs),
    /// Look up a user's sessions and connection metadata.
    Whois(UserArgs),
    /// Permanently deactivate an account.
    Deactivate(UserArgs),
    /// Send a server notice to a local user.
    SendNotice(SendNoticeArgs),
    /// List every account in the server database.
    ListAccounts(DirectoryArgs),
    /// List every room in the server database.
    ListRooms(DirectoryArgs),
}

#[derive(Debug, Subcommand)]
pub(crate) enum EvacuateCommand {
    /// Kick every local user out of the room.
    Room(RoomArgs),
    /// Kick the user out of every room they are joined to.
    User(UserArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RoomArgs {
    /// Room ID, e.g. `!abc123:example.com`.
    pub(crate) room_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct UserArgs {
    /// User ID, e.g. `@alice:example.com`.
    pub(crate) user_id: String,
}

#[derive(Debug, Args)]
pub(crate) struct ResetPasswordArgs {
    /// User ID whose password to reset.
    pub(crate) user_id: String,
    /// Log the user out of all devices.
    #[arg(long)]
    pub(crate) logout_devices: bool,
    /// New password; prompted for when omitted, generated when blank.
    #[arg(long)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct PurgeRoomArgs {
    /// Room ID to purge.
    pub(crate) room_id: String,
    /// Skip the irreversibility confirmation.
    #[arg(long)]
    pub(crate) i_am_sure: bool,
    /// Skip the evacuation reminder.
    #[arg(long)]
    pub(crate) i_have_evacuated: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Registration shared secret from the server configuration.
    pub(crate) shared_secret: String,
    /// Localpart of the account to create.
    pub(crate) username: String,
    /// Display name; defaults to the username.
    #[arg(long)]
    pub(crate) display_name: Option<String>,
    /// Grant the new account server admin rights.
    #[arg(long)]
    pub(crate) admin: bool,
    /// Initial password; prompted for (with confirmation) when omitted.
    #[arg(long)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct SendNoticeArgs {
    /// Recipient user ID.
    pub(crate) user_id: String,
    /// Plain-text notice body.
    pub(crate) message: String,
}

#[derive(Debug, Args)]
pub(crate) struct DirectoryArgs {
    /// Database URI; falls back to the configured one, then a prompt.
    #[arg(long)]
    pub(crate) database_uri: Option<String>,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable columns.
    Table,
    /// Pretty-printed JSON.
    Json,
}
