//! Read-only directory listings against the server database.

use dendrite_admin_config::ConfigDocument;
use dendrite_admin_data::{DatabaseUri, list_accounts, list_rooms};

use crate::cli::{DirectoryArgs, OutputFormat};
use crate::client::{CliError, CliResult, prompt_line};
use crate::output::{render_accounts, render_rooms};

pub(crate) async fn handle_list_accounts(
    args: &DirectoryArgs,
    format: OutputFormat,
    doc: &mut ConfigDocument,
) -> CliResult<()> {
    let uri = resolve_database_uri(args, doc)?;
    let accounts = list_accounts(&uri).await?;
    render_accounts(&accounts, format)
}

pub(crate) async fn handle_list_rooms(
    args: &DirectoryArgs,
    format: OutputFormat,
    doc: &mut ConfigDocument,
) -> CliResult<()> {
    let uri = resolve_database_uri(args, doc)?;
    let rooms = list_rooms(&uri).await?;
    render_rooms(&rooms, format)
}

/// URI precedence: flag, then config, then a prompt. Whatever parses is
/// written back to the document so the next invocation skips the prompt.
fn resolve_database_uri(args: &DirectoryArgs, doc: &mut ConfigDocument) -> CliResult<DatabaseUri> {
    let raw = if let Some(flag) = &args.database_uri {
        flag.clone()
    } else if let Some(saved) = &doc.database_uri {
        saved.clone()
    } else {
        let entered = prompt_line("Database URI")?;
        if entered.is_empty() {
            return Err(CliError::validation(
                "a database URI is required (pass --database-uri or set it in the config file)",
            ));
        }
        entered
    };

    let uri = DatabaseUri::parse(&raw)?;
    doc.database_uri = Some(raw);
    Ok(uri)
}
