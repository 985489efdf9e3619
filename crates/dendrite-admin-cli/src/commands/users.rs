//! User-scoped admin operations.

use anyhow::anyhow;
use serde_json::json;
use tracing::warn;

use crate::cli::{ResetPasswordArgs, SendNoticeArgs, UserArgs};
use crate::client::{
    AppContext, CliError, CliResult, confirm, ensure_user_id, prompt_hidden, random_password,
};
use crate::output::{render_evacuation, render_value};

pub(crate) async fn handle_evacuate_user(ctx: &AppContext, args: &UserArgs) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    if !confirm(
        &format!("Kick {} out of every room they are joined to?", args.user_id),
        ctx.assume_yes,
    )? {
        println!("aborted");
        return Ok(());
    }
    let report = ctx.admin.evacuate_user(&args.user_id).await?;
    render_evacuation(&report, ctx.output)
}

pub(crate) async fn handle_reset_password(
    ctx: &AppContext,
    args: &ResetPasswordArgs,
) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    if !confirm(
        &format!("Reset the password for {}?", args.user_id),
        ctx.assume_yes,
    )? {
        println!("aborted");
        return Ok(());
    }

    let (password, generated) = resolve_new_password(args.password.as_deref())?;

    let outcome = ctx
        .admin
        .reset_password(&args.user_id, &password, args.logout_devices)
        .await?;
    if !outcome.password_updated {
        return Err(CliError::failure(anyhow!(
            "the server did not confirm the password update"
        )));
    }
    if generated {
        println!("generated password: {password}");
    }
    println!("password updated for {}", args.user_id);
    Ok(())
}

/// A blank entry at the prompt generates a throwaway password, which the
/// handler then prints.
fn resolve_new_password(given: Option<&str>) -> CliResult<(String, bool)> {
    if let Some(given) = given {
        return Ok((given.to_string(), false));
    }
    let entered = prompt_hidden("New password (blank to generate one)")?;
    if entered.is_empty() {
        Ok((random_password(), true))
    } else {
        Ok((entered, false))
    }
}

pub(crate) async fn handle_refresh_devices(ctx: &AppContext, args: &UserArgs) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    ctx.admin.refresh_devices(&args.user_id).await?.map_or_else(
        || {
            println!("device refresh requested for {}", args.user_id);
            Ok(())
        },
        |outcome| render_value(&outcome, ctx.output),
    )
}

/// `whois` needs an admin token; a 401 from a non-admin token falls back
/// to the public profile lookup so the command still returns something.
pub(crate) async fn handle_whois(ctx: &AppContext, args: &UserArgs) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    match ctx.admin.whois(&args.user_id).await {
        Ok(report) => render_value(&report, ctx.output),
        Err(err) if err.status().is_some_and(|status| status.as_u16() == 401) => {
            warn!(user_id = %args.user_id, "whois denied, falling back to the public profile");
            let profile = ctx.admin.get_profile(&args.user_id).await?;
            render_value(&profile, ctx.output)
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn handle_deactivate(ctx: &AppContext, args: &UserArgs) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    if !confirm(
        &format!(
            "Permanently deactivate {}? This cannot be undone",
            args.user_id
        ),
        ctx.assume_yes,
    )? {
        println!("aborted");
        return Ok(());
    }
    if !confirm(
        "Deactivation does not remove the user from rooms. Evacuate them first if needed. Continue?",
        ctx.assume_yes,
    )? {
        println!("aborted");
        return Ok(());
    }
    ctx.admin.deactivate(&args.user_id).await?;
    println!("{} deactivated", args.user_id);
    Ok(())
}

pub(crate) async fn handle_send_notice(ctx: &AppContext, args: &SendNoticeArgs) -> CliResult<()> {
    ensure_user_id(&args.user_id)?;
    let content = json!({ "msgtype": "m.text", "body": args.message });
    let notice = ctx.admin.send_server_notice(&args.user_id, &content).await?;
    println!("notice sent (event {})", notice.event_id);
    Ok(())
}
