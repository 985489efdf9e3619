//! Shared-secret account registration.

use dendrite_admin_api::RegistrationRequest;
use serde_json::json;

use crate::cli::RegisterArgs;
use crate::client::{AppContext, CliError, CliResult, prompt_hidden};
use crate::output::render_value;

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    if args.username.trim().is_empty() {
        return Err(CliError::validation("username must not be empty"));
    }
    let password = if let Some(given) = args.password {
        given
    } else {
        let first = prompt_hidden("Password")?;
        if first.is_empty() {
            return Err(CliError::validation("a password is required"));
        }
        let second = prompt_hidden("Confirm password")?;
        if first != second {
            return Err(CliError::validation("passwords do not match"));
        }
        first
    };

    // The nonce is single-use and bound to the MAC; fetch it immediately
    // before submitting.
    let nonce = ctx.admin.register_nonce().await?;
    let registered = ctx
        .admin
        .register(&RegistrationRequest {
            nonce,
            shared_secret: args.shared_secret,
            username: args.username,
            password,
            displayname: args.display_name,
            admin: args.admin,
        })
        .await?;

    render_value(
        &json!({
            "user_id": registered.user_id,
            "access_token": registered.access_token,
            "home_server": registered.home_server,
            "device_id": registered.device_id,
        }),
        ctx.output,
    )
}
