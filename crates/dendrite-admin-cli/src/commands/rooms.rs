//! Room-scoped admin operations.

use crate::cli::{PurgeRoomArgs, RoomArgs};
use crate::client::{AppContext, CliResult, confirm, ensure_room_id};
use crate::output::{render_evacuation, render_value};

pub(crate) async fn handle_evacuate_room(ctx: &AppContext, args: &RoomArgs) -> CliResult<()> {
    ensure_room_id(&args.room_id)?;
    if !confirm(
        &format!("Kick every local user out of {}?", args.room_id),
        ctx.assume_yes,
    )? {
        println!("aborted");
        return Ok(());
    }
    let report = ctx.admin.evacuate_room(&args.room_id).await?;
    render_evacuation(&report, ctx.output)
}

pub(crate) async fn handle_purge_room(ctx: &AppContext, args: &PurgeRoomArgs) -> CliResult<()> {
    ensure_room_id(&args.room_id)?;
    if !args.i_have_evacuated
        && !confirm(
            &format!(
                "Purging does not kick local users out of {}. Have you evacuated it first?",
                args.room_id
            ),
            ctx.assume_yes,
        )?
    {
        println!("aborted");
        return Ok(());
    }
    if !args.i_am_sure
        && !confirm(
            &format!(
                "Purging {} removes it from the database permanently. Continue?",
                args.room_id
            ),
            ctx.assume_yes,
        )?
    {
        println!("aborted");
        return Ok(());
    }

    ctx.admin.purge_room(&args.room_id).await?.map_or_else(
        || {
            println!("{} purged", args.room_id);
            Ok(())
        },
        |outcome| render_value(&outcome, ctx.output),
    )
}
