use anyhow::Result;

use super::{CommandResult, CommandSummary, helper::CommandContext};
use crate::cli::args::FindCommand;
use crate::pipeline::Request;

pub async fn find(cmd: FindCommand) -> Result<CommandResult> {
    let ctx = CommandContext::new(&cmd.common)?;

    let mut builder = Request::builder()
        .find()
        .save()
        .from(ctx.config.from_language.clone());
    if cmd.trans {
        builder = builder.translate(ctx.target_languages()?);
    }

    let summaries = ctx.run(&builder.build()).await?;

    Ok(CommandResult {
        summary: CommandSummary::Find(summaries),
    })
}
