use anyhow::{Result, bail};

use super::{CommandResult, CommandSummary, helper::CommandContext};
use crate::cli::args::TransCommand;
use crate::pipeline::Request;

pub async fn trans(cmd: TransCommand) -> Result<CommandResult> {
    let mut ctx = CommandContext::new(&cmd.common)?;

    let translation = &mut ctx.config.translation;
    if cmd.sequential {
        translation.concurrent = false;
    }
    if let Some(n) = cmd.max_concurrent {
        if n == 0 {
            bail!("--max-concurrent must be greater than 0");
        }
        translation.max_concurrent = n;
    }
    if let Some(n) = cmd.chunk_size {
        if n == 0 {
            bail!("--chunk-size must be greater than 0");
        }
        translation.chunk_size = n;
    }

    let request = Request::builder()
        .from(ctx.config.from_language.clone())
        .translate(ctx.target_languages()?)
        .build();
    let summaries = ctx.run(&request).await?;

    Ok(CommandResult {
        summary: CommandSummary::Trans(summaries),
    })
}
