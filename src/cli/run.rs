//! Dispatches parsed arguments to the matching command handler.

use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, find::find, init::init, trans::trans},
};

pub async fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Find(cmd)) => find(cmd).await,
        Some(Command::Trans(cmd)) => trans(cmd).await,
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
