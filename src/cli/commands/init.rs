use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<CommandResult> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    let created = if path.exists() {
        false
    } else {
        fs::write(&path, default_config_json()? + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
        true
    };

    Ok(CommandResult {
        summary: CommandSummary::Init(InitSummary { path, created }),
    })
}
