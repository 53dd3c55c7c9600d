use std::path::PathBuf;

use crate::cli::exit_status::ExitStatus;
use crate::pipeline::Outcome;

#[derive(Debug)]
pub enum CommandSummary {
    Find(Vec<TargetSummary>),
    Trans(Vec<TargetSummary>),
    Init(InitSummary),
}

/// Pipeline outcome for one scan target.
#[derive(Debug)]
pub struct TargetSummary {
    pub target: String,
    /// Source-language table of the target.
    pub table: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
    /// False when a config file already existed.
    pub created: bool,
}

/// Result of running a langsweep command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
}

impl CommandResult {
    /// Strings left untranslated across every target.
    pub fn untranslated_count(&self) -> usize {
        match &self.summary {
            CommandSummary::Find(targets) | CommandSummary::Trans(targets) => targets
                .iter()
                .map(|t| t.outcome.untranslated_count())
                .sum(),
            CommandSummary::Init(_) => 0,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match &self.summary {
            CommandSummary::Init(summary) if !summary.created => ExitStatus::Failure,
            _ if self.untranslated_count() > 0 => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}
