use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): every requested step completed
/// - `Failure` (1): the run finished but left strings untranslated
/// - `Error` (2): the command could not run (bad config, unknown module, I/O failure)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every target finished with nothing left to translate.
    Success,
    /// Translation gaps remain.
    Failure,
    /// Configuration, module or I/O error before the run could finish.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
