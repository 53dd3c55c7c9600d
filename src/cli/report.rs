//! Report formatting and printing utilities.
//!
//! Kept separate from the pipeline so langsweep can be used as a library.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, InitSummary, TargetSummary};
use crate::core::{Progress, ProgressReporter};
use crate::pipeline::ScanTarget;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of untranslated strings listed per language.
const MAX_UNTRANSLATED_DISPLAY: usize = 5;

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Find(targets) | CommandSummary::Trans(targets) => {
            for target in targets {
                print_target(target, verbose, writer);
            }
        }
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

/// Announce a target before it runs. Only printed for modules.
pub fn print_target_header(target: &ScanTarget, project_root: &Path) {
    if let ScanTarget::Module { name, path } = target {
        let shown = path.strip_prefix(project_root).unwrap_or(path);
        eprintln!("{} {} ({})", "Module".bold(), name, shown.display());
    }
}

/// Per-file scan progress on stderr, when verbose.
pub fn scan_progress(verbose: bool) -> ProgressReporter {
    if !verbose {
        return ProgressReporter::silent();
    }
    ProgressReporter::new(|progress: &Progress| {
        eprintln!(
            "  {} {}",
            format!("[{}/{}]", progress.current, progress.total).dimmed(),
            progress.get("path").unwrap_or_default()
        );
    })
}

/// Per-chunk translation progress on stderr, when verbose.
pub fn translate_progress(verbose: bool) -> ProgressReporter {
    if !verbose {
        return ProgressReporter::silent();
    }
    ProgressReporter::new(|progress: &Progress| {
        eprintln!(
            "  {} {:.2}% ({} remaining, last chunk: {})",
            "Translating".cyan(),
            progress.percentage,
            progress.remaining,
            progress.get("language").unwrap_or("?")
        );
    })
}

fn print_target<W: Write>(summary: &TargetSummary, verbose: bool, writer: &mut W) {
    let outcome = &summary.outcome;
    let label = summary.target.bold();

    if outcome.files_scanned > 0 || outcome.found_strings > 0 {
        let _ = writeln!(
            writer,
            "{} {}: scanned {} {}, found {} {}, {} new in {}",
            SUCCESS_MARK.green(),
            label,
            outcome.files_scanned,
            plural(outcome.files_scanned, "file", "files"),
            outcome.found_strings,
            plural(outcome.found_strings, "string", "strings"),
            outcome.new_strings,
            summary.table.display()
        );
    }

    for (language, table) in &outcome.translations {
        if table.is_empty() {
            if outcome.untranslated.get(language).is_none_or(Vec::is_empty) {
                let _ = writeln!(
                    writer,
                    "{} {}: {} is up to date",
                    SUCCESS_MARK.green(),
                    label,
                    language
                );
            }
            continue;
        }
        let _ = writeln!(
            writer,
            "{} {}: translated {} {} into {}",
            SUCCESS_MARK.green(),
            label,
            table.len(),
            plural(table.len(), "string", "strings"),
            language
        );
    }

    for (language, keys) in &outcome.untranslated {
        if keys.is_empty() {
            continue;
        }
        let _ = writeln!(
            writer,
            "{} {} {} {} left untranslated for {} in {}",
            "warning:".bold().yellow(),
            keys.len(),
            plural(keys.len(), "string", "strings"),
            plural(keys.len(), "was", "were"),
            language,
            summary.target
        );
        let shown = if verbose {
            keys.len()
        } else {
            MAX_UNTRANSLATED_DISPLAY
        };
        for key in keys.iter().take(shown) {
            let _ = writeln!(writer, "  {} \"{}\"", FAILURE_MARK.red(), key);
        }
        if keys.len() > shown {
            let _ = writeln!(
                writer,
                "  ... and {} more (use {} to list all)",
                keys.len() - shown,
                "-v".cyan()
            );
        }
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", summary.path.display()).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} already exists",
            "warning:".bold().yellow(),
            summary.path.display()
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::StringTable;
    use crate::pipeline::Outcome;

    fn render(result: &CommandResult, verbose: bool) -> String {
        colored::control::set_override(false);
        let mut output = Vec::new();
        print_to(result, verbose, &mut output);
        String::from_utf8(output).unwrap()
    }

    fn target(outcome: Outcome) -> CommandResult {
        CommandResult {
            summary: CommandSummary::Find(vec![TargetSummary {
                target: "application".to_string(),
                table: PathBuf::from("lang/en.json"),
                outcome,
            }]),
        }
    }

    #[test]
    fn test_find_summary() {
        let output = render(
            &target(Outcome {
                files_scanned: 1,
                found_strings: 2,
                new_strings: 2,
                ..Default::default()
            }),
            false,
        );

        assert_eq!(
            output,
            "✓ application: scanned 1 file, found 2 strings, 2 new in lang/en.json\n"
        );
    }

    #[test]
    fn test_translation_summary() {
        let mut table = StringTable::new();
        table.insert("Save".to_string(), "Guardar".to_string());
        let mut translations = BTreeMap::new();
        translations.insert("es".to_string(), table);

        let output = render(
            &target(Outcome {
                translations,
                ..Default::default()
            }),
            false,
        );

        assert_eq!(output, "✓ application: translated 1 string into es\n");
    }

    #[test]
    fn test_untranslated_is_truncated() {
        let keys: Vec<String> = (0..7).map(|i| format!("s{i}")).collect();
        let mut untranslated = BTreeMap::new();
        untranslated.insert("fr".to_string(), keys);
        let result = target(Outcome {
            untranslated,
            ..Default::default()
        });

        let output = render(&result, false);
        assert!(output.starts_with("warning: 7 strings were left untranslated for fr in application\n"));
        assert!(output.contains("  ✘ \"s4\"\n"));
        assert!(!output.contains("\"s5\""));
        assert!(output.contains("... and 2 more"));

        let output = render(&result, true);
        assert!(output.contains("  ✘ \"s6\"\n"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn test_init_messages() {
        let created = CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path: PathBuf::from(".langsweeprc.json"),
                created: true,
            }),
        };
        assert_eq!(render(&created, false), "✓ Created .langsweeprc.json\n");

        let existing = CommandResult {
            summary: CommandSummary::Init(InitSummary {
                path: PathBuf::from(".langsweeprc.json"),
                created: false,
            }),
        };
        assert_eq!(
            render(&existing, false),
            "warning: .langsweeprc.json already exists\n"
        );
    }
}
