//! The discovery pass: enumerate candidates, filter files, extract, filter strings.

use std::{collections::BTreeSet, fs, path::PathBuf};

use tracing::{debug, warn};

use crate::core::{
    file_scanner::collect_candidates,
    ignore::{IgnoreRuleSet, declared_namespace, is_translation_key},
    patterns::{PatternKind, PatternSet},
    progress::{Progress, ProgressReporter},
};

/// Result of a [`Scanner::scan`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Every accepted string, deduplicated across files and roots.
    pub strings: BTreeSet<String>,
    pub files_processed: usize,
    /// Files excluded by the filename, namespace or extension rules.
    pub files_ignored: usize,
    /// Files that could not be read or walked.
    pub files_unreadable: usize,
}

#[derive(Debug)]
pub struct Scanner {
    patterns: PatternSet,
    rules: IgnoreRuleSet,
    progress: ProgressReporter,
}

impl Scanner {
    pub fn new(rules: IgnoreRuleSet) -> Self {
        Self {
            patterns: PatternSet::default(),
            rules,
            progress: ProgressReporter::silent(),
        }
    }

    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// Receive one event per processed file, carrying `file` and `path`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn scan(&self, roots: &[PathBuf]) -> ScanResult {
        let candidates = collect_candidates(roots, &self.rules);
        let total = candidates.len();
        let mut result = ScanResult {
            files_unreadable: candidates.skipped_count,
            ..Default::default()
        };

        for (index, (_, path)) in candidates.files.iter().enumerate() {
            match fs::read_to_string(path) {
                Ok(content) => {
                    if self.is_file_ignored(path, &content) {
                        result.files_ignored += 1;
                    } else {
                        self.extract_into(&content, &mut result.strings);
                    }
                }
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    result.files_unreadable += 1;
                }
            }

            result.files_processed += 1;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.progress.report(
                Progress::new(index + 1, total)
                    .with("file", file_name)
                    .with("path", path.display().to_string()),
            );
        }

        debug!(
            "Scanned {} files, found {} strings",
            result.files_processed,
            result.strings.len()
        );
        result
    }

    fn is_file_ignored(&self, path: &std::path::Path, content: &str) -> bool {
        if self.rules.is_file_ignored(path) {
            debug!("Ignoring file by name: {}", path.display());
            return true;
        }
        if self.rules.is_namespace_ignored(declared_namespace(content)) {
            debug!("Ignoring file by namespace: {}", path.display());
            return true;
        }
        self.rules.is_extension_ignored(path)
    }

    fn extract_into(&self, content: &str, strings: &mut BTreeSet<String>) {
        for (kind, text) in self.patterns.extract(content) {
            if kind == PatternKind::FunctionCall && is_translation_key(&text) {
                continue;
            }
            if self.rules.accepts_string(&text) {
                strings.insert(text);
            }
        }
    }
}
