use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::ignore::IgnoreRuleSet;

/// Extensions the scanner reads. Blade templates end in `.blade.php`.
const SCANNABLE_EXTENSIONS: &[&str] = &["php"];

/// Result of enumerating candidate files.
#[derive(Debug, Default)]
pub struct CandidateFiles {
    /// `(root, file)` pairs in walk order, roots in the order given.
    pub files: Vec<(PathBuf, PathBuf)>,
    /// Entries that could not be accessed during the walk.
    pub skipped_count: usize,
}

impl CandidateFiles {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Enumerate every scannable file under `roots` that no ignore-path rule excludes.
///
/// Ignore paths are evaluated relative to the root being walked, and an
/// ignored directory is pruned without descending into it. Roots that do not
/// exist are skipped.
pub fn collect_candidates(roots: &[PathBuf], rules: &IgnoreRuleSet) -> CandidateFiles {
    let mut result = CandidateFiles::default();

    for root in roots {
        if !root.is_dir() {
            debug!("Skipping missing scan root: {}", root.display());
            continue;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                relative.as_os_str().is_empty() || !rules.is_path_ignored(relative)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_file() && is_scannable_file(path) {
                result.files.push((root.clone(), path.to_path_buf()));
            }
        }
    }

    result
}

fn is_scannable_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| SCANNABLE_EXTENSIONS.contains(&ext))
}
