//! Discovery and persistence engine.
//!
//! - `patterns` / `ignore`: what to extract and what to suppress
//! - `file_scanner` / `scanner`: candidate enumeration and the extraction pass
//! - `table` / `diff`: per-language string tables and the missing-key diff
//! - `progress` / `retry`: plumbing shared with the translation layer

pub mod diff;
pub mod file_scanner;
pub mod ignore;
pub mod patterns;
pub mod progress;
pub mod retry;
pub mod scanner;
pub mod table;

pub use diff::missing;
pub use file_scanner::{CandidateFiles, collect_candidates};
pub use ignore::{IgnoreRuleSet, IgnoreRuleSetBuilder, is_glob_pattern};
pub use patterns::{PatternKind, PatternRule, PatternSet};
pub use progress::{Progress, ProgressCallback, ProgressReporter};
pub use retry::RetryPolicy;
pub use scanner::{ScanResult, Scanner};
pub use table::{StringTable, TableStore};
