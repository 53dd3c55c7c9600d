//! Progress events shared by the scanner and the translation orchestrator.

use std::{collections::BTreeMap, fmt, sync::Arc};

/// A snapshot of how far a long-running operation has got.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    /// Percentage complete, rounded to two decimals.
    pub percentage: f64,
    pub completed: bool,
    pub remaining: usize,
    /// Context fields: `file`/`path` while scanning, `language` while translating.
    pub extra: BTreeMap<String, String>,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            ((current as f64 / total as f64) * 10_000.0).round() / 100.0
        };

        Self {
            current,
            total,
            percentage,
            completed: current >= total,
            remaining: total.saturating_sub(current),
            extra: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Optional sink for [`Progress`] events. Cloning shares the callback.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    pub fn report(&self, progress: Progress) {
        if let Some(callback) = &self.callback {
            callback(&progress);
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_progress_fields() {
        let progress = Progress::new(1, 3).with("language", "es");

        assert_eq!(progress.percentage, 33.33);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.completed);
        assert_eq!(progress.get("language"), Some("es"));
    }

    #[test]
    fn test_progress_completed() {
        let progress = Progress::new(4, 4);
        assert_eq!(progress.percentage, 100.0);
        assert!(progress.completed);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn test_empty_total_is_complete() {
        let progress = Progress::new(0, 0);
        assert_eq!(progress.percentage, 100.0);
        assert!(progress.completed);
    }

    #[test]
    fn test_reporter_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(move |p| sink.lock().push(p.current));

        reporter.report(Progress::new(1, 2));
        reporter.clone().report(Progress::new(2, 2));

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert!(!ProgressReporter::silent().is_enabled());
    }
}
