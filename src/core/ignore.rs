//! Suppression rules applied by the scanner.
//!
//! A file survives only if its path, filename and declared namespace pass;
//! a string survives only if it is not noise, not listed verbatim and not
//! matched by any ignore pattern.

use std::{
    collections::HashSet,
    path::{Component, Path},
    sync::LazyLock,
};

use glob::Pattern;
use regex::Regex;
use tracing::warn;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are matched as path fragments.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

static NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][A-Za-z0-9_\\]*)\s*[;{]").expect("valid regex")
});

/// Structural noise: pure integers, short codes, `word.word` keys, hex colors.
static NOISE: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"^\d+$",
        r"^[a-zA-Z0-9_-]{1,3}$",
        r"^\w+\.\w+$",
        r"^#[0-9a-fA-F]{3,6}$",
    ]
    .map(|p| Regex::new(p).expect("valid regex"))
});

/// Extract the namespace a PHP file declares, if any.
pub fn declared_namespace(content: &str) -> Option<&str> {
    NAMESPACE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Heuristic for literals that are identifiers or values rather than text.
pub fn is_structural_noise(text: &str) -> bool {
    NOISE.iter().any(|re| re.is_match(text))
}

/// A dotted lookup such as `auth.password.reset` or `admin::messages.hello`:
/// it contains a `.` and no whitespace.
pub fn is_translation_key(text: &str) -> bool {
    text.contains('.') && !text.contains(char::is_whitespace)
}

#[derive(Debug, Default)]
pub struct IgnoreRuleSet {
    path_fragments: Vec<String>,
    path_globs: Vec<Pattern>,
    extensions: HashSet<String>,
    files: HashSet<String>,
    namespaces: Vec<String>,
    strings: HashSet<String>,
    patterns: Vec<Regex>,
}

impl IgnoreRuleSet {
    pub fn builder() -> IgnoreRuleSetBuilder {
        IgnoreRuleSetBuilder::default()
    }

    /// Whether `path` (relative to its scan root) is excluded by an ignore-path rule.
    ///
    /// Literal fragments match whole path segments, so `lang` excludes
    /// `lang/en.json` and `resources/lang/x.php` but not `language.php`.
    pub fn is_path_ignored(&self, relative: &Path) -> bool {
        let segments: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        let joined = segments.join("/");

        let fragment_hit = self.path_fragments.iter().any(|fragment| {
            let parts: Vec<&str> = fragment.split('/').filter(|p| !p.is_empty()).collect();
            !parts.is_empty() && segments.windows(parts.len()).any(|w| w == parts.as_slice())
        });

        fragment_hit || self.path_globs.iter().any(|p| p.matches(&joined))
    }

    pub fn is_extension_ignored(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    pub fn is_file_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.files.contains(name))
    }

    pub fn is_namespace_ignored(&self, namespace: Option<&str>) -> bool {
        let Some(namespace) = namespace else {
            return false;
        };
        self.namespaces
            .iter()
            .any(|ignored| namespace.starts_with(ignored.as_str()))
    }

    /// Whether an extracted string passes every string-level axis.
    pub fn accepts_string(&self, text: &str) -> bool {
        if text.trim().chars().count() < 2 || is_structural_noise(text) {
            return false;
        }
        if self.strings.contains(text) {
            return false;
        }
        !self.patterns.iter().any(|re| re.is_match(text))
    }
}

#[derive(Debug, Default)]
pub struct IgnoreRuleSetBuilder {
    paths: Vec<String>,
    extensions: Vec<String>,
    files: Vec<String>,
    namespaces: Vec<String>,
    strings: Vec<String>,
    patterns: Vec<String>,
}

impl IgnoreRuleSetBuilder {
    pub fn paths(mut self, paths: &[String]) -> Self {
        self.paths.extend_from_slice(paths);
        self
    }

    pub fn extensions(mut self, extensions: &[String]) -> Self {
        self.extensions.extend_from_slice(extensions);
        self
    }

    pub fn files(mut self, files: &[String]) -> Self {
        self.files.extend_from_slice(files);
        self
    }

    pub fn namespaces(mut self, namespaces: &[String]) -> Self {
        self.namespaces.extend_from_slice(namespaces);
        self
    }

    pub fn strings(mut self, strings: &[String]) -> Self {
        self.strings.extend_from_slice(strings);
        self
    }

    pub fn patterns(mut self, patterns: &[String]) -> Self {
        self.patterns.extend_from_slice(patterns);
        self
    }

    pub fn build(self) -> IgnoreRuleSet {
        let mut rules = IgnoreRuleSet::default();

        for p in self.paths {
            if is_glob_pattern(&p) {
                match Pattern::new(&p) {
                    Ok(pattern) => rules.path_globs.push(pattern),
                    Err(e) => warn!("Invalid ignore path glob '{}': {}", p, e),
                }
            } else {
                rules.path_fragments.push(p.trim_matches('/').to_string());
            }
        }

        rules.extensions = self
            .extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        rules.files = self.files.into_iter().collect();
        rules.namespaces = self
            .namespaces
            .into_iter()
            .map(|ns| ns.trim_start_matches('\\').to_string())
            .filter(|ns| !ns.is_empty())
            .collect();
        rules.strings = self.strings.into_iter().collect();

        for p in self.patterns {
            match Regex::new(strip_delimiters(&p)) {
                Ok(re) => rules.patterns.push(re),
                Err(e) => warn!("Skipping invalid ignore pattern '{}': {}", p, e),
            }
        }

        rules
    }
}

/// Accept `/^test_/`-style delimited patterns as well as bare regexes.
fn strip_delimiters(pattern: &str) -> &str {
    pattern
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .filter(|p| !p.is_empty())
        .unwrap_or(pattern)
}
