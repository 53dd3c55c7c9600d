//! The find → save → translate pipeline over one scan target.
//!
//! A [`Request`] says which stages to run; [`perform`] runs them against a
//! [`ScanTarget`] with the collaborators held in [`Services`].

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::{ProgressReporter, Scanner, StringTable, TableStore, diff::missing};
use crate::translate::{Orchestrator, Translator};

/// A discovery boundary with its own set of per-language tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// The main application: configured `paths` under `base`.
    Application { base: PathBuf },
    /// One module directory.
    Module { name: String, path: PathBuf },
}

impl ScanTarget {
    pub fn name(&self) -> &str {
        match self {
            ScanTarget::Application { .. } => "application",
            ScanTarget::Module { name, .. } => name,
        }
    }

    /// Directory the target's `langDir` lives in.
    pub fn root(&self) -> &Path {
        match self {
            ScanTarget::Application { base } => base,
            ScanTarget::Module { path, .. } => path,
        }
    }

    pub fn scan_roots(&self, config: &Config) -> Vec<PathBuf> {
        match self {
            ScanTarget::Application { base } => config.paths.iter().map(|p| base.join(p)).collect(),
            ScanTarget::Module { path, .. } => vec![path.clone()],
        }
    }

    /// The table file for `language`: `<root>/<lang_dir>/<language>.json`.
    pub fn table_path(&self, lang_dir: &str, language: &str) -> PathBuf {
        self.root().join(lang_dir).join(format!("{language}.json"))
    }
}

/// Every module under `<base>/<modules_root>`, sorted by name.
///
/// A missing modules directory means no modules.
pub fn discover_modules(base: &Path, modules_root: &str) -> Result<Vec<ScanTarget>> {
    let dir = base.join(modules_root);
    if !dir.is_dir() {
        debug!("No modules directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut modules = Vec::new();
    for entry in fs::read_dir(&dir)
        .with_context(|| format!("Failed to read modules directory: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            modules.push(ScanTarget::Module {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
            });
        }
    }
    modules.sort_by(|a, b| a.name().cmp(b.name()));

    Ok(modules)
}

/// Resolve module names to targets. An unknown name is an error.
pub fn resolve_modules(base: &Path, modules_root: &str, names: &[String]) -> Result<Vec<ScanTarget>> {
    let available = discover_modules(base, modules_root)?;
    names
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|m| m.name() == name)
                .cloned()
                .with_context(|| {
                    format!(
                        "Module '{}' not found in {}",
                        name,
                        base.join(modules_root).display()
                    )
                })
        })
        .collect()
}

/// Which pipeline stages to run. Built with [`Request::builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    find: bool,
    save: bool,
    translate_to: Option<Vec<String>>,
    from: Option<String>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn finds(&self) -> bool {
        self.find
    }

    pub fn saves(&self) -> bool {
        self.save
    }

    pub fn targets(&self) -> Option<&[String]> {
        self.translate_to.as_deref()
    }

    pub fn source_language<'a>(&'a self, config: &'a Config) -> &'a str {
        self.from.as_deref().unwrap_or(&config.from_language)
    }
}

#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Scan the target for strings.
    pub fn find(mut self) -> Self {
        self.request.find = true;
        self
    }

    /// Record newly found strings in the source-language table.
    pub fn save(mut self) -> Self {
        self.request.save = true;
        self
    }

    /// Translate into `languages`. Without `find`, the source table is translated.
    pub fn translate(mut self, languages: Vec<String>) -> Self {
        self.request.translate_to = Some(languages);
        self
    }

    /// Source language, overriding the configured one.
    pub fn from(mut self, language: impl Into<String>) -> Self {
        self.request.from = Some(language.into());
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

/// Collaborators the pipeline runs with.
pub struct Services<T> {
    pub config: Config,
    pub store: TableStore,
    pub translator: Arc<T>,
    pub scan_progress: ProgressReporter,
    pub translate_progress: ProgressReporter,
}

impl<T: Translator> Services<T> {
    pub fn new(config: Config, translator: Arc<T>) -> Self {
        Self {
            config,
            store: TableStore::new(),
            translator,
            scan_progress: ProgressReporter::silent(),
            translate_progress: ProgressReporter::silent(),
        }
    }
}

/// What [`perform`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub files_scanned: usize,
    pub found_strings: usize,
    /// Strings added to the source table.
    pub new_strings: usize,
    /// Translations obtained, per target language.
    pub translations: BTreeMap<String, StringTable>,
    /// Keys left untranslated per target language.
    pub untranslated: BTreeMap<String, Vec<String>>,
}

impl Outcome {
    pub fn untranslated_count(&self) -> usize {
        self.untranslated.values().map(Vec::len).sum()
    }
}

pub async fn perform<T: Translator>(
    target: &ScanTarget,
    request: &Request,
    services: &Services<T>,
) -> Result<Outcome> {
    let config = &services.config;
    let from = request.source_language(config);
    let source_table = target.table_path(&config.lang_dir, from);
    let mut outcome = Outcome::default();
    let mut found: Option<StringTable> = None;

    if request.find {
        let roots = target.scan_roots(config);
        if !roots.iter().any(|r| r.is_dir()) {
            bail!(
                "No scan roots found for {} under {}",
                target.name(),
                target.root().display()
            );
        }

        let result = Scanner::new(config.ignore_rules())
            .with_progress(services.scan_progress.clone())
            .scan(&roots);
        outcome.files_scanned = result.files_processed;
        outcome.found_strings = result.strings.len();
        info!(
            "{}: found {} strings in {} files",
            target.name(),
            result.strings.len(),
            result.files_processed
        );

        let strings: StringTable = result.strings.into_iter().map(|s| (s.clone(), s)).collect();

        if request.save {
            let new = missing(&strings, &services.store.read(&source_table));
            outcome.new_strings = new.len();
            if !new.is_empty() {
                services.store.merge(&source_table, &new)?;
            }
        }

        found = Some(strings);
    }

    if let Some(languages) = &request.translate_to {
        let strings = match found {
            Some(strings) => strings,
            None => services.store.read(&source_table),
        };
        let languages: Vec<String> = languages.iter().filter(|l| *l != from).cloned().collect();

        let resolver = target.clone();
        let lang_dir = config.lang_dir.clone();
        let orchestrator =
            Orchestrator::new(Arc::clone(&services.translator), config.orchestrator_options())
                .with_tables(services.store.clone(), move |language| {
                    resolver.table_path(&lang_dir, language)
                })
                .with_progress(services.translate_progress.clone());

        let report = orchestrator.translate(&strings, from, &languages).await?;
        outcome.translations = report.translations;
        outcome.untranslated = report.untranslated;
    }

    Ok(outcome)
}
