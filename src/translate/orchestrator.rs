//! Translation orchestration.
//!
//! For every target language the orchestrator diffs the input against that
//! language's persisted table, splits what is missing into chunks, and sends
//! the chunks through the [`Translator`]. All chunks of one `translate` call,
//! across every language, share a single pool: at most `max_concurrent` run
//! at once, in waves, and a wave finishes before the next one starts. Each
//! chunk's result is merged into its table as soon as it arrives.
//!
//! Keys the translator left out are retried afterwards, sequentially, until
//! they are all present or `max_retries` consecutive rounds made no progress.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Result, bail};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::core::{
    Progress, ProgressReporter, StringTable, TableStore,
    diff::missing,
};
use crate::translate::{ChunkRequest, Translator, placeholder::MaskedChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub chunk_size: usize,
    /// Consecutive reconciliation rounds without progress before giving up.
    pub max_retries: u32,
    /// Base delay between unproductive reconciliation rounds.
    pub retry_delay: Duration,
    /// Dispatch chunks in parallel waves rather than one at a time.
    pub concurrent: bool,
    pub max_concurrent: usize,
    /// Upper bound on a single translator call. A call that overruns counts
    /// as an empty result.
    pub call_timeout: Option<Duration>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            chunk_size: 15,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            concurrent: true,
            max_concurrent: 3,
            call_timeout: None,
        }
    }
}

/// What a `translate` call produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranslationReport {
    /// Translations obtained in this call, per target language.
    pub translations: BTreeMap<String, StringTable>,
    /// Keys still missing per language after reconciliation gave up.
    pub untranslated: BTreeMap<String, Vec<String>>,
}

impl TranslationReport {
    pub fn is_complete(&self) -> bool {
        self.untranslated.values().all(Vec::is_empty)
    }

    pub fn untranslated_count(&self) -> usize {
        self.untranslated.values().map(Vec::len).sum()
    }
}

type TableResolver = Arc<dyn Fn(&str) -> PathBuf + Send + Sync>;

struct Persistence {
    store: TableStore,
    resolve: TableResolver,
}

struct Job {
    language: String,
    entries: StringTable,
}

pub struct Orchestrator<T> {
    translator: Arc<T>,
    options: OrchestratorOptions,
    persistence: Option<Persistence>,
    progress: ProgressReporter,
}

impl<T: Translator> Orchestrator<T> {
    pub fn new(translator: Arc<T>, options: OrchestratorOptions) -> Self {
        Self {
            translator,
            options,
            persistence: None,
            progress: ProgressReporter::silent(),
        }
    }

    /// Diff against and save into the tables `resolve` locates per language.
    ///
    /// Without tables every string is translated and nothing is written.
    pub fn with_tables(
        mut self,
        store: TableStore,
        resolve: impl Fn(&str) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        self.persistence = Some(Persistence {
            store,
            resolve: Arc::new(resolve),
        });
        self
    }

    /// Receive one event per completed chunk, carrying `language`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub async fn translate(
        &self,
        strings: &StringTable,
        from: &str,
        to: &[String],
    ) -> Result<TranslationReport> {
        if to.is_empty() {
            bail!("No target languages configured");
        }

        let mut pending: BTreeMap<String, StringTable> = BTreeMap::new();
        for language in to {
            let needed = match &self.persistence {
                Some(p) => missing(strings, &p.store.read(&(p.resolve)(language))),
                None => strings.clone(),
            };
            info!(
                "{}: {} of {} strings need translating",
                language,
                needed.len(),
                strings.len()
            );
            pending.insert(language.clone(), needed);
        }

        let jobs: Vec<Job> = pending
            .iter()
            .flat_map(|(language, entries)| {
                chunk(entries, self.options.chunk_size)
                    .into_iter()
                    .map(|entries| Job {
                        language: language.clone(),
                        entries,
                    })
            })
            .collect();

        let mut report = TranslationReport {
            translations: pending
                .keys()
                .map(|language| (language.clone(), StringTable::new()))
                .collect(),
            untranslated: BTreeMap::new(),
        };

        self.dispatch(jobs, from, &mut report.translations).await;

        for (language, requested) in &pending {
            let received = report.translations.entry(language.clone()).or_default();
            let left = self.reconcile(language, requested, from, received).await;
            report.untranslated.insert(language.clone(), left);
        }

        Ok(report)
    }

    async fn dispatch(
        &self,
        jobs: Vec<Job>,
        from: &str,
        results: &mut BTreeMap<String, StringTable>,
    ) {
        let total = jobs.len();
        let mut processed = 0;

        if !self.options.concurrent || self.options.max_concurrent <= 1 {
            for job in jobs {
                let translated = translate_chunk(
                    self.translator.as_ref(),
                    from,
                    &job.language,
                    &job.entries,
                    self.options.call_timeout,
                )
                .await;
                processed += 1;
                self.accept(&job.language, translated, results, processed, total);
            }
            return;
        }

        let mut jobs = jobs.into_iter();
        loop {
            let wave: Vec<Job> = jobs.by_ref().take(self.options.max_concurrent).collect();
            if wave.is_empty() {
                break;
            }
            debug!("Dispatching wave of {} chunks", wave.len());

            let mut set = JoinSet::new();
            for job in wave {
                let translator = Arc::clone(&self.translator);
                let from = from.to_string();
                let timeout = self.options.call_timeout;
                set.spawn(async move {
                    let translated =
                        translate_chunk(translator.as_ref(), &from, &job.language, &job.entries, timeout)
                            .await;
                    (job.language, translated)
                });
            }

            while let Some(joined) = set.join_next().await {
                processed += 1;
                match joined {
                    Ok((language, translated)) => {
                        self.accept(&language, translated, results, processed, total)
                    }
                    Err(e) => {
                        error!("Translation task failed: {}", e);
                        self.progress.report(Progress::new(processed, total));
                    }
                }
            }
        }
    }

    fn accept(
        &self,
        language: &str,
        translated: StringTable,
        results: &mut BTreeMap<String, StringTable>,
        processed: usize,
        total: usize,
    ) {
        if !translated.is_empty() {
            self.persist(language, &translated);
            results
                .entry(language.to_string())
                .or_default()
                .extend(translated);
        }
        self.progress
            .report(Progress::new(processed, total).with("language", language));
    }

    /// Re-request keys the translator left out. Returns the keys still missing.
    async fn reconcile(
        &self,
        language: &str,
        requested: &StringTable,
        from: &str,
        received: &mut StringTable,
    ) -> Vec<String> {
        let mut left = missing(requested, received);
        let mut failures = 0;

        while !left.is_empty() && failures < self.options.max_retries {
            info!("{}: retrying {} untranslated strings", language, left.len());

            let before = left.len();
            for entries in chunk(&left, self.options.chunk_size) {
                let translated = translate_chunk(
                    self.translator.as_ref(),
                    from,
                    language,
                    &entries,
                    self.options.call_timeout,
                )
                .await;
                if !translated.is_empty() {
                    self.persist(language, &translated);
                    received.extend(translated);
                }
            }

            left = missing(requested, received);
            failures = if left.len() < before { 0 } else { failures + 1 };

            if !left.is_empty() && failures > 0 && failures < self.options.max_retries {
                let delay = self.options.retry_delay.saturating_mul(failures);
                debug!("{}: no progress, waiting {:?}", language, delay);
                tokio::time::sleep(delay).await;
            }
        }

        let left: Vec<String> = left.into_keys().collect();
        if !left.is_empty() {
            error!(
                "{}: failed to translate {} strings after {} retries: {}",
                language,
                left.len(),
                failures,
                left.join(", ")
            );
        }
        left
    }

    fn persist(&self, language: &str, translated: &StringTable) {
        let Some(p) = &self.persistence else {
            return;
        };
        let path = (p.resolve)(language);
        if let Err(e) = p.store.merge(&path, translated) {
            error!("Failed to save translations to {}: {:#}", path.display(), e);
        }
    }
}

/// Mask, send, and restore one chunk.
async fn translate_chunk<T: Translator>(
    translator: &T,
    from: &str,
    to: &str,
    entries: &StringTable,
    timeout: Option<Duration>,
) -> StringTable {
    let masked = MaskedChunk::new(entries);
    let request = ChunkRequest {
        from: from.to_string(),
        to: to.to_string(),
        entries: masked.entries().clone(),
    };

    let response = match timeout {
        Some(limit) => match tokio::time::timeout(limit, translator.translate(&request)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(
                    "Translator call for {} strings ({} -> {}) timed out after {:?}",
                    entries.len(),
                    from,
                    to,
                    limit
                );
                StringTable::new()
            }
        },
        None => translator.translate(&request).await,
    };

    masked.restore(response)
}

/// Split `entries` into maps of at most `size` entries, in key order.
fn chunk(entries: &StringTable, size: usize) -> Vec<StringTable> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(entries.len().div_ceil(size));
    let mut current = StringTable::new();

    for (key, value) in entries {
        current.insert(key.clone(), value.clone());
        if current.len() == size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
