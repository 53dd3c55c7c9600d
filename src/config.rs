use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{IgnoreRuleSet, is_glob_pattern};
use crate::translate::{OrchestratorOptions, Provider};

pub const CONFIG_FILE_NAME: &str = ".langsweeprc.json";

/// Environment variable consulted for the provider API key.
pub const API_KEY_ENV: &str = "LANGSWEEP_AI_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_from_language")]
    pub from_language: String,
    #[serde(default = "default_to_languages")]
    pub to_languages: Vec<String>,
    /// Extra context handed to the translator's system prompt.
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_paths")]
    pub paths: Vec<String>,
    #[serde(default = "default_lang_dir")]
    pub lang_dir: String,
    #[serde(default = "default_modules_root")]
    pub modules_root: String,
    #[serde(default)]
    pub finder: FinderConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinderConfig {
    /// Added to the built-in ignore paths, never replacing them.
    #[serde(default = "default_ignore_paths")]
    pub ignore_paths: Vec<String>,
    /// Added to the built-in ignore extensions, never replacing them.
    #[serde(default = "default_ignore_extensions")]
    pub ignore_extensions: Vec<String>,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub ignore_namespaces: Vec<String>,
    #[serde(default)]
    pub ignore_strings: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_concurrent")]
    pub concurrent: bool,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_from_language() -> String {
    "en".to_string()
}

fn default_to_languages() -> Vec<String> {
    ["es_ES", "pt_BR"].map(String::from).to_vec()
}

fn default_paths() -> Vec<String> {
    ["app", "resources", "routes", "config", "database"]
        .map(String::from)
        .to_vec()
}

fn default_lang_dir() -> String {
    "lang".to_string()
}

fn default_modules_root() -> String {
    "Modules".to_string()
}

fn default_ignore_paths() -> Vec<String> {
    [
        "vendor",
        "node_modules",
        "storage",
        "bootstrap",
        "public",
        "lang",
    ]
    .map(String::from)
    .to_vec()
}

fn default_ignore_extensions() -> Vec<String> {
    ["json", "md", "txt", "log"].map(String::from).to_vec()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_chunk_size() -> usize {
    15
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_concurrent() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    3
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            ignore_paths: default_ignore_paths(),
            ignore_extensions: default_ignore_extensions(),
            ignore_files: Vec::new(),
            ignore_namespaces: Vec::new(),
            ignore_strings: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: String::new(),
            api_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            concurrent: default_concurrent(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            from_language: default_from_language(),
            to_languages: default_to_languages(),
            context: String::new(),
            paths: default_paths(),
            lang_dir: default_lang_dir(),
            modules_root: default_modules_root(),
            finder: FinderConfig::default(),
            ai: AiConfig::default(),
            translation: TranslationConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Invalid regexes in `finder.ignorePatterns` are not an error here: the
    /// scanner skips them with a warning.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.finder.ignore_paths {
            if is_glob_pattern(pattern) {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'finder.ignorePaths': \"{}\"", pattern)
                })?;
            }
        }

        if self.translation.chunk_size == 0 {
            bail!("'translation.chunkSize' must be greater than 0");
        }
        if self.translation.max_concurrent == 0 {
            bail!("'translation.maxConcurrent' must be greater than 0");
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            bail!(
                "'ai.temperature' must be between 0.0 and 2.0, got {}",
                self.ai.temperature
            );
        }

        Ok(())
    }

    pub fn ignore_rules(&self) -> IgnoreRuleSet {
        IgnoreRuleSet::builder()
            .paths(&with_defaults(default_ignore_paths(), &self.finder.ignore_paths))
            .extensions(&with_defaults(
                default_ignore_extensions(),
                &self.finder.ignore_extensions,
            ))
            .files(&self.finder.ignore_files)
            .namespaces(&self.finder.ignore_namespaces)
            .strings(&self.finder.ignore_strings)
            .patterns(&self.finder.ignore_patterns)
            .build()
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        let t = &self.translation;
        OrchestratorOptions {
            chunk_size: t.chunk_size,
            max_retries: t.max_retries,
            retry_delay: Duration::from_secs(t.retry_delay_secs),
            concurrent: t.concurrent,
            max_concurrent: t.max_concurrent,
            call_timeout: None,
        }
    }

    pub fn provider(&self) -> Provider {
        self.ai.provider.parse().unwrap_or_default()
    }

    /// The configured API key, falling back to the environment.
    ///
    /// The CLI writes `--api-key` (or the environment variable, through clap)
    /// into `ai.apiKey` before this is called, so an explicit flag wins.
    pub fn api_key(&self) -> Option<String> {
        Some(self.ai.api_key.clone())
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()))
    }
}

/// `defaults` followed by the user's entries that are not already in it.
fn with_defaults(mut defaults: Vec<String>, extra: &[String]) -> Vec<String> {
    for item in extra {
        if !defaults.contains(item) {
            defaults.push(item.clone());
        }
    }
    defaults
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory containing the config file, or the start directory.
    pub project_root: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let project_root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                project_root,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            project_root: start_dir.to_path_buf(),
        }),
    }
}
