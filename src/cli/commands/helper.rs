use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};

use super::TargetSummary;
use crate::cli::{args::CommonArgs, report};
use crate::config::{Config, load_config};
use crate::pipeline::{Request, ScanTarget, Services, discover_modules, perform, resolve_modules};
use crate::translate::{AiSettings, AiTranslator};

/// Configuration and targets resolved from the command line.
pub struct CommandContext {
    pub config: Config,
    pub project_root: PathBuf,
    pub targets: Vec<ScanTarget>,
    pub verbose: bool,
}

impl CommandContext {
    pub fn new(common: &CommonArgs) -> Result<Self> {
        let start = match &common.root {
            Some(root) => root.clone(),
            None => env::current_dir().context("Failed to read current directory")?,
        };
        let loaded = load_config(&start)?;
        let project_root = if common.root.is_some() {
            start
        } else {
            loaded.project_root
        };

        let mut config = loaded.config;
        if let Some(from) = &common.from {
            config.from_language = from.clone();
        }
        if !common.to.is_empty() {
            config.to_languages = common.to.clone();
        }
        if let Some(key) = &common.api_key {
            config.ai.api_key = key.clone();
        }

        let targets = resolve_targets(common, &config, &project_root)?;

        Ok(Self {
            config,
            project_root,
            targets,
            verbose: common.verbose,
        })
    }

    pub fn services(&self) -> Result<Services<AiTranslator>> {
        let translator = AiTranslator::new(AiSettings::from_config(&self.config))?;
        let mut services = Services::new(self.config.clone(), Arc::new(translator));
        services.scan_progress = report::scan_progress(self.verbose);
        services.translate_progress = report::translate_progress(self.verbose);
        Ok(services)
    }

    /// Run `request` against every target in order.
    pub async fn run(&self, request: &Request) -> Result<Vec<TargetSummary>> {
        let services = self.services()?;
        let from = request.source_language(&self.config);
        let mut summaries = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            report::print_target_header(target, &self.project_root);
            let outcome = perform(target, request, &services)
                .await
                .with_context(|| format!("Failed to process {}", target.name()))?;
            let table = target.table_path(&self.config.lang_dir, from);
            let table = table
                .strip_prefix(&self.project_root)
                .map(Path::to_path_buf)
                .unwrap_or(table);
            summaries.push(TargetSummary {
                target: target.name().to_string(),
                table,
                outcome,
            });
        }

        Ok(summaries)
    }

    pub fn target_languages(&self) -> Result<Vec<String>> {
        if self.config.to_languages.is_empty() {
            bail!("No target languages configured. Set 'toLanguages' or pass --to");
        }
        Ok(self.config.to_languages.clone())
    }
}

/// The application unless only `--modules` was given, plus the requested modules.
fn resolve_targets(
    common: &CommonArgs,
    config: &Config,
    project_root: &Path,
) -> Result<Vec<ScanTarget>> {
    let mut targets = Vec::new();

    if common.app || common.modules.is_none() {
        targets.push(ScanTarget::Application {
            base: project_root.to_path_buf(),
        });
    }

    match &common.modules {
        Some(names) if names.is_empty() => {
            let modules = discover_modules(project_root, &config.modules_root)?;
            if modules.is_empty() && targets.is_empty() {
                bail!(
                    "No modules found in {}",
                    project_root.join(&config.modules_root).display()
                );
            }
            targets.extend(modules);
        }
        Some(names) => {
            targets.extend(resolve_modules(project_root, &config.modules_root, names)?);
        }
        None => {}
    }

    Ok(targets)
}
