//! Translation layer: the translator boundary, the HTTP client behind it, and
//! the orchestrator that drives chunks through it.

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod placeholder;
pub mod prompt;
pub mod provider;

use std::future::Future;

use crate::core::StringTable;

pub use client::{AiSettings, AiTranslator};
pub use error::TranslatorError;
pub use orchestrator::{Orchestrator, OrchestratorOptions, TranslationReport};
pub use provider::Provider;

/// One chunk of strings to translate between two languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest {
    pub from: String,
    pub to: String,
    pub entries: StringTable,
}

/// Something that turns a chunk of source strings into translations.
///
/// The returned map may hold only some of the requested keys, or none: an
/// omission is the normal failure signal, picked up by the orchestrator's
/// reconciliation. Implementations handle their own transient errors.
pub trait Translator: Send + Sync + 'static {
    fn translate(&self, request: &ChunkRequest) -> impl Future<Output = StringTable> + Send;
}
