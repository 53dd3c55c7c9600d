//! Langsweep - translation string finder and AI translator for PHP projects
//!
//! Langsweep scans PHP sources for translatable strings (`__()`, `trans()`,
//! `@lang()` and friends), records new ones in per-language JSON tables, and
//! fills the missing entries of every target language through an AI chat
//! completion API.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Discovery, ignore rules, table storage and diffing
//! - `pipeline`: Scan targets and the find/save/translate request
//! - `translate`: Translator seam, AI client and chunk orchestration

pub mod cli;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod translate;
