//! Persisted per-language string tables.
//!
//! A table is a flat JSON object mapping source strings to translations, one
//! file per (scan root, language). Writes go through a temp file in the same
//! directory and are renamed into place, and merges into the same file are
//! serialized by a per-path lock.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{self, Write},
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub type StringTable = BTreeMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct TableStore {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a table. A missing file is an empty table; so is a malformed one,
    /// with a warning.
    pub fn read(&self, path: &Path) -> StringTable {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return StringTable::new(),
            Err(e) => {
                warn!("Cannot read table {}: {}, treating as empty", path.display(), e);
                return StringTable::new();
            }
        };

        if content.trim().is_empty() {
            return StringTable::new();
        }

        match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                warn!("Malformed table {}: {}, treating as empty", path.display(), e);
                StringTable::new()
            }
        }
    }

    /// Overlay `entries` onto the persisted table and write the union back.
    ///
    /// On a key collision the incoming value wins. Returns the merged table.
    pub fn merge(&self, path: &Path, entries: &StringTable) -> Result<StringTable> {
        let lock = self.lock_for(path);
        let _guard = lock.lock();

        let mut table = self.read(path);
        table.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        write_atomic(path, &table)?;

        debug!(
            "Merged {} entries into {} ({} total)",
            entries.len(),
            path.display(),
            table.len()
        );
        Ok(table)
    }

    /// Merge a set of strings as identity entries (key and value both the string).
    pub fn merge_strings<'a, I>(&self, path: &Path, strings: I) -> Result<StringTable>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let entries: StringTable = strings.into_iter().map(|s| (s.clone(), s.clone())).collect();
        self.merge(path, &entries)
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let key = lock_key(path);
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(key).or_default())
    }
}

/// Absolute, lexically normalized spelling of `path`, so that every spelling
/// of one table shares a lock. Symlinks are not resolved.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                key.pop();
            }
            other => key.push(other),
        }
    }
    key
}

fn write_atomic(path: &Path, table: &StringTable) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    file.write_all(&to_pretty_json(table)?)
        .with_context(|| format!("Failed to write table: {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to replace table: {}", path.display()))?;

    Ok(())
}

fn to_pretty_json(table: &StringTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    table
        .serialize(&mut serializer)
        .context("Failed to serialize table")?;
    buf.push(b'\n');
    Ok(buf)
}
