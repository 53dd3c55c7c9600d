//! Protecting text across a translator round trip.
//!
//! Interpolation placeholders (`:name`, `:count`) are swapped for opaque
//! numbered tokens, and double quotes for [`QUOTE_TOKEN`], before a chunk is
//! sent. The response is mapped back to the original keys and the tokens
//! restored.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::core::StringTable;

pub const QUOTE_TOKEN: &str = "@@QUOTE@@";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[A-Za-z_][A-Za-z0-9_]*").expect("valid regex"));

fn token(index: usize) -> String {
    format!("[[{index}]]")
}

/// Replace every placeholder not preceded by a backslash with a numbered token.
///
/// Returns the masked text and the placeholders in token order.
pub fn mask_placeholders(text: &str) -> (String, Vec<String>) {
    let mut masked = String::with_capacity(text.len());
    let mut placeholders = Vec::new();
    let mut last = 0;

    for m in PLACEHOLDER.find_iter(text) {
        if text[..m.start()].ends_with('\\') {
            continue;
        }
        masked.push_str(&text[last..m.start()]);
        masked.push_str(&token(placeholders.len()));
        placeholders.push(m.as_str().to_string());
        last = m.end();
    }
    masked.push_str(&text[last..]);

    (masked, placeholders)
}

pub fn unmask_placeholders(text: &str, placeholders: &[String]) -> String {
    placeholders
        .iter()
        .enumerate()
        .fold(text.to_string(), |acc, (i, placeholder)| {
            acc.replace(&token(i), placeholder)
        })
}

pub fn escape_quotes(text: &str) -> String {
    text.replace('"', QUOTE_TOKEN)
}

pub fn restore_quotes(text: &str) -> String {
    text.replace(QUOTE_TOKEN, "\"")
}

struct MaskedEntry {
    original_key: String,
    placeholders: Vec<String>,
}

/// A chunk prepared for the translator, remembering how to undo the masking.
pub struct MaskedChunk {
    entries: StringTable,
    originals: HashMap<String, MaskedEntry>,
}

impl MaskedChunk {
    pub fn new(chunk: &StringTable) -> Self {
        let mut entries = StringTable::new();
        let mut originals = HashMap::with_capacity(chunk.len());

        for (key, value) in chunk {
            let masked_key = escape_quotes(key);
            let (masked_value, placeholders) = mask_placeholders(value);
            entries.insert(masked_key.clone(), escape_quotes(&masked_value));
            originals.insert(
                masked_key,
                MaskedEntry {
                    original_key: key.clone(),
                    placeholders,
                },
            );
        }

        Self { entries, originals }
    }

    /// What the translator should see.
    pub fn entries(&self) -> &StringTable {
        &self.entries
    }

    /// Map a translator response back to original keys and unmasked text.
    ///
    /// Keys that were never requested and empty translations are dropped.
    pub fn restore(&self, response: StringTable) -> StringTable {
        response
            .into_iter()
            .filter_map(|(key, translated)| {
                let entry = self.originals.get(&key)?;
                let text = unmask_placeholders(&restore_quotes(&translated), &entry.placeholders);
                (!text.trim().is_empty()).then(|| (entry.original_key.clone(), text))
            })
            .collect()
    }
}
