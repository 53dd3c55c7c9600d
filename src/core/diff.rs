use std::collections::BTreeMap;

/// Entries of `candidates` whose key is absent from `existing`.
///
/// Used both to find newly discovered strings against the source table and
/// to find what still needs translating against one target table.
pub fn missing(
    candidates: &BTreeMap<String, String>,
    existing: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    candidates
        .iter()
        .filter(|(key, _)| !existing.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
