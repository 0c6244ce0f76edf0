//! Tag normalization and reconciliation of AI tags with media type defaults.

use std::collections::HashSet;

/// Canonical form of a tag: trimmed and lowercased.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalize and deduplicate, keeping first-seen order. Tags that are empty
/// after trimming are dropped.
pub fn normalize_tags<'a, I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Merge parsed AI tags with a media type's default tags.
///
/// | parsed  | defaults  | result                                  |
/// |---------|-----------|-----------------------------------------|
/// | present | any       | normalize-dedup(defaults ++ parsed)     |
/// | absent  | non-empty | defaults, unchanged                     |
/// | absent  | empty     | `None` (the suggestion omits `tags`)    |
pub fn reconcile_tags(parsed: Option<&[String]>, defaults: &[String]) -> Option<Vec<String>> {
    match parsed {
        Some(parsed) => Some(normalize_tags(defaults.iter().chain(parsed.iter()))),
        None if !defaults.is_empty() => Some(defaults.to_vec()),
        None => None,
    }
}
