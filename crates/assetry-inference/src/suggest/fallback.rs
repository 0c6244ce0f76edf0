//! Deterministic suggestions derived from the filename alone.

use assetry_core::{reconcile_tags, Suggestion, SuggestionContext};

/// Turn a filename into a readable title: drop the extension, turn `-` and `_`
/// into spaces, collapse whitespace and upper-case the first letter of each
/// word. Returns `None` when nothing readable is left.
pub fn title_from_filename(filename: &str) -> Option<String> {
    let name = filename.trim();
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.trim().is_empty() => stem,
        _ => name,
    };

    let title = stem
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The suggestion used when inference is skipped or fails: filename title plus
/// the media type's default tags.
pub fn fallback_suggestion(ctx: &SuggestionContext) -> Suggestion {
    Suggestion {
        title: title_from_filename(&ctx.filename),
        description: None,
        alt_text: None,
        tags: reconcile_tags(None, ctx.default_tags()),
    }
}
