//! Parses the model's raw reply into a [`Suggestion`].
//!
//! The reply is expected to be a JSON object, possibly wrapped in prose or a
//! code fence, and possibly cut off by the output token limit. Repair only
//! closes an unterminated string and unbalanced braces at the end of a
//! truncated reply. A reply that ends with `}` and still fails to parse is
//! reported as malformed.

use serde_json::{Map, Value};

use assetry_core::{Error, Result, Suggestion};

/// A successfully parsed reply and whether repair was needed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    WellFormed(Suggestion),
    Repaired(Suggestion),
}

impl ParseOutcome {
    pub fn suggestion(&self) -> &Suggestion {
        match self {
            Self::WellFormed(s) | Self::Repaired(s) => s,
        }
    }

    pub fn into_suggestion(self) -> Suggestion {
        match self {
            Self::WellFormed(s) | Self::Repaired(s) => s,
        }
    }

    pub fn is_repaired(&self) -> bool {
        matches!(self, Self::Repaired(_))
    }
}

pub struct SuggestionResponseParser;

impl SuggestionResponseParser {
    /// Parse a raw reply. Malformed replies yield [`Error::SuggestionParse`].
    pub fn parse(raw: &str) -> Result<ParseOutcome> {
        let candidate = extract_candidate(raw);

        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => Ok(ParseOutcome::WellFormed(to_suggestion(value)?)),
            Err(strict_err) => {
                let repaired = match repair_truncated(candidate) {
                    Some(repaired) => repaired,
                    None => return Err(Error::SuggestionParse(strict_err.to_string())),
                };
                let value = serde_json::from_str::<Value>(&repaired)
                    .map_err(|e| Error::SuggestionParse(e.to_string()))?;
                Ok(ParseOutcome::Repaired(to_suggestion(value)?))
            }
        }
    }
}

/// The substring from the first `{` to the last `}`, inclusive. Falls back to
/// the whole trimmed text when there is no such span.
pub fn extract_candidate(raw: &str) -> &str {
    let text = raw.trim();
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Close a truncated candidate: a dangling string gets its closing quote, then
/// one `}` is appended per unmatched `{`. Returns `None` when the candidate
/// already ends with `}` (it was not truncated).
pub fn repair_truncated(candidate: &str) -> Option<String> {
    if candidate.ends_with('}') {
        return None;
    }

    let mut repaired = candidate.to_string();
    if candidate.matches('"').count() % 2 == 1 {
        repaired.push('"');
    }
    let opens = candidate.matches('{').count();
    let closes = candidate.matches('}').count();
    for _ in closes..opens {
        repaired.push('}');
    }
    Some(repaired)
}

fn to_suggestion(value: Value) -> Result<Suggestion> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(Error::SuggestionParse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(Suggestion {
        title: string_field(&object, "title"),
        description: string_field(&object, "description"),
        alt_text: string_field(&object, "altText"),
        tags: object.get("tags").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        }),
    })
}

/// A trimmed string value. Wrong types and blank strings are omitted.
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_reply() {
        let outcome = SuggestionResponseParser::parse(r#"{"title":"Sunset","tags":["a","b"]}"#)
            .unwrap();
        assert!(!outcome.is_repaired());
        let s = outcome.suggestion();
        assert_eq!(s.title.as_deref(), Some("Sunset"));
        assert_eq!(s.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(s.description.is_none());
    }

    #[test]
    fn test_truncated_reply_is_repaired() {
        let outcome =
            SuggestionResponseParser::parse(r#"{"title":"Sunset","description":"A nice"#).unwrap();
        assert!(outcome.is_repaired());
        let s = outcome.into_suggestion();
        assert_eq!(s.title.as_deref(), Some("Sunset"));
        assert_eq!(s.description.as_deref(), Some("A nice"));
    }

    #[test]
    fn test_truncated_nested_reply_closes_every_brace() {
        let outcome =
            SuggestionResponseParser::parse(r#"{"title":"Sunset","extra":{"note":"cut"#).unwrap();
        assert!(outcome.is_repaired());
        assert_eq!(outcome.suggestion().title.as_deref(), Some("Sunset"));
    }

    #[test]
    fn test_prose_and_code_fence_are_stripped() {
        let raw = "Sure! Here is the metadata:\n```json\n{\"title\": \"  Harbor at dawn \", \"altText\": \"Boats in a calm harbor\"}\n```";
        let outcome = SuggestionResponseParser::parse(raw).unwrap();
        assert!(!outcome.is_repaired());
        let s = outcome.suggestion();
        assert_eq!(s.title.as_deref(), Some("Harbor at dawn"));
        assert_eq!(s.alt_text.as_deref(), Some("Boats in a calm harbor"));
    }

    #[test]
    fn test_complete_but_invalid_reply_is_not_repaired() {
        let err = SuggestionResponseParser::parse(r#"{"title": "Sunset",}"#).unwrap_err();
        assert!(matches!(err, Error::SuggestionParse(_)));
    }

    #[test]
    fn test_unrepairable_truncation_is_malformed() {
        let err = SuggestionResponseParser::parse(r#"{"title":"Sunset","tags":["a","#)
            .unwrap_err();
        assert!(matches!(err, Error::SuggestionParse(_)));
    }

    #[test]
    fn test_non_json_and_non_object_replies_fail() {
        assert!(matches!(
            SuggestionResponseParser::parse("I cannot help with that.").unwrap_err(),
            Error::SuggestionParse(_)
        ));
        assert!(matches!(
            SuggestionResponseParser::parse(r#"["a","b"]"#).unwrap_err(),
            Error::SuggestionParse(_)
        ));
    }

    #[test]
    fn test_wrong_typed_fields_are_omitted() {
        let raw = r#"{"title": 42, "description": ["x"], "altText": "  ", "tags": ["ok", 7, null, "fine"]}"#;
        let s = SuggestionResponseParser::parse(raw).unwrap().into_suggestion();
        assert!(s.title.is_none());
        assert!(s.description.is_none());
        assert!(s.alt_text.is_none());
        assert_eq!(s.tags, Some(vec!["ok".to_string(), "fine".to_string()]));
    }

    #[test]
    fn test_tags_not_an_array_is_absent() {
        let s = SuggestionResponseParser::parse(r#"{"title":"T","tags":"a, b"}"#)
            .unwrap()
            .into_suggestion();
        assert!(s.tags.is_none());
    }

    #[test]
    fn test_extract_candidate() {
        assert_eq!(extract_candidate("  x {\"a\":1} y "), "{\"a\":1}");
        assert_eq!(extract_candidate("no braces"), "no braces");
        assert_eq!(extract_candidate("} before {"), "} before {");
    }

    #[test]
    fn test_repair_truncated() {
        assert_eq!(repair_truncated("{\"a\":1}"), None);
        assert_eq!(
            repair_truncated("{\"a\":\"b").as_deref(),
            Some("{\"a\":\"b\"}")
        );
        assert_eq!(
            repair_truncated("{\"a\":{\"b\":1").as_deref(),
            Some("{\"a\":{\"b\":1}}")
        );
    }
}
