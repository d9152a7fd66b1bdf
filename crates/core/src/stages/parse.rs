//! # Response Parsing
//!
//! Lenient extraction of JSON from completion text plus field accessors that
//! drop malformed list/map entries instead of rejecting the whole response.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Why a service response could not become a record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object found in response: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' should be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("no valid entries left in '{0}'")]
    NothingValid(&'static str),
}

/// Find the JSON object in completion text.
///
/// Accepts bare JSON, JSON inside a ```` ```json ```` fence, and JSON
/// surrounded by prose. In prose, brace spans that are not valid JSON
/// (for example `{name}`) are skipped and scanning resumes at the next `{`.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidJson("empty response".to_string()));
    }

    let mut last_err = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if value.is_object() => return Ok(value),
        Ok(_) => return Err(ParseError::NotAnObject),
        Err(e) => e.to_string(),
    };

    if let Some(fenced) = json_fence(trimmed) {
        match serde_json::from_str::<Value>(fenced) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => return Err(ParseError::NotAnObject),
            Err(e) => last_err = e.to_string(),
        }
    }

    for (start, _) in trimmed.match_indices('{') {
        let Some(block) = balanced_block(&trimmed[start..]) else {
            continue;
        };
        match serde_json::from_str::<Value>(block) {
            Ok(value) => return Ok(value),
            Err(e) => last_err = e.to_string(),
        }
    }
    Err(ParseError::InvalidJson(last_err))
}

/// Body of the first ```` ```json ```` fence
fn json_fence(text: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    let body = &text[text.find(OPEN)? + OPEN.len()..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Balanced `{...}` prefix of `text`, skipping braces inside strings.
/// `text` must start with `{`.
fn balanced_block(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn as_object(value: &Value) -> Result<&Map<String, Value>, ParseError> {
    value.as_object().ok_or(ParseError::NotAnObject)
}

/// Numeric value, accepting numeric strings such as `"72"` or `" 4.5 "`
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

pub fn required_str(obj: &Map<String, Value>, field: &'static str) -> Result<String, ParseError> {
    match present(obj, field) {
        None => Err(ParseError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// String field that defaults to empty when absent
pub fn optional_str(obj: &Map<String, Value>, field: &'static str) -> Result<String, ParseError> {
    match present(obj, field) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// List of strings; non-string and blank entries are dropped
pub fn string_list(
    obj: &Map<String, Value>,
    field: &'static str,
    required: bool,
) -> Result<Vec<String>, ParseError> {
    match present(obj, field) {
        None if required => Err(ParseError::MissingField(field)),
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "a list",
        }),
    }
}

/// Map of numbers; entries whose value is not numeric are dropped
pub fn number_map(
    obj: &Map<String, Value>,
    field: &'static str,
    required: bool,
) -> Result<BTreeMap<String, f64>, ParseError> {
    match present(obj, field) {
        None if required => Err(ParseError::MissingField(field)),
        None => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .filter_map(|(key, value)| number(value).map(|n| (key.clone(), n)))
            .collect()),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "an object",
        }),
    }
}

/// Map of strings; entries whose value is not a string are dropped
pub fn string_map(
    obj: &Map<String, Value>,
    field: &'static str,
    required: bool,
) -> Result<BTreeMap<String, String>, ParseError> {
    match present(obj, field) {
        None if required => Err(ParseError::MissingField(field)),
        None => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
            .collect()),
        Some(_) => Err(ParseError::WrongType {
            field,
            expected: "an object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_bare_json() {
        let value = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here you go:\n```json\n{\"summary\": \"ok {fine}\"}\n```\nThanks!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["summary"], "ok {fine}");
    }

    #[test]
    fn test_extract_skips_prose_braces_before_fence() {
        let text = "Here is the profile for {name}:\n```json\n{\"summary\": \"ok\"}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_extract_skips_prose_braces_without_fence() {
        let text = "Filled in {year} and {name} as asked. {\"reasoning\": \"fits\", \"n\": 3} Done.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_extract_handles_escaped_quotes() {
        let text = r#"note {"quote": "say \"}\" twice", "n": 2} trailing"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["n"], 2);
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(matches!(
            extract_json("I cannot help with that."),
            Err(ParseError::InvalidJson(_))
        ));
        assert!(matches!(extract_json("   "), Err(ParseError::InvalidJson(_))));
        assert!(matches!(extract_json("{\"open\": "), Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_extract_rejects_non_object() {
        assert_eq!(extract_json("[1, 2]"), Err(ParseError::NotAnObject));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(number(&json!(72)), Some(72.0));
        assert_eq!(number(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(number(&json!("high")), None);
        assert_eq!(number(&json!(null)), None);
    }

    #[test]
    fn test_string_list_drops_bad_entries() {
        let obj = json!({"skills": ["Rust", 3, "", "  SQL "]});
        let list = string_list(as_object(&obj).unwrap(), "skills", true).unwrap();
        assert_eq!(list, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_required_fields() {
        let obj = json!({"reasoning": null, "steps": "not a list"});
        let obj = as_object(&obj).unwrap();
        assert_eq!(
            required_str(obj, "reasoning"),
            Err(ParseError::MissingField("reasoning"))
        );
        assert!(matches!(
            string_list(obj, "steps", true),
            Err(ParseError::WrongType { field: "steps", .. })
        ));
        assert_eq!(string_list(obj, "missing", false), Ok(vec![]));
        assert_eq!(optional_str(obj, "reasoning"), Ok(String::new()));
    }

    #[test]
    fn test_maps_drop_bad_values() {
        let obj = json!({
            "scores": {"a": 10, "b": "20", "c": "lots"},
            "salaries": {"x": "$1", "y": 5}
        });
        let obj = as_object(&obj).unwrap();

        let scores = number_map(obj, "scores", true).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["b"], 20.0);

        let salaries = string_map(obj, "salaries", false).unwrap();
        assert_eq!(salaries.len(), 1);
    }
}
