use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Opening or closing code fence, optionally tagged `json`, plus trailing whitespace
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?i:json)?\s*").expect("fence pattern is valid"));

/// Remove markdown code fences and surrounding whitespace
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Extract the JSON object embedded in a model response.
///
/// Fences are stripped first, then the greedy span from the first `{` to the
/// last `}` is returned. Without such a span the trimmed text comes back
/// unchanged and the caller decides what "no object" means.
pub fn extract_json_from_response(text: &str) -> String {
    let cleaned = strip_fences(text);
    match greedy_span(&cleaned, '{', '}') {
        Some(span) => span.to_string(),
        None => cleaned,
    }
}

/// Greedy `[`…`]` span of the fence-stripped text, for bare-array replies
pub fn extract_json_array(text: &str) -> Option<String> {
    let cleaned = strip_fences(text);
    greedy_span(&cleaned, '[', ']').map(str::to_string)
}

/// Normalize a value that may or may not be text; non-strings pass through
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(extract_json_from_response(&text)),
        other => other,
    }
}

fn greedy_span(s: &str, open: char, close: char) -> Option<&str> {
    let start = s.find(open)?;
    let end = s.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&s[start..end + close.len_utf8()])
}
