use std::env;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

#[allow(clippy::expect_used)]
static EMBEDDED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[\s*\{.*?\}\s*\]").expect("embedded array regex is valid")
});

/// One per-node judgement as returned by the oracle, after lenient decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleItem {
    pub id: String,
    pub compliant: bool,
    pub reason: String,
}

/// Decode a batch response into oracle items.
///
/// Repairs are tried in order: code-fence stripping, truncated-array closing,
/// bare-object wrapping, extracting the first embedded array from prose,
/// string/bracket sanitizing and finally relaxed JSON5. `None` means nothing
/// usable could be recovered.
pub fn parse_batch_response(raw: &str) -> Option<Vec<OracleItem>> {
    let value = parse_value(raw)?;
    let items: Vec<OracleItem> = elements(value)
        .iter()
        .filter_map(OracleItem::from_value)
        .collect();
    debug!(items = items.len(), "oracle response decoded");
    Some(items)
}

fn parse_value(raw: &str) -> Option<Value> {
    let payload = extract_json_payload(raw);
    let payload = repair_truncated_array(&payload);

    if let Ok(value) = serde_json::from_str::<Value>(&payload) {
        return Some(value);
    }
    if let Some(found) = EMBEDDED_ARRAY.find(&payload) {
        if let Ok(value) = serde_json::from_str::<Value>(found.as_str()) {
            return Some(value);
        }
    }
    let sanitized = sanitize_json_strings(&payload);
    if sanitized != payload {
        if let Ok(value) = serde_json::from_str::<Value>(&sanitized) {
            return Some(value);
        }
    }
    match json5::from_str::<Value>(&sanitized) {
        Ok(value) => Some(value),
        Err(_) => {
            debug_log_payload(raw);
            warn!(
                chars = raw.chars().count(),
                "oracle response could not be parsed even with relaxed JSON"
            );
            None
        }
    }
}

/// Array elements, a bare object as a singleton, or the first array-valued
/// field of a wrapper object (`{"results": [...]}`).
fn elements(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) if !map.contains_key("id") => {
            match map.into_iter().find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            }) {
                Some(items) => items,
                None => Vec::new(),
            }
        }
        object @ Value::Object(_) => vec![object],
        _ => Vec::new(),
    }
}

impl OracleItem {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = match object.get("id")? {
            Value::String(id) => id.trim().to_string(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        let compliant = object.get("result").and_then(lenient_bool)?;
        let reason = match object.get("reason") {
            Some(Value::String(reason)) => reason.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Some(Self {
            id,
            compliant,
            reason,
        })
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "合规" => Some(true),
            "false" | "不合规" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Close an array cut off mid-stream at its last complete object.
pub fn repair_truncated_array(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.starts_with('[') && !trimmed.ends_with(']') {
        if let Some(last) = trimmed.rfind('}') {
            return format!("{}]", &trimmed[..=last]);
        }
    }
    trimmed.to_string()
}

pub fn extract_json_payload(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(stripped) = strip_code_fence(trimmed) {
        return stripped;
    }
    trimmed.to_string()
}

fn strip_code_fence(input: &str) -> Option<String> {
    let mut trimmed = input.trim();
    if !trimmed.starts_with("```") {
        return None;
    }
    trimmed = trimmed.trim_start_matches("```");
    trimmed = trimmed.trim_start_matches(|c: char| c.is_ascii_whitespace());
    if let Some(rest) = trimmed.strip_prefix("json") {
        trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
    }
    let end = trimmed.rfind("```").unwrap_or(trimmed.len());
    Some(trimmed[..end].trim().to_string())
}

/// Escape raw newlines inside strings, close a dangling string, then balance
/// braces and brackets.
fn sanitize_json_strings(payload: &str) -> String {
    let mut result = String::with_capacity(payload.len());
    let mut in_string = false;
    let mut escape = false;

    for ch in payload.chars() {
        if in_string {
            if escape {
                result.push(ch);
                escape = false;
            } else {
                match ch {
                    '\\' => {
                        result.push(ch);
                        escape = true;
                    }
                    '"' => {
                        result.push(ch);
                        in_string = false;
                    }
                    '\n' => result.push_str("\\n"),
                    _ => result.push(ch),
                }
            }
        } else {
            result.push(ch);
            if ch == '"' {
                in_string = true;
            }
        }
    }

    if in_string {
        result.push('"');
    }

    let open_braces = result.matches('{').count();
    let close_braces = result.matches('}').count();
    for _ in close_braces..open_braces {
        result.push('}');
    }
    let open_brackets = result.matches('[').count();
    let close_brackets = result.matches(']').count();
    for _ in close_brackets..open_brackets {
        result.push(']');
    }
    result
}

fn debug_log_payload(payload: &str) {
    if debug_enabled() {
        warn!("raw oracle payload: {}", payload);
    }
}

fn debug_enabled() -> bool {
    matches!(env::var("SRS_CHECK_DEBUG"), Ok(val) if !val.is_empty() && val != "0")
}
