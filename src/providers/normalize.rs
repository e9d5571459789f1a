use serde::Serialize;
use serde_json::{Map, Value};

/// Upstream keys that are consumed by normalization and never reported as extra.
pub const KNOWN_KEYS: [&str; 5] = ["model", "output", "usage", "tokens", "completion_tokens"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usage {
    pub prompt_tokens: Value,
    pub completion_tokens: Value,
    pub total_tokens: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    pub model: Value,
    pub output: Value,
    pub usage: Usage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub slow: bool,
}

fn field_or(data: &Map<String, Value>, key: &str, default: Value) -> Value {
    data.get(key).cloned().unwrap_or(default)
}

/// Extra top-level keys, in the upstream's field order.
pub fn extra_keys(data: &Map<String, Value>) -> Vec<&str> {
    data.keys()
        .map(String::as_str)
        .filter(|k| !KNOWN_KEYS.contains(k))
        .collect()
}

// total_tokens mirrors `tokens`; it is not prompt + completion.
pub fn normalize(data: &Map<String, Value>, slow: bool) -> NormalizedResponse {
    let usage = Usage {
        prompt_tokens: field_or(data, "tokens", Value::from(0)),
        completion_tokens: field_or(data, "completion_tokens", Value::from(0)),
        total_tokens: field_or(data, "tokens", Value::from(0)),
    };

    let extras = extra_keys(data);
    let warning = if extras.is_empty() {
        None
    } else {
        tracing::debug!(keys = ?extras, "ignoring extra upstream keys");
        Some(format!("Ignored extra keys: {}", render_key_list(&extras)))
    };

    NormalizedResponse {
        model: field_or(data, "model", Value::Null),
        output: field_or(data, "output", Value::Null),
        usage,
        warning,
        slow,
    }
}

/// Renders `['a', 'b']`, quoting each key as a Python string literal would.
pub fn render_key_list(keys: &[&str]) -> String {
    let quoted: Vec<String> = keys.iter().map(|k| quote_key(k)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote_key(key: &str) -> String {
    let quote = if key.contains('\'') && !key.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(key.len() + 2);
    out.push(quote);
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
