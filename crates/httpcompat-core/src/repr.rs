//! Quoting of strings and JSON values inside diagnostic messages
//!
//! Strings are rendered the way failure messages have always shown them:
//! single-quoted, switching to double quotes when the text contains a single
//! quote but no double quote, with control characters escaped. JSON values use
//! the same notation: `None`, `True`/`False`, `{'k': [1, 'x']}`.

use serde_json::Value;

/// Quote `s` for display in a failure message.
#[must_use]
pub fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Quote an optional value, rendering absence as `None`.
#[must_use]
pub fn quote_opt(s: Option<&str>) -> String {
    s.map_or_else(|| "None".to_string(), quote)
}

/// Render a JSON value for display in a failure message.
#[must_use]
pub fn repr_json(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => repr_float(f),
            _ => n.to_string(),
        },
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(repr_json).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), repr_json(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Floats always show a fractional part or an exponent: `1.0`, `2.5`, `1e+20`.
fn repr_float(f: f64) -> String {
    let s = format!("{f:?}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}
