//! Report emitter: re-issue a failing case and print the full response
//!
//! Purely diagnostic. Nothing written here feeds back into the verdict.

use std::io::{self, Write};

use serde_json::{Map, Value};

use httpcompat_core::{Body, RequestCase, classify};

use crate::transport::{Target, Transport};

/// What to show when dumping a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Response headers printed when present, in this order
    pub headers: Vec<String>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            headers: httpcompat_core::Config::default().dump_headers,
        }
    }
}

/// Send `case` to `target` again and write its response to `out`.
///
/// # Errors
///
/// Returns error only if writing to `out` fails.
pub fn dump_case<T: Transport + ?Sized>(
    transport: &T,
    target: &Target,
    case: &RequestCase,
    options: &DumpOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let path = case.effective_path();
    let response = match transport.send(target, &case.method, &path, &case.headers) {
        Ok(response) => response,
        Err(e) => {
            writeln!(
                out,
                "\n=== {}: {} {} {path} -> request failed: {e} ===",
                target.label(),
                target.base(),
                case.method
            )?;
            return Ok(());
        }
    };

    writeln!(
        out,
        "\n=== {}: {} {} {path} -> {} ===",
        target.label(),
        target.base(),
        case.method,
        response.status
    )?;
    for name in &options.headers {
        if let Some(value) = response.header(name) {
            writeln!(out, "{name}: {value}")?;
        }
    }

    if case.is_head() {
        writeln!(out, "(HEAD) body intentionally not shown")?;
        return Ok(());
    }

    match classify(&response.body) {
        Body::Structured(value) => {
            let pretty = serde_json::to_string_pretty(&sort_keys(&value)).map_err(io::Error::other)?;
            writeln!(out, "{pretty}")
        }
        Body::Opaque(bytes) => writeln!(out, "{}", String::from_utf8_lossy(bytes)),
    }
}

/// Copy of `value` with object keys sorted at every level.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut entries: Vec<_> = obj.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
