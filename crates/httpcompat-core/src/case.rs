//! Request cases and their expectations

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Expectation used for cases that declare no `expect` block.
static UNCONSTRAINED: Expectation = Expectation {
    status: None,
    headers: None,
    body: None,
    json: None,
};

/// A single request in the corpus. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RequestCase {
    /// Unique identifier within the corpus
    pub id: String,
    /// HTTP method, sent verbatim
    pub method: String,
    /// Request path (may carry a query string)
    pub path: String,
    /// Path actually requested, overrides `path` when present and non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_to: Option<String>,
    /// Request headers, sent in file order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// What the response must look like
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Expectation>,
}

/// Partial description of an expected response.
///
/// Every field is optional; an absent field means the dimension is not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Expectation {
    /// Exact status code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Headers that must be present with exactly these values (names case-insensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    /// Exact body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// JSON value the body must contain (subset match)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

impl RequestCase {
    /// Path that is actually requested: `map_to` if set, else `path`, always `/`-prefixed.
    #[must_use]
    pub fn effective_path(&self) -> String {
        let raw = self
            .map_to
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.path);
        normalize_path(raw)
    }

    /// HEAD responses are compared as if they had an empty body.
    #[must_use]
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }

    #[must_use]
    pub fn expectation(&self) -> &Expectation {
        self.expect.as_ref().unwrap_or(&UNCONSTRAINED)
    }
}

impl Expectation {
    /// True if no dimension is constrained.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.status.is_none() && self.headers.is_none() && self.body.is_none() && self.json.is_none()
    }
}

/// Prefix `path` with `/` unless it already starts with one.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
