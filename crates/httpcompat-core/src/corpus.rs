//! Case corpus loading and selection
//!
//! A corpus file is either a bare list of cases or a table with a `cases`
//! list. The format is picked by extension: `.yaml`/`.yml`, `.toml`, and JSON
//! for everything else.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::case::RequestCase;
use crate::repr::quote;

/// On-disk corpus document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CorpusDocument {
    /// `[ {case}, ... ]`
    List(Vec<RequestCase>),
    /// `{ "cases": [ {case}, ... ] }`
    Table { cases: Vec<RequestCase> },
}

/// Supported corpus file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Json,
    Yaml,
    Toml,
}

impl CorpusFormat {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// An ordered, validated collection of request cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    cases: Vec<RequestCase>,
}

impl Corpus {
    /// Build a corpus, checking that ids are non-empty and unique.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::EmptyId`] or [`CorpusError::DuplicateId`].
    pub fn new(cases: Vec<RequestCase>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::new();
        for (idx, case) in cases.iter().enumerate() {
            if case.id.is_empty() {
                return Err(CorpusError::EmptyId(idx));
            }
            if !seen.insert(case.id.as_str()) {
                return Err(CorpusError::DuplicateId(case.id.clone()));
            }
        }
        Ok(Self { cases })
    }

    /// Load a corpus file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CorpusError::Io(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content, CorpusFormat::from_path(path))
    }

    /// Parse corpus text in the given format.
    ///
    /// # Errors
    ///
    /// Returns error if the text cannot be parsed or validated.
    pub fn parse(content: &str, format: CorpusFormat) -> Result<Self, CorpusError> {
        let doc: CorpusDocument = match format {
            CorpusFormat::Json => serde_json::from_str(content)
                .map_err(|e| CorpusError::Parse(format!("Invalid JSON: {e}")))?,
            CorpusFormat::Yaml => serde_yml::from_str(content)
                .map_err(|e| CorpusError::Parse(format!("Invalid YAML: {e}")))?,
            CorpusFormat::Toml => toml::from_str(content)
                .map_err(|e| CorpusError::Parse(format!("Invalid TOML: {e}")))?,
        };
        let cases = match doc {
            CorpusDocument::List(cases) | CorpusDocument::Table { cases } => cases,
        };
        Self::new(cases)
    }

    /// Restrict the corpus to the single case with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::UnknownCase`] if no case has that id.
    pub fn only(&self, id: &str) -> Result<Self, CorpusError> {
        self.find(id)
            .map(|case| Self {
                cases: vec![case.clone()],
            })
            .ok_or_else(|| CorpusError::UnknownCase(id.to_string()))
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&RequestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn cases(&self) -> &[RequestCase] {
        &self.cases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestCase> {
        self.cases.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a RequestCase;
    type IntoIter = std::slice::Iter<'a, RequestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Case #{0} has an empty id")]
    EmptyId(usize),
    #[error("Duplicate case id={}", quote(.0))]
    DuplicateId(String),
    #[error("No case found with id={}", quote(.0))]
    UnknownCase(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_LIST: &str = r#"[
        {"id": "health", "method": "GET", "path": "/health",
         "expect": {"status": 200, "json": {"ok": true}}},
        {"id": "head_demo", "method": "HEAD", "path": "/head-demo",
         "expect": {"status": 200, "headers": {"X-Demo": "1"}, "body": ""}}
    ]"#;

    #[test]
    fn parse_json_list() {
        let corpus = Corpus::parse(JSON_LIST, CorpusFormat::Json).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.cases()[0].id, "health");
        assert!(corpus.cases()[1].is_head());
    }

    #[test]
    fn parse_json_table() {
        let json = r#"{"cases": [{"id": "a", "method": "GET", "path": "/a"}]}"#;
        let corpus = Corpus::parse(json, CorpusFormat::Json).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn parse_yaml() {
        let yaml = r#"
- id: query
  method: GET
  path: /query/echo?A=1
  headers:
    x-test: hello
  expect:
    status: 200
    json:
      query:
        A: "1"
"#;
        let corpus = Corpus::parse(yaml, CorpusFormat::Yaml).unwrap();
        let case = &corpus.cases()[0];
        assert_eq!(case.headers.get("x-test").map(String::as_str), Some("hello"));
        assert_eq!(
            case.expectation().json,
            Some(serde_json::json!({"query": {"A": "1"}}))
        );
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
[[cases]]
id = "wild"
method = "GET"
path = "/file/a/b.txt"

[cases.expect]
status = 200

[cases.expect.json]
label = "file"
"#;
        let corpus = Corpus::parse(toml, CorpusFormat::Toml).unwrap();
        let case = &corpus.cases()[0];
        assert_eq!(case.expectation().status, Some(200));
        assert_eq!(
            case.expectation().json,
            Some(serde_json::json!({"label": "file"}))
        );
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = Corpus::parse("[{", CorpusFormat::Json).unwrap_err();
        assert!(matches!(err, CorpusError::Parse(_)));
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"[
            {"id": "a", "method": "GET", "path": "/a"},
            {"id": "a", "method": "GET", "path": "/b"}
        ]"#;
        let err = Corpus::parse(json, CorpusFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate case id='a'");
    }

    #[test]
    fn empty_id_rejected() {
        let json = r#"[{"id": "", "method": "GET", "path": "/a"}]"#;
        assert!(matches!(
            Corpus::parse(json, CorpusFormat::Json),
            Err(CorpusError::EmptyId(0))
        ));
    }

    #[test]
    fn only_selects_single_case() {
        let corpus = Corpus::parse(JSON_LIST, CorpusFormat::Json).unwrap();
        let only = corpus.only("head_demo").unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only.cases()[0].id, "head_demo");
    }

    #[test]
    fn only_unknown_id_names_the_id() {
        let corpus = Corpus::parse(JSON_LIST, CorpusFormat::Json).unwrap();
        let err = corpus.only("missing_id").unwrap_err();
        assert_eq!(err.to_string(), "No case found with id='missing_id'");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(CorpusFormat::from_path(Path::new("c.yml")), CorpusFormat::Yaml);
        assert_eq!(CorpusFormat::from_path(Path::new("c.yaml")), CorpusFormat::Yaml);
        assert_eq!(CorpusFormat::from_path(Path::new("c.toml")), CorpusFormat::Toml);
        assert_eq!(CorpusFormat::from_path(Path::new("cases.json")), CorpusFormat::Json);
        assert_eq!(CorpusFormat::from_path(Path::new("cases")), CorpusFormat::Json);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, JSON_LIST).unwrap();
        let corpus = Corpus::load(&path).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.find("health").is_some());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CorpusError::Io(..)));
    }
}
