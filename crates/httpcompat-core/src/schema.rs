//! JSON Schema export for the corpus document format

use crate::corpus::CorpusDocument;

/// JSON Schema describing a corpus file.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(CorpusDocument);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
