//! Observed HTTP responses

use std::borrow::Cow;

use indexmap::IndexMap;

/// A response as captured from a target. Never mutated after capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResponse {
    pub status: u16,
    /// Header names as received; lookups go through [`ObservedResponse::header`]
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

impl ObservedResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup. If several names differ only by case,
    /// the last one wins.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body bytes used for comparison. HEAD responses always compare as empty.
    #[must_use]
    pub fn effective_body(&self, head: bool) -> &[u8] {
        if head { &[] } else { self.body.as_slice() }
    }

    /// Body text used for comparison, invalid UTF-8 replaced with U+FFFD.
    #[must_use]
    pub fn effective_text(&self, head: bool) -> Cow<'_, str> {
        String::from_utf8_lossy(self.effective_body(head))
    }
}
