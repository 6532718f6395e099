//! Content classification: structured JSON or opaque bytes

use serde_json::Value;

/// A response body as seen by the comparison logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Body<'a> {
    /// Body decoded as UTF-8 and parsed as a JSON document
    Structured(Value),
    /// Anything else, compared byte for byte
    Opaque(&'a [u8]),
}

impl Body<'_> {
    #[must_use]
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(v) => Some(v),
            Self::Opaque(_) => None,
        }
    }

    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// Classify raw body bytes. Total: decode or parse failures yield `Opaque`.
///
/// A document that is just `null` carries no structure and stays `Opaque`,
/// as does an empty body.
#[must_use]
pub fn classify(bytes: &[u8]) -> Body<'_> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
        .filter(|value| !value.is_null())
        .map_or(Body::Opaque(bytes), Body::Structured)
}
