//! Response checks: expectation conformance and node/snode equivalence
//!
//! No I/O. Both checks evaluate their dimensions in a fixed order and stop at
//! the first one that fails, so a case yields at most one diagnostic.

use crate::case::RequestCase;
use crate::classify::{Body, classify};
use crate::matcher::{Mismatch, json_equal, subset_match};
use crate::repr::{quote, quote_opt};
use crate::response::ObservedResponse;

/// First expectation a response violated.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectationFailure {
    Status {
        expected: u16,
        actual: u16,
    },
    Header {
        name: String,
        expected: String,
        actual: Option<String>,
    },
    Body {
        expected: String,
        actual: String,
    },
    NotJson,
    Json(Mismatch),
}

impl std::fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { expected, actual } => {
                write!(f, "status expected {expected}, got {actual}")
            }
            Self::Header {
                name,
                expected,
                actual,
            } => write!(
                f,
                "header {name} expected {}, got {}",
                quote(expected),
                quote_opt(actual.as_deref())
            ),
            Self::Body { expected, actual } => {
                write!(f, "body expected {}, got {}", quote(expected), quote(actual))
            }
            Self::NotJson => f.write_str("expected JSON, got non-JSON body"),
            Self::Json(mismatch) => write!(f, "json mismatch: {mismatch}"),
        }
    }
}

/// Check `response` against the case's expectation.
///
/// Order: status, headers (file order), body text, JSON subset.
///
/// # Errors
///
/// Returns the first violated expectation.
pub fn check_expectation(
    case: &RequestCase,
    response: &ObservedResponse,
) -> Result<(), ExpectationFailure> {
    let exp = case.expectation();

    if let Some(expected) = exp.status {
        if response.status != expected {
            return Err(ExpectationFailure::Status {
                expected,
                actual: response.status,
            });
        }
    }

    if let Some(headers) = &exp.headers {
        for (name, expected) in headers {
            let actual = response.header(name);
            if actual != Some(expected.as_str()) {
                return Err(ExpectationFailure::Header {
                    name: name.clone(),
                    expected: expected.clone(),
                    actual: actual.map(String::from),
                });
            }
        }
    }

    let head = case.is_head();

    if let Some(expected) = &exp.body {
        let actual = response.effective_text(head);
        if actual != expected.as_str() {
            return Err(ExpectationFailure::Body {
                expected: expected.clone(),
                actual: actual.into_owned(),
            });
        }
    }

    if let Some(expected) = &exp.json {
        let Body::Structured(actual) = classify(response.effective_body(head)) else {
            return Err(ExpectationFailure::NotJson);
        };
        subset_match(expected, &actual).map_err(ExpectationFailure::Json)?;
    }

    Ok(())
}

/// First way two responses to the same request diverged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    Status {
        node: u16,
        snode: u16,
    },
    Json,
    Body,
    Header {
        name: String,
        node: Option<String>,
        snode: Option<String>,
    },
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { node, snode } => write!(f, "status differs node={node} snode={snode}"),
            Self::Json => f.write_str("JSON differs between node and snode"),
            Self::Body => f.write_str("body differs between node and snode"),
            Self::Header { name, node, snode } => write!(
                f,
                "header {name} differs node={} snode={}",
                quote_opt(node.as_deref()),
                quote_opt(snode.as_deref())
            ),
        }
    }
}

/// Strict equivalence of two responses to the same request.
///
/// Status must be equal. Bodies (empty for HEAD) are compared as JSON when
/// either side parses as JSON, byte for byte otherwise. JSON comparison is
/// full equality with numbers compared by value. Then each critical
/// header must carry the same value (or be absent) on both sides.
///
/// # Errors
///
/// Returns the first divergence found.
pub fn compare_responses(
    head: bool,
    node: &ObservedResponse,
    snode: &ObservedResponse,
    critical_headers: &[String],
) -> Result<(), Divergence> {
    if node.status != snode.status {
        return Err(Divergence::Status {
            node: node.status,
            snode: snode.status,
        });
    }

    match (
        classify(node.effective_body(head)),
        classify(snode.effective_body(head)),
    ) {
        (Body::Opaque(n), Body::Opaque(s)) => {
            if n != s {
                return Err(Divergence::Body);
            }
        }
        (Body::Structured(n), Body::Structured(s)) => {
            if !json_equal(&n, &s) {
                return Err(Divergence::Json);
            }
        }
        _ => return Err(Divergence::Json),
    }

    for name in critical_headers {
        let (n, s) = (node.header(name), snode.header(name));
        if n != s {
            return Err(Divergence::Header {
                name: name.clone(),
                node: n.map(String::from),
                snode: s.map(String::from),
            });
        }
    }

    Ok(())
}
