//! Failure records, result sets and the overall verdict

use serde::{Deserialize, Serialize};

/// Which of the two candidate servers a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLabel {
    /// Reference implementation
    Node,
    /// Reimplementation under test
    Snode,
}

impl TargetLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Snode => "snode",
        }
    }

    /// Capitalized form used in report headings
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Node => "Node",
            Self::Snode => "SNode",
        }
    }
}

impl std::fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed case with its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub case_id: String,
    pub message: String,
}

impl FailureRecord {
    #[must_use]
    pub fn new(case_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.case_id, self.message)
    }
}

/// What a result set was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultSetKind {
    /// Corpus run against one target's expectations
    Expectation { target: TargetLabel },
    /// Node vs snode equivalence check
    CrossCompare,
}

impl ResultSetKind {
    /// Heading printed above the failures of this set
    #[must_use]
    pub fn heading(self) -> String {
        match self {
            Self::Expectation { target } => format!("{} expected-value failures:", target.title()),
            Self::CrossCompare => format!(
                "{} vs {} differences:",
                TargetLabel::Node.title(),
                TargetLabel::Snode.title()
            ),
        }
    }
}

/// Failures of one pass, in corpus order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(flatten)]
    pub kind: ResultSetKind,
    pub failures: Vec<FailureRecord>,
}

impl ResultSet {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// All result sets produced by one invocation, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub results: Vec<ResultSet>,
}

impl SuiteReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.iter().map(|r| r.failures.len()).sum()
    }

    /// PASS iff every evaluated result set is empty.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.results.iter().all(ResultSet::is_clean) {
            Verdict {
                status: VerdictStatus::Pass,
                exit_code: 0,
            }
        } else {
            Verdict {
                status: VerdictStatus::Fail,
                exit_code: 1,
            }
        }
    }
}

/// Final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
