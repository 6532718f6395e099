//! Orchestrator: expectation-only and compare run modes

use httpcompat_core::{Corpus, ResultSet, ResultSetKind, SuiteReport, TargetLabel};

use crate::compare::compare_all;
use crate::evaluate::run_all;
use crate::transport::{Target, Transport};

/// Run mode, fixed for the whole invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Validate each given target against case expectations only
    ExpectOnly,
    /// Validate both targets, then cross-compare them
    #[default]
    Compare,
}

impl RunMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpectOnly => "expect-only",
            Self::Compare => "compare",
        }
    }
}

/// Everything a run needs besides the transport and the corpus.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    pub mode: RunMode,
    pub node: Option<Target>,
    pub snode: Option<Target>,
    /// Headers compared between node and snode
    pub critical_headers: Vec<String>,
}

impl SuiteOptions {
    #[must_use]
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            node: None,
            snode: None,
            critical_headers: httpcompat_core::Config::default().critical_headers,
        }
    }

    #[must_use]
    pub fn with_node(mut self, node: Option<Target>) -> Self {
        self.node = node;
        self
    }

    #[must_use]
    pub fn with_snode(mut self, snode: Option<Target>) -> Self {
        self.snode = snode;
        self
    }

    #[must_use]
    pub fn with_critical_headers(mut self, headers: Vec<String>) -> Self {
        self.critical_headers = headers;
        self
    }
}

/// A configured run over one transport.
pub struct Suite<T> {
    transport: T,
    options: SuiteOptions,
}

impl<T: Transport> Suite<T> {
    /// Check that the targets required by the mode are present.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError`] if compare mode lacks either target, or
    /// expect-only mode has none.
    pub fn new(transport: T, options: SuiteOptions) -> Result<Self, SuiteError> {
        match options.mode {
            RunMode::Compare if options.node.is_none() || options.snode.is_none() => {
                return Err(SuiteError::CompareNeedsBothTargets);
            }
            RunMode::ExpectOnly if options.node.is_none() && options.snode.is_none() => {
                return Err(SuiteError::NoTarget);
            }
            _ => {}
        }
        Ok(Self { transport, options })
    }

    #[must_use]
    pub fn mode(&self) -> RunMode {
        self.options.mode
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn target(&self, label: TargetLabel) -> Option<&Target> {
        match label {
            TargetLabel::Node => self.options.node.as_ref(),
            TargetLabel::Snode => self.options.snode.as_ref(),
        }
    }

    /// Run every pass the mode calls for and collect their result sets.
    ///
    /// Expectation passes run node first, then snode. In compare mode the
    /// cross-compare pass always runs, whatever the expectation passes found.
    #[must_use]
    pub fn run(&self, corpus: &Corpus) -> SuiteReport {
        let mut results = Vec::new();

        for label in [TargetLabel::Node, TargetLabel::Snode] {
            if let Some(target) = self.target(label) {
                results.push(ResultSet {
                    kind: ResultSetKind::Expectation { target: label },
                    failures: run_all(&self.transport, target, corpus),
                });
            }
        }

        if self.options.mode == RunMode::Compare {
            if let (Some(node), Some(snode)) = (&self.options.node, &self.options.snode) {
                results.push(ResultSet {
                    kind: ResultSetKind::CrossCompare,
                    failures: compare_all(
                        &self.transport,
                        node,
                        snode,
                        corpus,
                        &self.options.critical_headers,
                    ),
                });
            }
        }

        SuiteReport { results }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuiteError {
    #[error("Need --node and --snode for compare mode.")]
    CompareNeedsBothTargets,
    #[error("Need --node and/or --snode for --expect-only mode.")]
    NoTarget,
}
