//! Terminal report: failure lists, optional dumps, final PASS/FAIL line

use std::io::{self, Write};

use httpcompat_core::{Corpus, ResultSetKind, SuiteReport, TargetLabel, VerdictStatus};

use crate::dump::{DumpOptions, dump_case};
use crate::suite::Suite;
use crate::transport::Transport;

/// Write `report` in terminal form.
///
/// Clean result sets print nothing. When `dump` is set, each failing case is
/// re-requested and dumped right after its set's failure list: against the
/// set's target for expectation failures, against node then snode for
/// cross-compare differences.
///
/// # Errors
///
/// Returns error if writing to `out` fails.
pub fn render_terminal<T: Transport>(
    suite: &Suite<T>,
    report: &SuiteReport,
    corpus: &Corpus,
    dump: Option<&DumpOptions>,
    out: &mut dyn Write,
) -> io::Result<()> {
    for set in report.results.iter().filter(|s| !s.is_clean()) {
        writeln!(out, "{}", set.kind.heading())?;
        for failure in &set.failures {
            writeln!(out, "  - {failure}")?;
        }

        let Some(options) = dump else {
            continue;
        };
        let labels = match set.kind {
            ResultSetKind::Expectation { target } => vec![target],
            ResultSetKind::CrossCompare => vec![TargetLabel::Node, TargetLabel::Snode],
        };
        for failure in &set.failures {
            let Some(case) = corpus.find(&failure.case_id) else {
                continue;
            };
            for label in &labels {
                if let Some(target) = suite.target(*label) {
                    dump_case(suite.transport(), target, case, options, out)?;
                }
            }
        }
    }

    match report.verdict().status {
        VerdictStatus::Pass => writeln!(out, "PASS"),
        VerdictStatus::Fail => writeln!(out, "\nFAIL"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::{RunMode, SuiteOptions};
    use crate::testing::{FakeTransport, cases, node, snode};
    use httpcompat_core::ObservedResponse;

    const CORPUS: &str = r#"[
        {"id": "s1", "method": "GET", "path": "/ping", "expect": {"status": 200, "body": "pong"}},
        {"id": "c1", "method": "GET", "path": "/items"}
    ]"#;

    fn transport(snode_ping: &str) -> FakeTransport {
        FakeTransport::new()
            .route(
                TargetLabel::Node,
                "GET",
                "/ping",
                ObservedResponse::new(200).with_body("pong"),
            )
            .route(
                TargetLabel::Snode,
                "GET",
                "/ping",
                ObservedResponse::new(200).with_body(snode_ping),
            )
            .both(
                "GET",
                "/items",
                ObservedResponse::new(200).with_body(r#"{"items":[1,2]}"#),
            )
    }

    fn render(t: FakeTransport, dump: Option<&DumpOptions>) -> String {
        let corpus = cases(CORPUS);
        let suite = Suite::new(
            t,
            SuiteOptions::new(RunMode::Compare)
                .with_node(Some(node()))
                .with_snode(Some(snode())),
        )
        .unwrap();
        let report = suite.run(&corpus);
        let mut out = Vec::new();
        render_terminal(&suite, &report, &corpus, dump, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn clean_run_prints_pass_only() {
        assert_eq!(render(transport("pong"), None), "PASS\n");
    }

    #[test]
    fn failures_are_listed_per_set() {
        let out = render(transport("pong!"), None);
        insta::assert_snapshot!(out, @r"
        SNode expected-value failures:
          - s1: body expected 'pong', got 'pong!'
        Node vs SNode differences:
          - s1: body differs between node and snode

        FAIL
        ");
    }

    #[test]
    fn dumps_follow_each_failure_list() {
        let out = render(transport("pong!"), Some(&DumpOptions::default()));
        insta::assert_snapshot!(out, @r"
        SNode expected-value failures:
          - s1: body expected 'pong', got 'pong!'

        === snode: http://127.0.0.1:8080 GET /ping -> 200 ===
        pong!
        Node vs SNode differences:
          - s1: body differs between node and snode

        === node: http://127.0.0.1:3000 GET /ping -> 200 ===
        pong

        === snode: http://127.0.0.1:8080 GET /ping -> 200 ===
        pong!

        FAIL
        ");
    }
}
