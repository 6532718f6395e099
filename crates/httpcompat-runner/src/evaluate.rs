//! Case evaluator and corpus runner (expectation mode)

use httpcompat_core::{Corpus, FailureRecord, RequestCase, check_expectation};

use crate::transport::{Target, Transport};

/// Run one case against `target` and check its expectation.
///
/// Returns `None` when the case passes. Transport errors become a failure for
/// this case only.
pub fn evaluate_case<T: Transport + ?Sized>(
    transport: &T,
    target: &Target,
    case: &RequestCase,
) -> Option<FailureRecord> {
    let path = case.effective_path();
    let response = match transport.send(target, &case.method, &path, &case.headers) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(case = %case.id, server = %target.label(), error = %e, "request failed");
            return Some(FailureRecord::new(&case.id, format!("request failed: {e}")));
        }
    };

    check_expectation(case, &response)
        .err()
        .map(|failure| FailureRecord::new(&case.id, failure.to_string()))
}

/// Evaluate every case in corpus order, collecting all failures.
pub fn run_all<T: Transport + ?Sized>(
    transport: &T,
    target: &Target,
    corpus: &Corpus,
) -> Vec<FailureRecord> {
    tracing::info!(server = %target.label(), cases = corpus.len(), "expectation pass");
    corpus
        .iter()
        .filter_map(|case| evaluate_case(transport, target, case))
        .collect()
}
