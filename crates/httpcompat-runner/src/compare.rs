//! Cross-server comparator: node vs snode equivalence

use httpcompat_core::{Corpus, FailureRecord, RequestCase, compare_responses};

use crate::transport::{Target, Transport};

/// Send one case to both targets and compare the responses strictly.
///
/// Expectations are ignored here. Returns `None` when both responses are
/// equivalent.
pub fn compare_case<T: Transport + ?Sized>(
    transport: &T,
    node: &Target,
    snode: &Target,
    case: &RequestCase,
    critical_headers: &[String],
) -> Option<FailureRecord> {
    let path = case.effective_path();
    let mut responses = Vec::with_capacity(2);
    for target in [node, snode] {
        match transport.send(target, &case.method, &path, &case.headers) {
            Ok(response) => responses.push(response),
            Err(e) => {
                tracing::warn!(case = %case.id, server = %target.label(), error = %e, "request failed");
                return Some(FailureRecord::new(
                    &case.id,
                    format!("request to {} failed: {e}", target.label()),
                ));
            }
        }
    }

    compare_responses(
        case.is_head(),
        &responses[0],
        &responses[1],
        critical_headers,
    )
    .err()
    .map(|divergence| FailureRecord::new(&case.id, divergence.to_string()))
}

/// Compare every case in corpus order, collecting all differences.
pub fn compare_all<T: Transport + ?Sized>(
    transport: &T,
    node: &Target,
    snode: &Target,
    corpus: &Corpus,
    critical_headers: &[String],
) -> Vec<FailureRecord> {
    tracing::info!(cases = corpus.len(), "cross-compare pass");
    corpus
        .iter()
        .filter_map(|case| compare_case(transport, node, snode, case, critical_headers))
        .collect()
}
