//! In-memory transport for tests

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;

use httpcompat_core::{ObservedResponse, TargetLabel};

use crate::transport::{Target, Transport, TransportError};

type Key = (TargetLabel, String, String);

/// Serves canned responses keyed by (target, method, path) and records calls.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<Key, Result<ObservedResponse, TransportError>>,
    calls: RefCell<Vec<(TargetLabel, String, String, IndexMap<String, String>)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(
        mut self,
        label: TargetLabel,
        method: &str,
        path: &str,
        response: ObservedResponse,
    ) -> Self {
        self.routes
            .insert((label, method.to_string(), path.to_string()), Ok(response));
        self
    }

    /// Same response from both targets.
    pub(crate) fn both(self, method: &str, path: &str, response: ObservedResponse) -> Self {
        self.route(TargetLabel::Node, method, path, response.clone())
            .route(TargetLabel::Snode, method, path, response)
    }

    pub(crate) fn fail(
        mut self,
        label: TargetLabel,
        method: &str,
        path: &str,
        error: TransportError,
    ) -> Self {
        self.routes
            .insert((label, method.to_string(), path.to_string()), Err(error));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(TargetLabel, String, String)> {
        self.calls
            .borrow()
            .iter()
            .map(|(l, m, p, _)| (*l, m.clone(), p.clone()))
            .collect()
    }

    pub(crate) fn sent_headers(&self, idx: usize) -> IndexMap<String, String> {
        self.calls.borrow()[idx].3.clone()
    }
}

impl Transport for FakeTransport {
    fn send(
        &self,
        target: &Target,
        method: &str,
        path: &str,
        headers: &IndexMap<String, String>,
    ) -> Result<ObservedResponse, TransportError> {
        self.calls.borrow_mut().push((
            target.label(),
            method.to_string(),
            path.to_string(),
            headers.clone(),
        ));
        self.routes
            .get(&(target.label(), method.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Connect(format!("no route for {method} {path}"))))
    }
}

pub(crate) fn node() -> Target {
    Target::parse(TargetLabel::Node, "http://127.0.0.1:3000").unwrap()
}

pub(crate) fn snode() -> Target {
    Target::parse(TargetLabel::Snode, "http://127.0.0.1:8080").unwrap()
}

pub(crate) fn cases(json: &str) -> httpcompat_core::Corpus {
    httpcompat_core::Corpus::parse(json, httpcompat_core::corpus::CorpusFormat::Json).unwrap()
}
