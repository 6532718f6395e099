//! httpcompat-core: Case model, structural matcher and verdict logic
//!
//! This crate holds everything that decides whether a response is acceptable:
//! the request-case corpus, body classification, subset matching and the
//! pass/fail verdict. It never talks to the network.

pub mod case;
pub mod check;
pub mod classify;
pub mod config;
pub mod corpus;
pub mod matcher;
pub mod repr;
pub mod response;
pub mod schema;
pub mod verdict;

pub use case::{Expectation, RequestCase};
pub use check::{Divergence, ExpectationFailure, check_expectation, compare_responses};
pub use classify::{Body, classify};
pub use config::{Config, ConfigError};
pub use corpus::{Corpus, CorpusError};
pub use matcher::{JsonKind, Mismatch, MismatchReason, json_equal, subset_match};
pub use response::ObservedResponse;
pub use verdict::{
    FailureRecord, ResultSet, ResultSetKind, SuiteReport, TargetLabel, Verdict, VerdictStatus,
};
