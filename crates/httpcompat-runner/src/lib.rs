//! httpcompat-runner: Sequential case execution against live servers
//!
//! Drives the core checks over HTTP: one case at a time, one target at a
//! time, one connection per request.

pub mod compare;
pub mod dump;
pub mod evaluate;
pub mod render;
pub mod suite;
pub mod transport;

#[cfg(test)]
mod testing;

pub use compare::{compare_all, compare_case};
pub use dump::{DumpOptions, dump_case};
pub use evaluate::{evaluate_case, run_all};
pub use render::render_terminal;
pub use suite::{RunMode, Suite, SuiteError, SuiteOptions};
pub use transport::{HttpTransport, Target, TargetError, Transport, TransportError};
