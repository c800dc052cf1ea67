//! Execution trace.

use serde::Serialize;

use crate::context::GameEventOwner;

use super::phase::Phase;

/// One scheduled node invocation.
///
/// Two resolutions with the same data, seed and host behaviour produce
/// equal traces, which makes the trace a cheap replay check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    /// Nesting depth of the action the node ran in.
    pub depth: usize,
    pub phase: Phase,
    /// 0-based strike index for per-strike phases.
    pub strike: Option<u32>,
    pub priority: i32,
    pub owner: GameEventOwner,
    pub node: &'static str,
}
