//! Engine run metrics.
//!
//! Collected by `Tagger::run_with_metrics`; cheap enough to gather on every
//! run, so `Tagger::run` is a thin wrapper that drops them.
//!
//! ```text
//! prepare ─▶ extract ─▶ prune ─▶ merge ─▶ anchor ─▶ resolve ─▶ split ─▶ emit
//!            └──────── extraction ───────┘ └ anchoring ┘ └──── resolution ───┘
//! ```

use super::candidate::{Candidate, Stage};
use super::resolve::describe;
use super::timex::Timex;
use crate::Token;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunMetrics {
    /// Total elapsed time for the run.
    pub total: Duration,
    /// Token preparation, rule scanning and overlap pruning.
    pub extraction: Duration,
    pub merging: Duration,
    pub anchoring: Duration,
    /// Resolution passes, splitting and output.
    pub resolution: Duration,
    /// Rule matches that became candidates.
    pub fired: usize,
    /// Matches deleted by a negative pattern.
    pub vetoed: usize,
    /// Duplicate derivations dropped before they became candidates.
    pub duplicates: usize,
    /// Candidates subsumed by a larger one.
    pub pruned: usize,
    pub merged: usize,
    /// Candidates linked to a sibling expression.
    pub anchored: usize,
    /// Top-level expressions that got a value.
    pub resolved: usize,
    /// Ranges split and durations given implicit endpoints.
    pub split: usize,
}

/// Compact view of one candidate, for verbose output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub rule: String,
    pub start: usize,
    pub end: usize,
    pub stage: Stage,
    pub markers: Vec<String>,
    pub instructions: Vec<String>,
    pub value: Option<String>,
    /// Rule of the candidate this one was pruned in favour of.
    pub subsumed_by: Option<String>,
    pub top_level: bool,
}

impl CandidateSummary {
    pub(crate) fn new(c: &Candidate, subsumed_by: Option<&Candidate>) -> Self {
        CandidateSummary {
            rule: c.rule.clone(),
            start: c.start,
            end: c.end,
            stage: c.stage,
            markers: c.markers.clone(),
            instructions: c.instructions.iter().map(|i| i.to_string()).collect(),
            value: c.value.as_ref().map(describe),
            subsumed_by: subsumed_by.map(|s| s.rule.clone()),
            top_level: c.is_top_level(),
        }
    }
}

/// Tagger output bundled with run details.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub timexes: Vec<Timex>,
    /// Every candidate of the run, pruned ones included.
    pub candidates: Vec<CandidateSummary>,
    /// The internal token stream, with candidate memberships.
    pub tokens: Vec<Token>,
    pub metrics: RunMetrics,
}
