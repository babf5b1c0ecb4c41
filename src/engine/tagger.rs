//! The tagging run: one pass over one token sequence.
//!
//! ```text
//! Tagger::new ─ prepare tokens
//!      │
//!  extract()    every rule's automaton over the tokens, deduplicated
//!  prune        overlap elimination
//!  merge        adjacent phrases / ranges, to a fixpoint; prune again
//!  anchor       verbs + sibling anchors
//!  resolve      unanchored trees, then anchored trees in dependency order
//!  split        ranges and implicit endpoints
//!  emit         TIMEX3 records
//! ```
//!
//! All run state (the candidate arena, the dedup set, the ids) lives in the
//! `Tagger` value, so two runs over the same input produce the same output.

use super::anchor::anchor_all;
use super::candidate::Arena;
use super::dedup::CandidateKey;
use super::input::prepare;
use super::merge::merge_adjacent;
use super::metrics::{CandidateSummary, RunMetrics, RunResult};
use super::overlap::eliminate;
use super::resolve::Resolver;
use super::split::split_all;
use super::timex::{Timex, emit};
use crate::pattern::MergeRule;
use crate::{Context, Options, Rule, Token};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct Tagger<'a> {
    rules: &'a [Rule],
    merges: &'a [MergeRule],
    /// Internal (possibly re-split) token stream.
    tokens: Vec<Token>,
    arena: Arena,
    seen: HashSet<CandidateKey>,
}

impl<'a> Tagger<'a> {
    pub fn new(tokens: Vec<Token>, rules: &'a [Rule], merges: &'a [MergeRule], options: &Options) -> Self {
        Tagger { rules, merges, tokens: prepare(tokens, options), arena: Arena::default(), seen: HashSet::new() }
    }

    /// Run every rule over the tokens and add the surviving matches.
    fn extract(&mut self, metrics: &mut RunMetrics) {
        for rule in self.rules {
            let extraction = rule.extract(&self.tokens);
            metrics.vetoed += extraction.vetoed;
            for raw in extraction.candidates {
                if !self.seen.insert(CandidateKey::from_raw(&raw)) {
                    metrics.duplicates += 1;
                    continue;
                }
                self.arena.push_extracted(raw, &mut self.tokens);
                metrics.fired += 1;
            }
        }
    }

    pub fn run_with_metrics(mut self, context: &Context, options: &Options) -> RunResult {
        let total_start = Instant::now();
        let mut metrics = RunMetrics::default();
        debug!(tokens = self.tokens.len(), rules = self.rules.len(), "run started");

        let start = Instant::now();
        self.extract(&mut metrics);
        metrics.pruned = eliminate(&mut self.arena, &mut self.tokens);
        metrics.extraction = start.elapsed();

        let start = Instant::now();
        metrics.merged = merge_adjacent(&mut self.arena, self.merges, &mut self.tokens);
        if metrics.merged > 0 {
            metrics.pruned += eliminate(&mut self.arena, &mut self.tokens);
        }
        metrics.merging = start.elapsed();

        let start = Instant::now();
        metrics.anchored = anchor_all(&mut self.arena, &self.tokens, options.anchor_radius);
        metrics.anchoring = start.elapsed();

        let start = Instant::now();
        let reference = context.reference();
        metrics.resolved =
            Resolver::new(&mut self.arena, &self.tokens, reference, options.windows).resolve_all();
        metrics.split = split_all(&mut self.arena, options, reference);
        let timexes = emit(&self.arena, &self.tokens);
        metrics.resolution = start.elapsed();
        metrics.total = total_start.elapsed();

        debug!(
            candidates = self.arena.len(),
            timexes = timexes.len(),
            pruned = metrics.pruned,
            merged = metrics.merged,
            "run finished"
        );

        let candidates = self
            .arena
            .iter()
            .map(|c| CandidateSummary::new(c, c.subsumed_by.map(|by| self.arena.get(by))))
            .collect();
        RunResult { timexes, candidates, tokens: self.tokens, metrics }
    }

    /// Convenience wrapper that discards run details. Use
    /// [`Tagger::run_with_metrics`] to inspect candidates and timings.
    pub fn run(self, context: &Context, options: &Options) -> Vec<Timex> {
        self.run_with_metrics(context, options).timexes
    }
}
