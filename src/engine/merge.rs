//! Merging adjacent top-level candidates into phrases and ranges.
//!
//! Runs to a fixpoint: a merged candidate carries the merge rule's markers
//! and can take part in a further merge (`3. juunil kell 14` -> DATE, then
//! `... kuni 5. juunini` -> range).

use super::candidate::Arena;
use crate::pattern::MergeRule;
use crate::{CandidateId, Token};
use tracing::debug;

/// Apply `rules` until no pair merges; returns the number of merges.
pub(crate) fn merge_adjacent(arena: &mut Arena, rules: &[MergeRule], tokens: &mut [Token]) -> usize {
    let mut merged = 0;
    while let Some((rule, left, right)) = find_pair(arena, rules, tokens) {
        let id = arena.push_merged(&rule.name, rule.kind, left, right, tokens);
        let c = arena.get_mut(id);
        c.markers = rule.markers.clone();
        c.kind = rule.result_kind;
        c.split = rule.split;
        c.attributes = rule.attributes.clone();
        debug!(rule = %rule.name, kind = ?rule.kind, start = c.start, end = c.end, "candidates merged");
        merged += 1;
    }
    merged
}

fn find_pair<'r>(
    arena: &Arena,
    rules: &'r [MergeRule],
    tokens: &[Token],
) -> Option<(&'r MergeRule, CandidateId, CandidateId)> {
    let top = arena.top_level();
    for pair in top.windows(2) {
        let (left, right) = (arena.get(pair[0]), arena.get(pair[1]));
        if right.start <= left.end {
            continue;
        }
        if let Some(rule) =
            rules.iter().find(|r| r.accepts(&left.markers, &right.markers) && r.connects(tokens, left.end, right.start))
        {
            return Some((rule, left.id, right.id));
        }
    }
    None
}
