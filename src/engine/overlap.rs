//! Overlap elimination.
//!
//! A candidate whose span lies inside another top-level candidate's span is
//! pruned: it is detached from its tokens and remembers who covered it.
//!
//! ```text
//! sort: start asc, end desc, rule order asc
//!
//!   [kahe päeva jooksul]      kept
//!    [kahe päeva]             subsumed -> detached
//!         [päeva]             subsumed -> detached
//!                [jooksul]    subsumed -> detached
//! ```
//!
//! Equal spans count as covered too; the candidate from the earlier rule
//! survives. Partially overlapping (crossing) candidates are both kept.

use super::candidate::Arena;
use crate::{CandidateId, Token};
use tracing::debug;

/// Prune subsumed top-level candidates; returns how many were pruned.
pub(crate) fn eliminate(arena: &mut Arena, tokens: &mut [Token]) -> usize {
    let mut order: Vec<CandidateId> = arena.iter().filter(|c| c.is_top_level()).map(|c| c.id).collect();
    order.sort_by(|a, b| {
        let (a, b) = (arena.get(*a), arena.get(*b));
        a.start.cmp(&b.start).then(b.end.cmp(&a.end)).then(a.id.cmp(&b.id))
    });

    let mut kept: Vec<CandidateId> = Vec::new();
    let mut pruned = 0;
    for id in order {
        let candidate = arena.get(id);
        let cover = kept.iter().copied().find(|k| arena.get(*k).contains(candidate));
        match cover {
            Some(by) => {
                debug!(
                    rule = %candidate.rule,
                    start = candidate.start,
                    end = candidate.end,
                    by = %arena.get(by).rule,
                    "candidate subsumed"
                );
                arena.get_mut(id).subsumed_by = Some(by);
                arena.detach(id, tokens);
                pruned += 1;
            }
            None => kept.push(id),
        }
    }
    pruned
}
