//! Anchoring: tense-bearing verbs and sibling expressions.
//!
//! Verb search (per top-level candidate):
//!
//! ```text
//!   ... | "  oli   eelmisel  [kolmapäeval]  koosolek  .  |
//!       ▲ stop      ◀── 1. backward ──┘└── 2. forward ──▶ stop at sentence end
//! ```
//!
//! Sibling search (per candidate with an anchored instruction): the nearest
//! candidate carrying the required marker, in the instruction's direction and
//! scope, outside the candidate's own merge tree.

use super::candidate::{Arena, Stage};
use crate::semantics::{AnchorScope, AnchorSpec, SearchDirection};
use crate::{CandidateId, Token};
use tracing::{debug, trace};

/// Nearest tense-bearing verb in the sentence, searching backward first.
/// Quotation marks and sentence boundaries stop the search.
pub(crate) fn find_verb(tokens: &[Token], start: usize, end: usize) -> Option<usize> {
    if tokens.get(start).is_some_and(|t| !t.sentence_start) {
        for i in (0..start).rev() {
            let token = &tokens[i];
            if token.is_quote() || token.sentence_end {
                break;
            }
            if token.tense.is_some() {
                return Some(i);
            }
            if token.sentence_start {
                break;
            }
        }
    }
    if tokens.get(end).is_some_and(|t| !t.sentence_end) {
        for (i, token) in tokens.iter().enumerate().skip(end + 1) {
            if token.is_quote() || token.sentence_start {
                break;
            }
            if token.tense.is_some() {
                return Some(i);
            }
            if token.sentence_end {
                break;
            }
        }
    }
    None
}

/// True if a sentence boundary lies between positions `a < b`.
fn crosses_sentence(tokens: &[Token], a: usize, b: usize) -> bool {
    tokens[a..b].iter().any(|t| t.sentence_end) || tokens[a + 1..=b].iter().any(|t| t.sentence_start)
}

/// Nearest candidate satisfying `spec` relative to `id`. Sentence-scoped
/// searches still stop `sentence_radius` words away.
pub(crate) fn find_sibling(
    arena: &Arena,
    tokens: &[Token],
    id: CandidateId,
    spec: &AnchorSpec,
    sentence_radius: usize,
) -> Option<CandidateId> {
    let me = arena.get(id);
    let root = arena.root_of(id);
    let mut best: Option<(usize, bool, CandidateId)> = None;

    for other in arena.iter() {
        if other.detached || other.stage == Stage::Implicit || !other.has_marker(&spec.marker) {
            continue;
        }
        if arena.root_of(other.id) == root {
            continue;
        }
        let (backward, distance, (a, b)) = if other.end < me.start {
            (true, me.start - other.end - 1, (other.end, me.start))
        } else if other.start > me.end {
            (false, other.start - me.end - 1, (me.end, other.start))
        } else {
            continue;
        };
        let allowed = match spec.direction {
            SearchDirection::Backward => backward,
            SearchDirection::Forward => !backward,
            SearchDirection::Both => true,
        };
        let in_scope = match spec.scope {
            AnchorScope::Sentence => distance <= sentence_radius && !crosses_sentence(tokens, a, b),
            AnchorScope::Words(radius) => distance <= radius,
        };
        if !allowed || !in_scope {
            continue;
        }
        // Closer wins; on a tie, the backward one.
        let better = match best {
            None => true,
            Some((d, was_backward, _)) => distance < d || distance == d && backward && !was_backward,
        };
        if better {
            best = Some((distance, backward, other.id));
        }
    }

    let found = best.map(|(_, _, id)| id);
    match found {
        Some(anchor) => debug!(candidate = %me.rule, anchor = %arena.get(anchor).rule, marker = %spec.marker, "sibling anchor"),
        None => trace!(candidate = %me.rule, marker = %spec.marker, "no sibling anchor in scope"),
    }
    found
}

/// Attach verbs to top-level candidates and sibling anchors to every live
/// candidate with an anchored instruction.
pub(crate) fn anchor_all(arena: &mut Arena, tokens: &[Token], sentence_radius: usize) -> usize {
    for id in arena.top_level() {
        let (start, end) = (arena.get(id).start, arena.get(id).end);
        let verb = find_verb(tokens, start, end);
        if let Some(v) = verb {
            trace!(candidate = %arena.get(id).rule, verb = %tokens[v].text, tense = ?tokens[v].tense, "verb anchor");
        }
        arena.get_mut(id).verb = verb;
    }

    let mut anchored = 0;
    let live: Vec<CandidateId> = arena.iter().filter(|c| !c.detached && c.needs_anchor()).map(|c| c.id).collect();
    for id in live {
        let spec = arena.get(id).instructions.iter().find_map(|i| i.anchor.clone());
        let Some(spec) = spec else { continue };
        if let Some(anchor) = find_sibling(arena, tokens, id, &spec, sentence_radius) {
            arena.get_mut(id).anchor = Some(anchor);
            anchored += 1;
        }
    }
    anchored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;
    use crate::engine::input::prepare;
    use crate::granularity::Granularity;
    use crate::pattern::RawCandidate;
    use crate::semantics::{Attributes, SemanticInstruction, Value};

    fn words(text: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = text
            .split_whitespace()
            .map(|w| match w {
                "oli" => Token::new(w).with_analysis("olema", "V", "s"),
                "tuleb" => Token::new(w).with_analysis("tulema", "V", "b"),
                _ => Token::new(w),
            })
            .collect();
        if let Some(first) = tokens.first_mut() {
            first.sentence_start = true;
        }
        prepare(tokens, &Options::default())
    }

    #[test]
    fn verb_search_prefers_backward() {
        let tokens = words("koosolek oli kolmapäeval ja tuleb");
        assert_eq!(find_verb(&tokens, 2, 2), Some(1));
        let tokens = words("kolmapäeval tuleb koosolek");
        assert_eq!(find_verb(&tokens, 0, 0), Some(1));
    }

    #[test]
    fn verb_search_stops_at_boundaries() {
        let mut tokens = words("oli \" kolmapäeval");
        assert_eq!(find_verb(&tokens, 2, 2), None);
        tokens = words("oli . kolmapäeval");
        tokens[1].sentence_end = true;
        tokens[2].sentence_start = true;
        assert_eq!(find_verb(&tokens, 2, 2), None);
    }

    fn raw(rule: &str, start: usize, end: usize, marker: &str, anchored: Option<AnchorSpec>) -> RawCandidate {
        let mut instructions = Vec::new();
        if let Some(spec) = anchored {
            instructions.push(SemanticInstruction::add(Granularity::DayOfMonth, Value::int(2)).anchored(spec));
        }
        RawCandidate {
            rule: rule.to_string(),
            start,
            end,
            kind: None,
            instructions,
            markers: vec![marker.to_string()],
            attributes: Attributes::default(),
        }
    }

    #[test]
    fn sibling_is_nearest_in_direction_and_scope() {
        let mut tokens = words("3. juunil ja 5. juunil kaks päeva hiljem");
        let mut arena = Arena::default();
        let _far = arena.push_extracted(raw("far", 0, 1, "DATE", None), &mut tokens);
        let near = arena.push_extracted(raw("near", 3, 4, "DATE", None), &mut tokens);
        let later = arena.push_extracted(
            raw("later", 5, 7, "REL", Some(AnchorSpec::backward("DATE").within_words(2))),
            &mut tokens,
        );
        assert_eq!(anchor_all(&mut arena, &tokens, 30), 1);
        assert_eq!(arena.get(later).anchor, Some(near));

        let spec = AnchorSpec::backward("DATE").towards(SearchDirection::Forward);
        assert_eq!(find_sibling(&arena, &tokens, later, &spec, 30), None);

        let sentence = AnchorSpec::backward("DATE");
        assert_eq!(find_sibling(&arena, &tokens, later, &sentence, 30), Some(near));
    }
}
