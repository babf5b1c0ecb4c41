//! Semantic resolution.
//!
//! Replays each candidate's instructions against a calendar point (or a
//! duration):
//!
//! ```text
//! trees with no anchored instruction      seed = reference time
//! anchored trees, in dependency order     seed = anchor's value
//!   round 1: anchors all resolved            "3. juunil ... kaks päeva hiljem"
//!   round 2: anchors resolved in round 1     "samal päeval" -> "kaks päeva hiljem"
//!   ...
//!   cycle:   links cut, seed = reference, anchored instructions skipped
//! ```
//!
//! A tree is resolved top-down. The parent's own instructions run first;
//! then, for a phrase, each child continues from the previous child's state
//! and the parent takes the last child's value; for a range, every child
//! starts from the parent's state independently.
//!
//! An instruction that cannot be applied (value out of range, unresolved
//! seek direction) is skipped; the rest of the candidate still resolves.

use super::candidate::{Arena, Resolved, Seed};
use crate::calendar::{CalendarPoint, Duration, SeekWindows};
use crate::pattern::MergeKind;
use crate::semantics::TimexType;
use crate::{CandidateId, Tense, Token};
use tracing::{debug, trace, warn};

pub(crate) struct Resolver<'a> {
    arena: &'a mut Arena,
    tokens: &'a [Token],
    reference: &'a CalendarPoint,
    windows: SeekWindows,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        arena: &'a mut Arena,
        tokens: &'a [Token],
        reference: &'a CalendarPoint,
        windows: SeekWindows,
    ) -> Self {
        Resolver { arena, tokens, reference, windows }
    }

    /// Resolve every top-level tree; returns how many got a value.
    pub(crate) fn resolve_all(&mut self) -> usize {
        let roots = self.arena.top_level();
        let (independent, mut pending): (Vec<CandidateId>, Vec<CandidateId>) =
            roots.into_iter().partition(|root| !self.tree_needs_anchor(*root));

        for root in independent {
            self.resolve_tree(root);
        }

        // A dependent tree runs once no tree it anchors to is still pending.
        let mut round = 0;
        while !pending.is_empty() {
            round += 1;
            let ready: Vec<CandidateId> = pending
                .iter()
                .copied()
                .filter(|root| self.anchor_roots(*root).iter().all(|r| !pending.contains(r)))
                .collect();
            if ready.is_empty() {
                self.cut_cycles(&pending);
                continue;
            }
            trace!(round, ready = ready.len(), waiting = pending.len() - ready.len(), "anchored resolution round");
            pending.retain(|root| !ready.contains(root));
            for root in ready {
                self.resolve_tree(root);
            }
        }
        self.arena.top_level().iter().filter(|id| self.arena.get(**id).value.is_some()).count()
    }

    /// Roots of the trees the candidates under `root` are anchored to.
    fn anchor_roots(&self, root: CandidateId) -> Vec<CandidateId> {
        self.arena
            .subtree(root)
            .iter()
            .filter_map(|id| self.arena.get(*id).anchor)
            .map(|anchor| self.arena.root_of(anchor))
            .collect()
    }

    /// Every pending tree waits on another pending one: drop the anchor
    /// links between them. Those candidates resolve from the reference time
    /// without their anchored instructions.
    fn cut_cycles(&mut self, pending: &[CandidateId]) {
        for root in pending {
            for id in self.arena.subtree(*root) {
                let Some(anchor) = self.arena.get(id).anchor else { continue };
                if pending.contains(&self.arena.root_of(anchor)) {
                    let c = self.arena.get_mut(id);
                    warn!(rule = %c.rule, start = c.start, "anchor cycle, link dropped");
                    c.anchor = None;
                }
            }
        }
    }

    fn tree_needs_anchor(&self, root: CandidateId) -> bool {
        self.arena.subtree(root).iter().any(|id| self.arena.get(*id).needs_anchor())
    }

    fn resolve_tree(&mut self, root: CandidateId) {
        let tense = self.arena.get(root).verb.and_then(|v| self.tokens.get(v)).and_then(|t| t.tense);
        let base = self.reference.fresh();
        let value = self.resolve_node(root, base, Seed::Reference, tense);
        let c = self.arena.get(root);
        match &value {
            Some(v) => debug!(rule = %c.rule, start = c.start, end = c.end, value = %describe(v), "resolved"),
            None => debug!(rule = %c.rule, start = c.start, end = c.end, "unresolved"),
        }
    }

    /// Anchor value usable as a seed: a resolved point of another tree.
    fn anchor_point(&self, id: CandidateId) -> Option<(CandidateId, CalendarPoint)> {
        let anchor = self.arena.get(id).anchor?;
        let point = self.arena.get(anchor).value.as_ref()?.point()?;
        Some((anchor, point.clone()))
    }

    fn resolve_node(
        &mut self,
        id: CandidateId,
        base: CalendarPoint,
        seed: Seed,
        tense: Option<Tense>,
    ) -> Option<Resolved> {
        let (base, seed, anchored) = match self.anchor_point(id) {
            Some((anchor, point)) => (point.fresh(), Seed::Anchor(anchor), true),
            None => (base, seed, false),
        };

        let c = self.arena.get(id);
        let instructions: Vec<_> =
            c.instructions.iter().filter(|i| anchored || !i.needs_anchor()).cloned().collect();
        let skipped = c.instructions.len() - instructions.len();
        if skipped > 0 {
            trace!(rule = %c.rule, skipped, "anchored instructions without anchor");
        }
        let is_duration = c.kind == Some(TimexType::Duration) && c.merge_kind().is_none()
            || c.attributes.implicit_endpoints.is_some();
        let (merge_kind, children, rule) = (c.merge_kind(), c.children.clone(), c.rule.clone());

        let own = if is_duration {
            let mut span = Duration::new();
            for instruction in &instructions {
                if let Err(error) = span.apply(instruction) {
                    trace!(rule = %rule, instruction = %instruction, %error, "instruction skipped");
                }
            }
            Resolved::Span(span)
        } else {
            let mut point = base.clone();
            for instruction in &instructions {
                if let Err(error) = point.apply(instruction, tense, &self.windows) {
                    trace!(rule = %rule, instruction = %instruction, %error, "instruction skipped");
                }
            }
            Resolved::Point(point)
        };

        let value = match merge_kind {
            None => Some(own),
            Some(MergeKind::Phrase) => {
                let mut state = own.point().cloned().unwrap_or_else(|| base.clone());
                let mut last = None;
                for child in children {
                    let v = self.resolve_node(child, state.clone(), Seed::Parent, tense);
                    if let Some(Resolved::Point(p)) = &v {
                        state = p.clone();
                    }
                    if v.is_some() {
                        last = v;
                    }
                }
                last.or(Some(own))
            }
            Some(MergeKind::Range) => {
                let state = own.point().cloned().unwrap_or_else(|| base.clone());
                let mut first = None;
                for child in &children {
                    let v = self.resolve_node(*child, state.clone(), Seed::Parent, tense);
                    first = first.or(v);
                }
                self.arena.get_mut(id).value2 = children.get(1).copied();
                first
            }
        };

        let c = self.arena.get_mut(id);
        c.seed = Some(seed);
        c.origin = Some(base);
        c.value = value.clone();
        value
    }
}

pub(crate) fn describe(value: &Resolved) -> String {
    match value {
        Resolved::Point(p) => p.to_string(),
        Resolved::Span(d) => d.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::granularity::Granularity;
    use crate::pattern::RawCandidate;
    use crate::semantics::{AnchorSpec, Attributes, Direction, SearchDirection, SemanticInstruction, Value};
    use pretty_assertions::assert_eq;

    fn reference() -> CalendarPoint {
        CalendarPoint::from_fields(["2015", "06", "01", "12", "00"]).unwrap()
    }

    fn raw(start: usize, end: usize, instructions: Vec<SemanticInstruction>) -> RawCandidate {
        RawCandidate {
            rule: format!("r{start}"),
            start,
            end,
            kind: None,
            instructions,
            markers: vec!["DATE".to_string()],
            attributes: Attributes::default(),
        }
    }

    fn value(arena: &Arena, id: CandidateId) -> String {
        arena.get(id).value.as_ref().map(describe).unwrap_or_default()
    }

    #[test]
    fn phrase_children_continue_from_each_other() {
        let mut tokens: Vec<Token> = ["3.", "juunil", "kell", "14"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let date = arena.push_extracted(
            raw(0, 1, vec![
                SemanticInstruction::set(Granularity::Month, Value::int(6)),
                SemanticInstruction::set(Granularity::DayOfMonth, Value::int(3)),
            ]),
            &mut tokens,
        );
        let time = arena.push_extracted(
            raw(2, 3, vec![SemanticInstruction::set(Granularity::TimeOfDay, Value::Text("14".into()))]),
            &mut tokens,
        );
        let phrase = arena.push_merged("date time", MergeKind::Phrase, date, time, &mut tokens);

        let reference = reference();
        let mut resolver = Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default());
        assert_eq!(resolver.resolve_all(), 1);
        assert_eq!(value(&arena, date), "2015-06-03");
        assert_eq!(value(&arena, phrase), "2015-06-03T14:00");
    }

    #[test]
    fn anchored_candidate_starts_from_its_sibling() {
        let mut tokens: Vec<Token> =
            ["3.", "juunil", "ja", "kaks", "päeva", "hiljem"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let date = arena.push_extracted(raw(0, 1, vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::int(3))]), &mut tokens);
        let later = arena.push_extracted(
            raw(3, 5, vec![
                SemanticInstruction::add(Granularity::DayOfMonth, Value::int(2)).anchored(AnchorSpec::backward("DATE"))
            ]),
            &mut tokens,
        );
        arena.get_mut(later).anchor = Some(date);

        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(value(&arena, later), "2015-06-05");
        assert_eq!(arena.get(later).seed, Some(Seed::Anchor(date)));
    }

    #[test]
    fn anchors_resolve_before_their_dependents() {
        // [samal päeval] 0-1 anchored forward to [kaks päeva hiljem] 4-6,
        // which is anchored back to [3. juunil] 8-9.
        let mut tokens: Vec<Token> = ["samal", "päeval", "ehk", "siis", "kaks", "päeva", "hiljem", "kui", "3.", "juunil"]
            .iter()
            .map(|t| Token::new(t))
            .collect();
        let mut arena = Arena::default();
        let forward = AnchorSpec::backward("DATE").towards(SearchDirection::Forward);
        let same = arena.push_extracted(
            raw(0, 1, vec![SemanticInstruction::add(Granularity::DayOfMonth, Value::int(0)).anchored(forward)]),
            &mut tokens,
        );
        let later = arena.push_extracted(
            raw(4, 6, vec![
                SemanticInstruction::add(Granularity::DayOfMonth, Value::int(2)).anchored(AnchorSpec::backward("DATE")),
            ]),
            &mut tokens,
        );
        let date = arena.push_extracted(raw(8, 9, vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::int(3))]), &mut tokens);
        arena.get_mut(same).anchor = Some(later);
        arena.get_mut(later).anchor = Some(date);

        let reference = reference();
        assert_eq!(Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all(), 3);
        assert_eq!(value(&arena, date), "2015-06-03");
        assert_eq!(value(&arena, later), "2015-06-05");
        assert_eq!(value(&arena, same), "2015-06-05");
        assert_eq!(arena.get(same).seed, Some(Seed::Anchor(later)));
    }

    #[test]
    fn anchor_cycles_fall_back_to_the_reference() {
        let mut tokens: Vec<Token> = ["samal", "päeval", "ja", "samal", "päeval"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let both = AnchorSpec::backward("DATE").towards(SearchDirection::Both);
        let first = arena.push_extracted(
            raw(0, 1, vec![
                SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::Steps(1)),
                SemanticInstruction::add(Granularity::DayOfMonth, Value::int(0)).anchored(both.clone()),
            ]),
            &mut tokens,
        );
        let second = arena.push_extracted(
            raw(3, 4, vec![SemanticInstruction::add(Granularity::DayOfMonth, Value::int(0)).anchored(both)]),
            &mut tokens,
        );
        arena.get_mut(first).anchor = Some(second);
        arena.get_mut(second).anchor = Some(first);

        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(arena.get(first).anchor, None);
        assert_eq!(arena.get(second).anchor, None);
        assert_eq!(value(&arena, first), "2015-06-03");
        assert_eq!(arena.get(second).seed, Some(Seed::Reference));
    }

    #[test]
    fn missing_anchor_skips_anchored_instructions() {
        let mut tokens = vec![Token::new("hiljem")];
        let mut arena = Arena::default();
        let id = arena.push_extracted(
            raw(0, 0, vec![
                SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::Steps(1)),
                SemanticInstruction::add(Granularity::DayOfMonth, Value::int(2)).anchored(AnchorSpec::backward("DATE")),
            ]),
            &mut tokens,
        );
        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(value(&arena, id), "2015-06-03");
    }

    #[test]
    fn durations_resolve_to_spans() {
        let mut tokens = vec![Token::new("kaks"), Token::new("päeva")];
        let mut arena = Arena::default();
        let mut r = raw(0, 1, vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::int(2))]);
        r.kind = Some(TimexType::Duration);
        let id = arena.push_extracted(r, &mut tokens);
        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(value(&arena, id), "P2D");
    }
}
