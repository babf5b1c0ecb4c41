//! Candidate expressions and the per-run arena that owns them.
//!
//! Candidates reference each other (merge parent/children, anchor, endpoints)
//! by [`CandidateId`], which is simply the index into the arena. Ids are handed
//! out per run, so repeated runs over the same input are identical.

use crate::calendar::{CalendarPoint, Duration};
use crate::pattern::{MergeKind, RawCandidate};
use crate::semantics::{Attributes, SemanticInstruction, TimexType};
use crate::{CandidateId, Membership, MembershipRole, Token};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Extracted,
    MergedPhrase,
    MergedRange,
    /// Begin or end point implied by a duration.
    Implicit,
}

/// Resolved value of a candidate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolved {
    Point(CalendarPoint),
    Span(Duration),
}

impl Resolved {
    pub(crate) fn point(&self) -> Option<&CalendarPoint> {
        match self {
            Resolved::Point(p) => Some(p),
            Resolved::Span(_) => None,
        }
    }
}

/// Where the values a candidate was resolved from came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Seed {
    Reference,
    Anchor(CandidateId),
    /// Continued from the merge parent or a previous phrase sibling.
    Parent,
}

#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) id: CandidateId,
    pub(crate) rule: String,
    /// Token positions, inclusive.
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) stage: Stage,
    pub(crate) kind: Option<TimexType>,
    pub(crate) instructions: Vec<SemanticInstruction>,
    pub(crate) markers: Vec<String>,
    pub(crate) attributes: Attributes,
    /// Split into a duration plus linked endpoints when resolved.
    pub(crate) split: bool,
    /// Position of the verb whose tense the candidate follows.
    pub(crate) verb: Option<usize>,
    pub(crate) anchor: Option<CandidateId>,
    /// Merge-tree parent.
    pub(crate) parent: Option<CandidateId>,
    pub(crate) children: Vec<CandidateId>,
    /// Larger candidate this one was pruned in favour of.
    pub(crate) subsumed_by: Option<CandidateId>,
    pub(crate) detached: bool,
    pub(crate) value: Option<Resolved>,
    pub(crate) seed: Option<Seed>,
    /// State the candidate started from; implicit endpoints hang off it.
    pub(crate) origin: Option<CalendarPoint>,
    pub(crate) endpoints: Option<(CandidateId, CandidateId)>,
    /// Second point of an unsplit range.
    pub(crate) value2: Option<CandidateId>,
}

impl Candidate {
    fn new(id: CandidateId, rule: String, start: usize, end: usize, stage: Stage) -> Self {
        Candidate {
            id,
            rule,
            start,
            end,
            stage,
            kind: None,
            instructions: Vec::new(),
            markers: Vec::new(),
            attributes: Attributes::default(),
            split: false,
            verb: None,
            anchor: None,
            parent: None,
            children: Vec::new(),
            subsumed_by: None,
            detached: false,
            value: None,
            seed: None,
            origin: None,
            endpoints: None,
            value2: None,
        }
    }

    pub(crate) fn contains(&self, other: &Candidate) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub(crate) fn is_top_level(&self) -> bool {
        !self.detached && self.parent.is_none() && self.stage != Stage::Implicit
    }

    pub(crate) fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    pub(crate) fn needs_anchor(&self) -> bool {
        self.instructions.iter().any(SemanticInstruction::needs_anchor)
    }

    pub(crate) fn merge_kind(&self) -> Option<MergeKind> {
        match self.stage {
            Stage::MergedPhrase => Some(MergeKind::Phrase),
            Stage::MergedRange => Some(MergeKind::Range),
            Stage::Extracted | Stage::Implicit => None,
        }
    }
}

/// All candidates of one run.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    candidates: Vec<Candidate>,
}

impl Arena {
    pub(crate) fn get(&self, id: CandidateId) -> &Candidate {
        &self.candidates[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: CandidateId) -> &mut Candidate {
        &mut self.candidates[id.0]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }

    fn next_id(&self) -> CandidateId {
        CandidateId(self.candidates.len())
    }

    pub(crate) fn push_extracted(&mut self, raw: RawCandidate, tokens: &mut [Token]) -> CandidateId {
        let id = self.next_id();
        let mut c = Candidate::new(id, raw.rule, raw.start, raw.end, Stage::Extracted);
        c.kind = raw.kind;
        c.instructions = raw.instructions;
        c.markers = raw.markers;
        c.attributes = raw.attributes;
        attach(id, c.start, c.end, tokens);
        self.candidates.push(c);
        id
    }

    pub(crate) fn push_merged(
        &mut self,
        rule: &str,
        kind: MergeKind,
        left: CandidateId,
        right: CandidateId,
        tokens: &mut [Token],
    ) -> CandidateId {
        let id = self.next_id();
        let (start, end) = (self.get(left).start, self.get(right).end);
        let stage = match kind {
            MergeKind::Phrase => Stage::MergedPhrase,
            MergeKind::Range => Stage::MergedRange,
        };
        let mut c = Candidate::new(id, rule.to_string(), start, end, stage);
        c.children = vec![left, right];
        attach(id, start, end, tokens);
        self.candidates.push(c);
        self.get_mut(left).parent = Some(id);
        self.get_mut(right).parent = Some(id);
        id
    }

    pub(crate) fn push_implicit(&mut self, owner: CandidateId, point: CalendarPoint) -> CandidateId {
        let id = self.next_id();
        let (start, end, rule) = {
            let o = self.get(owner);
            (o.start, o.end, o.rule.clone())
        };
        let mut c = Candidate::new(id, rule, start, end, Stage::Implicit);
        c.kind = Some(TimexType::Date);
        c.value = Some(Resolved::Point(point));
        c.seed = self.get(owner).seed;
        self.candidates.push(c);
        id
    }

    /// Detach `id` from every token it covers.
    pub(crate) fn detach(&mut self, id: CandidateId, tokens: &mut [Token]) {
        let c = self.get_mut(id);
        c.detached = true;
        for token in &mut tokens[c.start..=c.end] {
            token.memberships.retain(|m| m.candidate != id);
        }
    }

    /// Outermost merge ancestor.
    pub(crate) fn root_of(&self, mut id: CandidateId) -> CandidateId {
        while let Some(parent) = self.get(id).parent {
            id = parent;
        }
        id
    }

    /// `id` and all its merge descendants, parent before children.
    pub(crate) fn subtree(&self, id: CandidateId) -> Vec<CandidateId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            let next = out[i];
            out.extend(self.get(next).children.iter().copied());
            i += 1;
        }
        out
    }

    /// Top-level candidates in text order.
    pub(crate) fn top_level(&self) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self.candidates.iter().filter(|c| c.is_top_level()).map(|c| c.id).collect();
        ids.sort_by_key(|id| {
            let c = self.get(*id);
            (c.start, std::cmp::Reverse(c.end), c.id)
        });
        ids
    }
}

fn attach(id: CandidateId, start: usize, end: usize, tokens: &mut [Token]) {
    for position in start..=end {
        let role = match (position == start, position == end) {
            (true, true) => MembershipRole::Single,
            (true, false) => MembershipRole::Start,
            (false, true) => MembershipRole::End,
            (false, false) => MembershipRole::Middle,
        };
        if let Some(token) = tokens.get_mut(position) {
            token.memberships.push(Membership { candidate: id, role });
        }
    }
}
