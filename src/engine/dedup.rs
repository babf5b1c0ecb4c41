//! Deduplication keys for extracted candidates.
//!
//! The automaton can reach the same span of the same rule along several live
//! paths (optional elements, alternative numeral splits). Without a stable
//! key those would all become candidates, and overlap elimination would have
//! to break ties between identical twins.
//!
//! ## What counts as "the same candidate"
//!
//! - Span (`start`, `end`)
//! - Producing rule name
//! - The rendered instruction list
//!
//! Including the instructions keeps two derivations that resolve differently
//! (e.g. a numeral read as day vs. as hour) apart; the first one in rule order
//! still wins later if their spans tie.

use crate::pattern::RawCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CandidateKey {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) rule: String,
    pub(crate) semantics: Vec<String>,
}

impl CandidateKey {
    pub(crate) fn from_raw(raw: &RawCandidate) -> Self {
        CandidateKey {
            start: raw.start,
            end: raw.end,
            rule: raw.rule.clone(),
            semantics: raw.instructions.iter().map(|i| i.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::granularity::Granularity;
    use crate::semantics::{Attributes, SemanticInstruction, Value};

    fn raw(start: usize, value: i64) -> RawCandidate {
        RawCandidate {
            rule: "<day>".to_string(),
            start,
            end: start,
            kind: None,
            instructions: vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::int(value))],
            markers: vec!["DATE".to_string()],
            attributes: Attributes::default(),
        }
    }

    #[test]
    fn same_span_and_semantics_collide() {
        assert_eq!(CandidateKey::from_raw(&raw(2, 5)), CandidateKey::from_raw(&raw(2, 5)));
        assert_ne!(CandidateKey::from_raw(&raw(2, 5)), CandidateKey::from_raw(&raw(2, 6)));
        assert_ne!(CandidateKey::from_raw(&raw(2, 5)), CandidateKey::from_raw(&raw(3, 5)));
    }
}
