//! Post-resolution splitting.
//!
//! ```text
//! [3.-5. juunini]  range   -> DURATION P3D, beginPoint = 3. juuni, endPoint = 5. juuni
//! [kahe päeva jooksul]     -> DURATION P2D + implicit 2015-06-01 / 2015-06-03
//! ```
//!
//! A range whose endpoints cannot be measured against each other (a season
//! against a month, for instance) stays a single expression with `value2`.

use super::candidate::{Arena, Resolved};
use crate::calendar::{CalendarPoint, Duration};
use crate::pattern::MergeKind;
use crate::semantics::TimexType;
use crate::{CandidateId, Options};
use tracing::{debug, trace};

/// Split resolved ranges and attach implicit endpoints; returns the number of
/// expressions that gained endpoints.
pub(crate) fn split_all(arena: &mut Arena, options: &Options, reference: &CalendarPoint) -> usize {
    let mut split = 0;
    for id in arena.top_level() {
        if arena.get(id).value.is_none() {
            continue;
        }
        if options.split_ranges && split_range(arena, id) {
            split += 1;
            continue;
        }
        if implicit_endpoints(arena, id, reference) {
            split += 1;
        }
    }
    split
}

fn split_range(arena: &mut Arena, id: CandidateId) -> bool {
    let c = arena.get(id);
    if c.merge_kind() != Some(MergeKind::Range) || !c.split {
        return false;
    }
    let &[begin, end] = c.children.as_slice() else {
        return false;
    };
    let points = arena
        .get(begin)
        .value
        .as_ref()
        .and_then(Resolved::point)
        .zip(arena.get(end).value.as_ref().and_then(Resolved::point));
    let Some((a, b)) = points else {
        trace!(rule = %c.rule, "range endpoints are not both points");
        return false;
    };
    let Some(span) = Duration::between(a, b) else {
        trace!(rule = %c.rule, "range endpoints are not comparable; kept whole");
        return false;
    };

    debug!(rule = %c.rule, span = %span, "range split");
    let c = arena.get_mut(id);
    c.value = Some(Resolved::Span(span));
    c.kind = Some(TimexType::Duration);
    c.endpoints = Some((begin, end));
    c.value2 = None;
    true
}

fn implicit_endpoints(arena: &mut Arena, id: CandidateId, reference: &CalendarPoint) -> bool {
    let c = arena.get(id);
    let Some(direction) = c.attributes.implicit_endpoints else {
        return false;
    };
    let Some(Resolved::Span(span)) = &c.value else {
        return false;
    };
    let seed = c.origin.clone().unwrap_or_else(|| reference.fresh());
    let Some((begin, end)) = span.endpoints(&seed, direction) else {
        trace!(rule = %c.rule, span = %span, "no implicit endpoints for this span");
        return false;
    };

    debug!(rule = %c.rule, begin = %begin, end = %end, "implicit endpoints");
    let begin = arena.push_implicit(id, begin);
    let end = arena.push_implicit(id, end);
    arena.get_mut(id).endpoints = Some((begin, end));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::candidate::Stage;
    use crate::engine::resolve::Resolver;
    use crate::calendar::SeekWindows;
    use crate::granularity::Granularity;
    use crate::pattern::RawCandidate;
    use crate::semantics::{Attributes, EndpointDirection, SemanticInstruction, Value};
    use crate::Token;
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

    fn day(n: i64) -> Vec<SemanticInstruction> {
        vec![
            SemanticInstruction::set(Granularity::Month, Value::int(6)),
            SemanticInstruction::set(Granularity::DayOfMonth, Value::int(n)),
        ]
    }

    fn range(split: bool) -> (Arena, Vec<Token>, CandidateId) {
        let mut tokens: Vec<Token> = ["3.-", "5.", "juunini"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let a = arena.push_extracted(raw(0, 0, day(3)), &mut tokens);
        let b = arena.push_extracted(raw(1, 2, day(5)), &mut tokens);
        let id = arena.push_merged("date-date", MergeKind::Range, a, b, &mut tokens);
        arena.get_mut(id).split = split;
        (arena, tokens, id)
    }

    fn text(arena: &Arena, id: CandidateId) -> String {
        arena.get(id).value.as_ref().map(crate::engine::resolve::describe).unwrap_or_default()
    }

    #[test]
    fn ranges_become_durations_with_endpoints() {
        let (mut arena, tokens, id) = range(true);
        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(split_all(&mut arena, &Options::default(), &reference), 1);

        let c = arena.get(id);
        assert_eq!(c.kind, Some(TimexType::Duration));
        assert_eq!(text(&arena, id), "P3D");
        let (begin, end) = c.endpoints.unwrap();
        assert_eq!(text(&arena, begin), "2015-06-03");
        assert_eq!(text(&arena, end), "2015-06-05");
    }

    #[test]
    fn unsplit_ranges_keep_value2() {
        let (mut arena, tokens, id) = range(true);
        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        let off = Options { split_ranges: false, ..Options::default() };
        assert_eq!(split_all(&mut arena, &off, &reference), 0);
        assert_eq!(text(&arena, id), "2015-06-03");
        let second = arena.get(id).value2.unwrap();
        assert_eq!(text(&arena, second), "2015-06-05");
    }

    #[test]
    fn durations_get_implicit_endpoints() {
        let mut tokens: Vec<Token> = ["kahe", "päeva", "jooksul"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let mut r = raw(0, 2, vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::int(2))]);
        r.kind = Some(TimexType::Duration);
        r.attributes.implicit_endpoints = Some(EndpointDirection::Forward);
        let id = arena.push_extracted(r, &mut tokens);
        let reference = reference();
        Resolver::new(&mut arena, &tokens, &reference, SeekWindows::default()).resolve_all();
        assert_eq!(split_all(&mut arena, &Options::default(), &reference), 1);

        let (begin, end) = arena.get(id).endpoints.unwrap();
        assert_eq!(arena.get(begin).stage, Stage::Implicit);
        assert_eq!(text(&arena, begin), "2015-06-01");
        assert_eq!(text(&arena, end), "2015-06-03");
        assert!(!arena.top_level().contains(&begin));
    }
}
