//! TIMEX3 output records.
//!
//! Top-level expressions are emitted in text order, each directly followed by
//! its endpoints (split range parts or implicit points). Ids `t1`, `t2`, ...
//! are handed out in that order; `t0` stands for the document reference time.

use super::candidate::{Arena, Candidate, Resolved, Seed, Stage};
use crate::semantics::{Operation, TimexType};
use crate::granularity::Granularity;
use crate::{CandidateId, Token};
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

/// Identifier of the document creation time.
pub const REFERENCE_TID: &str = "t0";

/// One TIMEX3 annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timex {
    pub tid: String,
    #[serde(rename = "type")]
    pub kind: TimexType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "mod", skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<String>,
    pub temporal_function: bool,
    #[serde(rename = "anchorTimeID", skip_serializing_if = "Option::is_none")]
    pub anchor_time_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_point: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<String>,
    /// Endpoint implied by a duration; not present in the text.
    pub implicit: bool,
    /// Surface text; empty for implicit endpoints.
    pub text: String,
    /// Token positions, inclusive.
    pub start: usize,
    pub end: usize,
    /// Offsets of the first and last token in the source text.
    pub begin_offset: usize,
    pub end_offset: usize,
    pub rule: String,
}

/// Build the annotations for every resolved top-level expression.
pub(crate) fn emit(arena: &Arena, tokens: &[Token]) -> Vec<Timex> {
    let order = emission_order(arena);
    let tids: HashMap<CandidateId, String> =
        order.iter().enumerate().map(|(i, (id, _))| (*id, format!("t{}", i + 1))).collect();

    order.iter().map(|&(id, owner)| build(arena, tokens, &tids, id, owner)).collect()
}

/// `(candidate, owning top-level expression)` in output order.
fn emission_order(arena: &Arena) -> Vec<(CandidateId, CandidateId)> {
    let mut order = Vec::new();
    for root in arena.top_level() {
        let c = arena.get(root);
        if c.value.is_none() {
            trace!(rule = %c.rule, "no value; not emitted");
            continue;
        }
        order.push((root, root));
        if let Some((begin, end)) = c.endpoints {
            order.push((begin, root));
            order.push((end, root));
        }
    }
    order
}

fn build(
    arena: &Arena,
    tokens: &[Token],
    tids: &HashMap<CandidateId, String>,
    id: CandidateId,
    owner: CandidateId,
) -> Timex {
    let c = arena.get(id);
    let root = arena.get(owner);
    let implicit = c.stage == Stage::Implicit;

    let value = c.value.as_ref().and_then(|v| match v {
        Resolved::Point(p) => p.to_value_string().ok(),
        Resolved::Span(d) => d.to_value_string().ok(),
    });
    let value2 = c.value2.and_then(|second| arena.get(second).value.as_ref()).and_then(|v| match v {
        Resolved::Point(p) => p.to_value_string().ok(),
        Resolved::Span(d) => d.to_value_string().ok(),
    });

    let temporal_function = is_temporal_function(arena, c, owner);
    let anchor_time_id = if temporal_function { anchor_tid(arena, tids, owner) } else { None };
    let (begin_point, end_point) = match c.endpoints {
        Some((b, e)) => (tids.get(&b).cloned(), tids.get(&e).cloned()),
        None => (None, None),
    };

    let (start, end) = (c.start, c.end);
    Timex {
        tid: tids.get(&id).cloned().unwrap_or_default(),
        kind: timex_type(c),
        value,
        modifier: if implicit { None } else { c.attributes.modifier.clone() },
        mod2: if value2.is_some() { c.attributes.modifier.clone() } else { None },
        value2,
        quant: if id == owner { c.attributes.quant.clone() } else { None },
        freq: if id == owner { c.attributes.freq.clone() } else { None },
        temporal_function,
        anchor_time_id,
        begin_point,
        end_point,
        implicit,
        text: if implicit { String::new() } else { surface(tokens, start, end) },
        start,
        end,
        begin_offset: tokens.get(start).map_or(0, |t| t.offset),
        end_offset: tokens.get(end).map_or(0, |t| t.offset),
        rule: root.rule.clone(),
    }
}

fn timex_type(c: &Candidate) -> TimexType {
    match (&c.value, c.kind) {
        (_, Some(TimexType::Set)) => TimexType::Set,
        (Some(Resolved::Span(_)), _) => TimexType::Duration,
        (Some(Resolved::Point(p)), _) if p.shows_time() => TimexType::Time,
        _ => TimexType::Date,
    }
}

/// A value depends on the reference time unless its tree sets an absolute
/// year (or century). Bare durations are never temporal functions.
fn is_temporal_function(arena: &Arena, c: &Candidate, owner: CandidateId) -> bool {
    if matches!(c.value, Some(Resolved::Span(_))) && c.endpoints.is_none() {
        return false;
    }
    let absolute = arena.subtree(owner).iter().any(|id| {
        arena.get(*id).instructions.iter().any(|i| {
            i.op == Operation::Set
                && matches!(i.granularity, Granularity::Year | Granularity::Century)
                && i.value.as_int().is_some()
        })
    });
    !absolute
}

/// The first sibling anchor found in the owner's tree, else the reference.
fn anchor_tid(arena: &Arena, tids: &HashMap<CandidateId, String>, owner: CandidateId) -> Option<String> {
    let anchored = arena.subtree(owner).into_iter().find_map(|id| match arena.get(id).seed {
        Some(Seed::Anchor(anchor)) => Some(anchor),
        _ => None,
    });
    match anchored {
        Some(anchor) => tids.get(&arena.root_of(anchor)).cloned(),
        None => Some(REFERENCE_TID.to_string()),
    }
}

/// Token texts joined by spaces; the halves of a split `N-M` token are
/// joined without one.
fn surface(tokens: &[Token], start: usize, end: usize) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;
    for token in tokens.get(start..=end).unwrap_or_default() {
        let joined = previous.is_some_and(|p| p.range_start && token.range_end && p.offset == token.offset);
        if previous.is_some() && !joined {
            out.push(' ');
        }
        out.push_str(&token.text);
        previous = Some(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarPoint;
    use crate::pattern::RawCandidate;
    use crate::semantics::Attributes;
    use crate::{Options, engine::input::prepare};
    use pretty_assertions::assert_eq;

    #[test]
    fn split_halves_join_without_space() {
        let tokens = prepare(vec![Token::new("3.-5.").at(0), Token::new("juunini").at(6)], &Options::default());
        assert_eq!(surface(&tokens, 0, 2), "3.-5. juunini");
        assert_eq!(surface(&tokens, 1, 2), "5. juunini");
    }

    #[test]
    fn ids_follow_text_order_and_values_decide_the_type() {
        let mut tokens: Vec<Token> = ["kell", "14", "ja", "homme"].iter().map(|t| Token::new(t)).collect();
        let mut arena = Arena::default();
        let raw = |rule: &str, start, end| RawCandidate {
            rule: rule.to_string(),
            start,
            end,
            kind: None,
            instructions: Vec::new(),
            markers: Vec::new(),
            attributes: Attributes::default(),
        };
        let later = arena.push_extracted(raw("homme", 3, 3), &mut tokens);
        let earlier = arena.push_extracted(raw("kell", 0, 1), &mut tokens);

        let reference = CalendarPoint::from_fields(["2015", "06", "01", "12", "00"]).unwrap();
        let mut time = reference.fresh();
        time.set(Granularity::HourOfDay, &crate::Value::int(14), false).unwrap();
        let mut date = reference.fresh();
        date.add(Granularity::DayOfMonth, &crate::Value::int(1), false).unwrap();
        arena.get_mut(earlier).value = Some(Resolved::Point(time));
        arena.get_mut(earlier).seed = Some(Seed::Reference);
        arena.get_mut(later).value = Some(Resolved::Point(date));

        let out = emit(&arena, &tokens);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].tid.as_str(), out[0].kind, out[0].value.as_deref()), ("t1", TimexType::Time, Some("2015-06-01T14")));
        assert_eq!((out[1].tid.as_str(), out[1].kind, out[1].value.as_deref()), ("t2", TimexType::Date, Some("2015-06-02")));
        assert_eq!(out[0].text, "kell 14");
        assert_eq!(out[0].anchor_time_id.as_deref(), Some(REFERENCE_TID));
    }
}
