//! Month names, day-month dates and parts of a month.

use super::helpers::{NAME_BEFORE_AUGUST, day_of_month, direction_class, month_class, year};
use crate::granularity::Granularity;
use crate::pattern::{Filter, NegativePattern, PatternElement, Rule, WordPattern};
use crate::semantics::{Direction, SemanticInstruction as I, TimexType, Value};

/// "juunis", "augustist", "detsembrini". A capitalized "August" after a
/// capitalized word is a name, not the month.
pub fn rule_month() -> Rule {
    rule! {
        name: "<month>",
        pattern: [month_class()],
        kind: TimexType::Date,
        semantics: [I::seek(Granularity::Month, Value::reference("MONTH"), Direction::FromTense)],
        markers: ["DATE"],
        negative: [NegativePattern::new(-1, &NAME_BEFORE_AUGUST)],
    }
    .when(vec![Filter::morph("MONTH", "el")], vec![], &["RANGE_FROM"])
    .when(vec![Filter::morph("MONTH", "ter")], vec![], &["RANGE_TO"])
}

/// "5. juunil", "3. juunist 2015", "viiendaks augustiks"
pub fn rule_day_month() -> Rule {
    rule! {
        name: "<day> <month> [<year>]",
        pattern: [
            PatternElement::from(day_of_month()).labeled("DAY"),
            month_class(),
            PatternElement::from(year()).labeled("YEAR").optional(),
        ],
        kind: TimexType::Date,
        semantics: [I::set(Granularity::DayOfMonth, Value::reference("DAY"))],
        markers: ["DATE"],
    }
    .when(
        vec![Filter::not_matched("YEAR")],
        vec![I::seek(Granularity::Month, Value::reference("MONTH"), Direction::Nearest)],
        &[],
    )
    .when(
        vec![Filter::matched("YEAR")],
        vec![I::set(Granularity::Year, Value::reference("YEAR")), I::set(Granularity::Month, Value::reference("MONTH"))],
        &[],
    )
    .when(vec![Filter::morph("MONTH", "el")], vec![], &["RANGE_FROM"])
    .when(vec![Filter::morph("MONTH", "ter")], vec![], &["RANGE_TO"])
}

/// "eelmise aasta juunis", "selle aasta mais"
pub fn rule_month_of_relative_year() -> Rule {
    rule! {
        name: "<dir> aasta <month>",
        pattern: [direction_class(), lemma!["aasta"], month_class()],
        kind: TimexType::Date,
        semantics: [
            I::add(Granularity::Year, Value::reference("DIR")),
            I::set(Granularity::Month, Value::reference("MONTH")),
        ],
        markers: ["DATE"],
    }
}

fn month_part(name: &str, lemmas: &[&str], modifier: &str) -> Rule {
    Rule::new(name, vec![month_class().into(), WordPattern::lemma(lemmas).into()])
        .kind(TimexType::Date)
        .semantics(vec![I::seek(Granularity::Month, Value::reference("MONTH"), Direction::FromTense)])
        .marker("DATE")
        .modifier(modifier)
}

/// "juuni alguses", "augusti keskel", "mai lõpus"
pub fn rules_month_parts() -> Vec<Rule> {
    vec![
        month_part("<month> algus", &["algus"], "START"),
        month_part("<month> kesk", &["kesk", "keskpaik"], "MID"),
        month_part("<month> lõpp", &["lõpp"], "END"),
    ]
}

pub fn rules() -> Vec<Rule> {
    let mut rules = vec![rule_month(), rule_day_month(), rule_month_of_relative_year()];
    rules.extend(rules_month_parts());
    rules
}
