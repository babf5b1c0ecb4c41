//! Weekday rules.

use super::helpers::{direction_class, month_class, position_class, weekday_class};
use crate::granularity::Granularity;
use crate::pattern::{Filter, Rule};
use crate::semantics::{Direction, SemanticInstruction as I, TimexType, Value};

/// "kolmapäeval", "reedeni": the nearest such day, or the previous one when
/// the sentence is in the past tense.
pub fn rule_weekday() -> Rule {
    rule! {
        name: "<weekday>",
        pattern: [weekday_class()],
        kind: TimexType::Date,
        semantics: [I::seek(Granularity::DayOfWeek, Value::reference("WEEKDAY"), Direction::FromTense)],
        markers: ["DATE"],
    }
    .when(vec![Filter::morph("WEEKDAY", "el")], vec![], &["RANGE_FROM"])
    .when(vec![Filter::morph("WEEKDAY", "ter")], vec![], &["RANGE_TO"])
}

/// "eelmisel kolmapäeval", "järgmisel reedel", "sel laupäeval"
pub fn rule_relative_weekday() -> Rule {
    rule! {
        name: "<dir> <weekday>",
        pattern: [direction_class(), weekday_class()],
        kind: TimexType::Date,
        semantics: [
            I::seek(Granularity::DayOfWeek, Value::reference("WEEKDAY"), Direction::Ref("DIR".into())).excluding_current(),
        ],
        markers: ["DATE"],
    }
}

/// "igal esmaspäeval"
pub fn rule_every_weekday() -> Rule {
    rule! {
        name: "iga <weekday>",
        pattern: [lemma!["iga"], weekday_class()],
        kind: TimexType::Set,
        semantics: [
            I::set(Granularity::Year, Value::Mask),
            I::set(Granularity::WeekOfYear, Value::Mask),
            I::set(Granularity::DayOfWeek, Value::reference("WEEKDAY")),
        ],
    }
    .quant("EVERY")
}

/// "juuni kolmandal esmaspäeval", "mai viimasel reedel"
pub fn rule_nth_weekday_of_month() -> Rule {
    rule! {
        name: "<month> <ord> <weekday>",
        pattern: [month_class(), position_class(), weekday_class()],
        kind: TimexType::Date,
        semantics: [
            I::seek(Granularity::Month, Value::reference("MONTH"), Direction::Nearest),
            I::seek(Granularity::DayOfWeek, Value::reference("WEEKDAY"), Direction::Ref("ORD".into()))
                .within(Granularity::Month),
        ],
        markers: ["DATE"],
    }
}

pub fn rules() -> Vec<Rule> {
    vec![rule_weekday(), rule_relative_weekday(), rule_every_weekday(), rule_nth_weekday_of_month()]
}
