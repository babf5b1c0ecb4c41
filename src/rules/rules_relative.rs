//! Deictic days, "next/last <unit>" and offsets from the reference time or
//! from a sibling expression.

use super::helpers::{amount, direction_class, unit_class};
use crate::granularity::Granularity;
use crate::pattern::{PatternElement, Rule, WordPattern};
use crate::semantics::{AnchorSpec, SearchDirection, SemanticInstruction as I, TimexType, Value};

/// "üleeile" .. "ülehomme"
pub fn rule_deictic_day() -> Rule {
    let day = WordPattern::class(
        "DAY",
        vec![
            WordPattern::lemma(&["üleeile", "eile", "täna", "homme", "ülehomme"])
                .valued(Value::AlternativeIndex { offset: -2 }),
        ],
    );
    rule! {
        name: "<deictic day>",
        pattern: [day],
        kind: TimexType::Date,
        semantics: [I::add(Granularity::DayOfMonth, Value::reference("DAY"))],
        markers: ["DATE"],
    }
}

/// "järgmisel nädalal", "eelmisel aastal", "sel kuul"
pub fn rule_relative_unit() -> Rule {
    rule! {
        name: "<dir> <unit>",
        pattern: [direction_class(), unit_class(|g| I::add(g, Value::reference("DIR")))],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "kahe päeva pärast", "viie aasta pärast"
pub fn rule_units_later() -> Rule {
    rule! {
        name: "<num> <unit> pärast",
        pattern: [
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::add(g, Value::reference("NUM"))),
            lit!["pärast"],
        ],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "kaks päeva tagasi", "kolm aastat eest"
pub fn rule_units_ago() -> Rule {
    rule! {
        name: "<num> <unit> tagasi",
        pattern: [
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::add(g, Value::negated_reference("NUM"))),
            lit!["tagasi", "eest"],
        ],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

fn units_from_sibling(name: &str, words: &[&str], negate: bool) -> Rule {
    let amount_ref = if negate { Value::negated_reference("NUM") } else { Value::reference("NUM") };
    rule! {
        name: name,
        pattern: [
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::add(g, amount_ref.clone()).anchored(AnchorSpec::backward("DATE"))),
            WordPattern::literal(words),
        ],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "kaks päeva hiljem", "kolm nädalat varem": relative to the previous date in the
/// sentence.
pub fn rules_units_from_sibling() -> Vec<Rule> {
    vec![
        units_from_sibling("<num> <unit> hiljem", &["hiljem"], false),
        units_from_sibling("<num> <unit> varem", &["varem"], true),
    ]
}

/// "samal päeval", "samal nädalal": the sibling's unit itself.
pub fn rule_same_unit() -> Rule {
    rule! {
        name: "sama <unit>",
        pattern: [
            lemma!["sama"],
            unit_class(|g| I::add(g, Value::int(0)).anchored(AnchorSpec::backward("DATE").towards(SearchDirection::Both))),
        ],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

pub fn rules() -> Vec<Rule> {
    vec![
        rule_deictic_day(),
        rule_relative_unit(),
        rule_units_later(),
        rule_units_ago(),
        rule_same_unit(),
    ]
    .into_iter()
    .chain(rules_units_from_sibling())
    .collect()
}
