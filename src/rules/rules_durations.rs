//! Durations, with and without implicit endpoints.

use super::helpers::{amount, unit_class};
use crate::pattern::{PatternElement, Rule};
use crate::semantics::{EndpointDirection, SemanticInstruction as I, TimexType, Value};

/// "kaks päeva", "pool tundi", "kolm aastat"
pub fn rule_duration() -> Rule {
    rule! {
        name: "<num> <unit>",
        pattern: [PatternElement::from(amount()).labeled("NUM"), unit_class(|g| I::set(g, Value::reference("NUM")))],
        kind: TimexType::Duration,
    }
}

/// "mitu päeva", "mõni nädal", "paar aastat"
pub fn rule_fuzzy_duration() -> Rule {
    rule! {
        name: "mitu <unit>",
        pattern: [lemma!["mitu", "mõni", "paar"], unit_class(|g| I::set(g, Value::Mask))],
        kind: TimexType::Duration,
    }
}

/// "kahe päeva jooksul": starts at the reference time.
pub fn rule_duration_within() -> Rule {
    rule! {
        name: "<num> <unit> jooksul",
        pattern: [
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::set(g, Value::reference("NUM"))),
            lit!["jooksul", "vältel"],
        ],
        kind: TimexType::Duration,
    }
    .implicit_endpoints(EndpointDirection::Forward)
}

/// "viimase kahe päeva jooksul", "viimased kolm aastat": ends at the
/// reference time.
pub fn rule_duration_last() -> Rule {
    rule! {
        name: "viimane <num> <unit>",
        pattern: [
            lemma!["viimane", "möödunud"],
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::set(g, Value::reference("NUM"))),
            PatternElement::from(lit!["jooksul", "vältel"]).optional(),
        ],
        kind: TimexType::Duration,
    }
    .implicit_endpoints(EndpointDirection::Backward)
}

/// "umbes kaks tundi"
pub fn rule_approximate_duration() -> Rule {
    rule! {
        name: "umbes <num> <unit>",
        pattern: [
            lit!["umbes", "ligikaudu", "umbkaudu"],
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::set(g, Value::reference("NUM"))),
        ],
        kind: TimexType::Duration,
    }
    .modifier("APPROX")
}

pub fn rules() -> Vec<Rule> {
    vec![
        rule_duration(),
        rule_fuzzy_duration(),
        rule_duration_within(),
        rule_duration_last(),
        rule_approximate_duration(),
    ]
}
