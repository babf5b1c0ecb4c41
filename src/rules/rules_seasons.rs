//! Seasons, quarters, half-years and weekends.

use super::helpers::direction_class;
use crate::granularity::Granularity;
use crate::pattern::{NumeralKind, PatternElement, Rule, WordPattern};
use crate::semantics::{Direction, SemanticInstruction as I, TimexType, Value};

fn season_class() -> WordPattern {
    WordPattern::class(
        "SEASON",
        vec![
            WordPattern::lemma(&["kevad"]).valued(Value::label("SP")),
            WordPattern::lemma(&["suvi"]).valued(Value::label("SU")),
            WordPattern::lemma(&["sügis"]).valued(Value::label("FA")),
            WordPattern::lemma(&["talv"]).valued(Value::label("WI")),
        ],
    )
}

/// "suvel", "talveks": the nearest such season.
pub fn rule_season() -> Rule {
    rule! {
        name: "<season>",
        pattern: [season_class()],
        kind: TimexType::Date,
        semantics: [I::seek(Granularity::Month, Value::reference("SEASON"), Direction::FromTense)],
        markers: ["DATE"],
    }
}

/// "eelmisel suvel", "järgmisel talvel"
pub fn rule_relative_season() -> Rule {
    rule! {
        name: "<dir> <season>",
        pattern: [direction_class(), season_class()],
        kind: TimexType::Date,
        semantics: [
            I::seek(Granularity::Month, Value::reference("SEASON"), Direction::Ref("DIR".into())).excluding_current(),
        ],
        markers: ["DATE"],
    }
}

fn ordinal_part(name: &str, nouns: &[&str], prefix: &str, max: i64) -> Rule {
    let ordinal = WordPattern::numeral(&[NumeralKind::Ordinal, NumeralKind::Roman]).in_range(1, max);
    let label = Value::Template { prefix: prefix.to_string(), source: Box::new(Value::reference("ORD")) };
    Rule::new(name, vec![PatternElement::from(ordinal).labeled("ORD"), WordPattern::lemma(nouns).into()])
        .kind(TimexType::Date)
        .semantics(vec![I::seek(Granularity::Month, label, Direction::Nearest)])
        .marker("DATE")
}

/// "teises kvartalis", "II kvartal", "esimesel poolaastal"
pub fn rules_quarters() -> Vec<Rule> {
    vec![
        ordinal_part("<ord> kvartal", &["kvartal"], "Q", 4),
        ordinal_part("<ord> poolaasta", &["poolaasta"], "H", 2),
    ]
}

/// "nädalavahetusel": the weekend of the current week.
pub fn rule_weekend() -> Rule {
    rule! {
        name: "<weekend>",
        pattern: [lemma!["nädalavahetus"]],
        kind: TimexType::Date,
        semantics: [I::set(Granularity::DayOfWeek, Value::label("WE"))],
        markers: ["DATE"],
    }
}

/// "eelmisel nädalavahetusel"
pub fn rule_relative_weekend() -> Rule {
    rule! {
        name: "<dir> <weekend>",
        pattern: [direction_class(), lemma!["nädalavahetus"]],
        kind: TimexType::Date,
        semantics: [
            I::add(Granularity::WeekOfYear, Value::reference("DIR")),
            I::set(Granularity::DayOfWeek, Value::label("WE")),
        ],
        markers: ["DATE"],
    }
}

pub fn rules() -> Vec<Rule> {
    let mut rules = vec![rule_season(), rule_relative_season(), rule_weekend(), rule_relative_weekend()];
    rules.extend(rules_quarters());
    rules
}
