//! Parts of the day.

use crate::granularity::Granularity;
use crate::pattern::{Rule, WordPattern};
use crate::semantics::{SemanticInstruction as I, TimexType, Value};

fn part_of_day_class() -> WordPattern {
    WordPattern::class(
        "PART",
        vec![
            WordPattern::lemma(&["hommik", "hommikupoolik", "ennelõuna"]).valued(Value::label("MO")),
            WordPattern::lemma(&["pärastlõuna"]).valued(Value::label("AF")),
            WordPattern::lemma(&["õhtu", "õhtupoolik"]).valued(Value::label("EV")),
            WordPattern::lemma(&["öö"]).valued(Value::label("NI")),
        ],
    )
}

/// "hommikul", "õhtuks"; joins a preceding date through the date-time merge.
pub fn rule_part_of_day() -> Rule {
    rule! {
        name: "<part of day>",
        pattern: [part_of_day_class()],
        kind: TimexType::Time,
        semantics: [I::set(Granularity::HourOfDay, Value::reference("PART"))],
        markers: ["TIME"],
    }
}

/// "igal hommikul", "iga õhtu"
pub fn rule_every_part_of_day() -> Rule {
    rule! {
        name: "iga <part of day>",
        pattern: [lemma!["iga"], part_of_day_class()],
        kind: TimexType::Set,
        semantics: [
            I::set(Granularity::Year, Value::Mask),
            I::set(Granularity::Month, Value::Mask),
            I::set(Granularity::DayOfMonth, Value::Mask),
            I::set(Granularity::HourOfDay, Value::reference("PART")),
        ],
    }
    .quant("EVERY")
}

pub fn rules() -> Vec<Rule> {
    vec![rule_part_of_day(), rule_every_part_of_day()]
}
