//! Built-in Estonian rule library.
//!
//! Each `rules_*.rs` file exposes one `pub fn rule_*() -> Rule` per pattern
//! and a `rules()` collecting them. Order matters only for ties: of two
//! candidates with the same span, the one from the earlier rule survives.
//!
//! Rules expect analysed tokens: lemmas for word classes, form tags for the
//! range filters (`el` elative "juunist", `ter` terminative "juunini") and
//! numeral values on number words ("kahe" -> 2). Digits, `N.` ordinals and
//! Roman numerals are parsed by the engine.
//!
//! Markers used between rules:
//!
//! - `DATE`, `TIME`: what merge rules and sibling anchors look for.
//! - `RANGE_FROM`, `RANGE_TO`: range ends recognised from the case ending.
//! - `RANGE_DAY_FROM`, `RANGE_YEAR_FROM`: the left half of a split `N-M` token.

#[path = "rules/helpers.rs"]
mod helpers;
#[path = "rules/rules_digits.rs"]
pub mod rules_digits;
#[path = "rules/rules_durations.rs"]
pub mod rules_durations;
#[path = "rules/rules_intervals.rs"]
pub mod rules_intervals;
#[path = "rules/rules_months.rs"]
pub mod rules_months;
#[path = "rules/rules_parts_of_day.rs"]
pub mod rules_parts_of_day;
#[path = "rules/rules_relative.rs"]
pub mod rules_relative;
#[path = "rules/rules_seasons.rs"]
pub mod rules_seasons;
#[path = "rules/rules_weekdays.rs"]
pub mod rules_weekdays;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;

use crate::pattern::{MergeRule, Rule};

/// Every built-in rule, in tie-breaking order.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(rules_digits::rules());
    rules.extend(rules_months::rules());
    rules.extend(rules_weekdays::rules());
    rules.extend(rules_relative::rules());
    rules.extend(rules_durations::rules());
    rules.extend(rules_seasons::rules());
    rules.extend(rules_parts_of_day::rules());
    rules
}

pub fn default_merge_rules() -> Vec<MergeRule> {
    rules_intervals::merge_rules()
}
