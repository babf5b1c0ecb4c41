//! Numeric dates, clock times, years and centuries.

use super::helpers::year;
use crate::granularity::Granularity;
use crate::pattern::{NegativePattern, NumeralKind, PatternElement, Rule, WordPattern};
use crate::semantics::{Direction, SemanticInstruction as I, TimexType, Value};

/// "3.06.2015", "03.06."
pub fn rule_numeric_date() -> Rule {
    rule! {
        name: "<dd.mm.yyyy>",
        pattern: [re!(r"\d{1,2}\.\d{1,2}\.(\d{4})?").with(I::set(Granularity::Day, Value::Group(0)))],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "2015-06-03"
pub fn rule_iso_date() -> Rule {
    let date = re!(r"(\d{4})-(\d{2})-(\d{2})").with_semantics(vec![
        I::set(Granularity::Year, Value::Group(1)),
        I::set(Granularity::Month, Value::Group(2)),
        I::set(Granularity::DayOfMonth, Value::Group(3)),
    ]);
    rule! {
        name: "<yyyy-mm-dd>",
        pattern: [date],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "kell 14", "kell 9.30", "kella 14:30"
pub fn rule_clock_time() -> Rule {
    rule! {
        name: "kell <hh[:mm]>",
        pattern: [
            lit!["kell", "kella", "kellast", "kellani"],
            re!(r"([01]?\d|2[0-4])([:.][0-5]\d)?\.?").with(I::set(Granularity::TimeOfDay, Value::Group(0))),
        ],
        kind: TimexType::Time,
        markers: ["TIME"],
    }
}

/// "14:30" without a leading "kell".
pub fn rule_bare_clock_time() -> Rule {
    rule! {
        name: "<hh:mm>",
        pattern: [re!(r"([01]?\d|2[0-3]):[0-5]\d").with(I::set(Granularity::TimeOfDay, Value::Group(0)))],
        kind: TimexType::Time,
        markers: ["TIME"],
    }
}

/// "umbes kell 14"
pub fn rule_approximate_time() -> Rule {
    rule! {
        name: "umbes kell <hh[:mm]>",
        pattern: [
            lit!["umbes", "umbkaudu", "ligikaudu"],
            lit!["kell", "kella", "kellast", "kellani"],
            re!(r"([01]?\d|2[0-4])([:.][0-5]\d)?\.?").with(I::set(Granularity::TimeOfDay, Value::Group(0))),
        ],
        kind: TimexType::Time,
        markers: ["TIME"],
    }
    .modifier("APPROX")
}

/// "2015. aastal", "1999. aasta"
pub fn rule_year_noun() -> Rule {
    rule! {
        name: "<year> aasta",
        pattern: [PatternElement::from(year()).labeled("YEAR"), lemma!["aasta"]],
        kind: TimexType::Date,
        semantics: [I::set(Granularity::Year, Value::reference("YEAR"))],
        markers: ["DATE"],
    }
}

/// "2015"
pub fn rule_bare_year() -> Rule {
    rule! {
        name: "<yyyy>",
        pattern: [PatternElement::from(WordPattern::numeral(&[NumeralKind::Digits]).in_range(1900, 2100)).labeled("YEAR")],
        kind: TimexType::Date,
        semantics: [I::set(Granularity::Year, Value::reference("YEAR"))],
        markers: ["DATE"],
    }
}

/// "'09": the nearest year ending in 09.
pub fn rule_two_digit_year() -> Rule {
    rule! {
        name: "'<yy>",
        pattern: [re!(r"'(\d{2})").with(I::seek(Granularity::YearOfCentury, Value::Group(1), Direction::Nearest))],
        kind: TimexType::Date,
        markers: ["DATE"],
    }
}

/// "XX sajandil", "19. sajandi"
pub fn rule_century() -> Rule {
    let century = WordPattern::numeral(&[NumeralKind::Roman, NumeralKind::Ordinal]).in_range(1, 30);
    rule! {
        name: "<century> sajand",
        pattern: [PatternElement::from(century).labeled("CENTURY"), lemma!["sajand"]],
        kind: TimexType::Date,
        semantics: [I::set(Granularity::Century, Value::Ref { label: "CENTURY".into(), negate: false, offset: -1 })],
        markers: ["DATE"],
    }
}

/// Left half of a split "3.-5." token. Not after "kell", where the halves
/// are hours.
pub fn rule_day_range_start() -> Rule {
    rule! {
        name: "<day>-",
        pattern: [re!(r"(\d{1,2})\.?-").with(I::set(Granularity::DayOfMonth, Value::Group(1)))],
        kind: TimexType::Date,
        markers: ["RANGE_DAY_FROM"],
        negative: [NegativePattern::new(-1, &["[Kk]ell(a|ast)?"])],
    }
}

/// Left half of a split "2010-2015" token.
pub fn rule_year_range_start() -> Rule {
    rule! {
        name: "<yyyy>-",
        pattern: [re!(r"(\d{4})-").with(I::set(Granularity::Year, Value::Group(1)))],
        kind: TimexType::Date,
        markers: ["RANGE_YEAR_FROM"],
    }
}

pub fn rules() -> Vec<Rule> {
    vec![
        rule_numeric_date(),
        rule_iso_date(),
        rule_clock_time(),
        rule_bare_clock_time(),
        rule_approximate_time(),
        rule_year_noun(),
        rule_bare_year(),
        rule_two_digit_year(),
        rule_century(),
        rule_day_range_start(),
        rule_year_range_start(),
    ]
}
