//! Word classes shared by several rule files.

use crate::granularity::Granularity;
use crate::pattern::{NumeralKind, WordPattern};
use crate::semantics::{SemanticInstruction, Value};

/// Capitalized word followed by a capitalized "August": a person's name.
pub(crate) const NAME_BEFORE_AUGUST: [&str; 2] = ["[A-ZÕÄÖÜŠŽ][a-zõäöüšž]+", "August"];

/// Weekday names; the class value is 1 (Monday) .. 7 (Sunday).
pub(crate) fn weekday_class() -> WordPattern {
    WordPattern::class(
        "WEEKDAY",
        vec![
            WordPattern::lemma(&[
                "esmaspäev",
                "teisipäev",
                "kolmapäev",
                "neljapäev",
                "reede",
                "laupäev",
                "pühapäev",
            ])
            .valued(Value::AlternativeIndex { offset: 1 }),
        ],
    )
}

/// Month names and their abbreviations; the class value is the month number.
pub(crate) fn month_class() -> WordPattern {
    WordPattern::class(
        "MONTH",
        vec![
            WordPattern::lemma(&[
                "jaanuar",
                "veebruar",
                "märts",
                "aprill",
                "mai",
                "juuni",
                "juuli",
                "august",
                "september",
                "oktoober",
                "november",
                "detsember",
            ])
            .valued(Value::AlternativeIndex { offset: 1 }),
            WordPattern::literal(&[
                "jaan", "veebr", "märts", "apr", "mai", "juuni", "juuli", "aug", "sept", "okt", "nov", "dets",
            ])
            .valued(Value::AlternativeIndex { offset: 1 }),
        ],
    )
}

/// `eelmine` / `järgmine` / `see`: a step count of -1, +1 or 0.
pub(crate) fn direction_class() -> WordPattern {
    WordPattern::class(
        "DIR",
        vec![
            WordPattern::lemma(&["eelmine", "möödunud", "mullune"]).valued(Value::int(-1)),
            WordPattern::lemma(&["järgmine", "tulev", "eelseisev"]).valued(Value::int(1)),
            WordPattern::lemma(&["see", "käesolev", "praegune"]).valued(Value::int(0)),
        ],
    )
}

/// Calendar unit nouns. Each member contributes the instruction `make`
/// builds for its granularity.
pub(crate) fn unit_class(make: impl Fn(Granularity) -> SemanticInstruction) -> WordPattern {
    let units: [(&[&str], Granularity); 6] = [
        (&["aasta"], Granularity::Year),
        (&["kuu"], Granularity::Month),
        (&["nädal"], Granularity::WeekOfYear),
        (&["päev", "ööpäev"], Granularity::DayOfMonth),
        (&["tund"], Granularity::HourOfDay),
        (&["minut"], Granularity::Minute),
    ];
    WordPattern::class(
        "UNIT",
        units.into_iter().map(|(lemmas, granularity)| WordPattern::lemma(lemmas).with(make(granularity))).collect(),
    )
}

/// Amount in front of a unit noun: a number word or digits, never a year.
pub(crate) fn amount() -> WordPattern {
    WordPattern::numeral(&[NumeralKind::Cardinal, NumeralKind::Digits, NumeralKind::Fraction]).in_range(0, 999)
}

/// Day of month written as `5.` or as an ordinal word.
pub(crate) fn day_of_month() -> WordPattern {
    WordPattern::numeral(&[NumeralKind::Ordinal, NumeralKind::Digits]).in_range(1, 31)
}

/// Four-digit calendar year, with or without the ordinal dot.
pub(crate) fn year() -> WordPattern {
    WordPattern::numeral(&[NumeralKind::Digits, NumeralKind::Ordinal]).in_range(1000, 2100)
}

/// Ordinal position inside a container; `viimane` counts from the end.
pub(crate) fn position_class() -> WordPattern {
    WordPattern::class(
        "ORD",
        vec![
            WordPattern::numeral(&[NumeralKind::Ordinal]).in_range(1, 5),
            WordPattern::lemma(&["viimane"]).valued(Value::int(-1)),
        ],
    )
}
