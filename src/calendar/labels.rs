//! Named calendar values: seasons, quarters, half-years, parts of day,
//! weekend/workday.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn code(self) -> &'static str {
        match self {
            Season::Spring => "SP",
            Season::Summer => "SU",
            Season::Fall => "FA",
            Season::Winter => "WI",
        }
    }

    /// Meteorological seasons; December starts winter.
    pub fn of_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn first_month(self) -> u32 {
        match self {
            Season::Spring => 3,
            Season::Summer => 6,
            Season::Fall => 9,
            Season::Winter => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl PartOfDay {
    pub fn code(self) -> &'static str {
        match self {
            PartOfDay::Morning => "MO",
            PartOfDay::Afternoon => "AF",
            PartOfDay::Evening => "EV",
            PartOfDay::Night => "NI",
        }
    }

    pub fn of_hour(hour: u32) -> PartOfDay {
        match hour {
            6..=11 => PartOfDay::Morning,
            12..=16 => PartOfDay::Afternoon,
            17..=21 => PartOfDay::Evening,
            _ => PartOfDay::Night,
        }
    }

    /// Hour the focus is moved to when only the part of day is known.
    pub fn representative_hour(self) -> u32 {
        match self {
            PartOfDay::Morning => 8,
            PartOfDay::Afternoon => 14,
            PartOfDay::Evening => 19,
            PartOfDay::Night => 23,
        }
    }
}

/// A label value understood by SET and SEEK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Label {
    Season(Season),
    Quarter(u8),
    Half(u8),
    PartOfDay(PartOfDay),
    Weekend,
    Workday,
    Am,
    Pm,
}

impl Label {
    pub(crate) fn parse(text: &str) -> Option<Label> {
        let label = match text.trim().to_ascii_uppercase().as_str() {
            "SP" => Label::Season(Season::Spring),
            "SU" => Label::Season(Season::Summer),
            "FA" => Label::Season(Season::Fall),
            "WI" => Label::Season(Season::Winter),
            "MO" => Label::PartOfDay(PartOfDay::Morning),
            "AF" => Label::PartOfDay(PartOfDay::Afternoon),
            "EV" => Label::PartOfDay(PartOfDay::Evening),
            "NI" => Label::PartOfDay(PartOfDay::Night),
            "WE" => Label::Weekend,
            "WD" => Label::Workday,
            "AM" => Label::Am,
            "PM" => Label::Pm,
            other => {
                let (kind, n) = other.split_at_checked(1)?;
                let n: u8 = n.parse().ok()?;
                match kind {
                    "Q" if (1..=4).contains(&n) => Label::Quarter(n),
                    "H" if (1..=2).contains(&n) => Label::Half(n),
                    _ => return None,
                }
            }
        };
        Some(label)
    }

    pub(crate) fn holds(self, dt: NaiveDateTime) -> bool {
        match self {
            Label::Season(s) => Season::of_month(dt.month()) == s,
            Label::Quarter(q) => quarter_of(dt.month()) == q,
            Label::Half(h) => half_of(dt.month()) == h,
            Label::PartOfDay(p) => PartOfDay::of_hour(dt.hour()) == p,
            Label::Weekend => matches!(dt.weekday(), Weekday::Sat | Weekday::Sun),
            Label::Workday => !matches!(dt.weekday(), Weekday::Sat | Weekday::Sun),
            Label::Am => dt.hour() < 12,
            Label::Pm => dt.hour() >= 12,
        }
    }
}

pub(crate) fn quarter_of(month: u32) -> u8 {
    ((month - 1) / 3 + 1) as u8
}

pub(crate) fn half_of(month: u32) -> u8 {
    if month <= 6 { 1 } else { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_labels() {
        assert_eq!(Label::parse("q2"), Some(Label::Quarter(2)));
        assert_eq!(Label::parse("H1"), Some(Label::Half(1)));
        assert_eq!(Label::parse("EV"), Some(Label::PartOfDay(PartOfDay::Evening)));
        assert_eq!(Label::parse("Q5"), None);
        assert_eq!(Label::parse(""), None);
    }

    #[test]
    fn night_wraps_midnight() {
        assert_eq!(PartOfDay::of_hour(23), PartOfDay::Night);
        assert_eq!(PartOfDay::of_hour(3), PartOfDay::Night);
        assert_eq!(PartOfDay::of_hour(6), PartOfDay::Morning);
    }

    #[test]
    fn quarters_and_seasons() {
        assert_eq!(quarter_of(6), 2);
        assert_eq!(quarter_of(10), 4);
        assert_eq!(Season::of_month(12), Season::Winter);
        assert_eq!(Season::of_month(2), Season::Winter);
    }
}
