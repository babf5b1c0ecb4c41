//! Calendar units and their coarse-to-fine order.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One calendar unit a semantic instruction can address.
///
/// The variants are listed coarse to fine, but several share a rank (month and
/// week-of-year, the day flavours, the hour flavours); use [`Granularity::rank`]
/// for "is this finer than that" questions rather than the derived order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Century,
    YearOfCentury,
    Year,
    Month,
    WeekOfYear,
    DayOfMonth,
    DayOfWeek,
    HourOfDay,
    HourOfHalfDay,
    AmPm,
    Minute,
    /// Compound: `HH:MM`, expanded into hour-of-day and minute.
    TimeOfDay,
    /// Compound: `DD.MM.YYYY` (year optional), expanded into date fields.
    Day,
}

/// Field slots of a calendar point, in printing order.
pub(crate) const SLOT_YEAR: usize = 0;
pub(crate) const SLOT_MONTH: usize = 1;
pub(crate) const SLOT_DAY: usize = 2;
pub(crate) const SLOT_HOUR: usize = 3;
pub(crate) const SLOT_MINUTE: usize = 4;
pub(crate) const SLOT_COUNT: usize = 5;

impl Granularity {
    /// Coarse rank: 0 (century) .. 5 (minute). Equal ranks are siblings.
    pub fn rank(self) -> u8 {
        match self {
            Granularity::Century => 0,
            Granularity::YearOfCentury | Granularity::Year => 1,
            Granularity::Month | Granularity::WeekOfYear => 2,
            Granularity::DayOfMonth | Granularity::DayOfWeek | Granularity::Day => 3,
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => 4,
            Granularity::Minute => 5,
        }
    }

    pub fn is_coarser_than(self, other: Granularity) -> bool {
        self.rank() < other.rank()
    }

    pub fn is_finer_than(self, other: Granularity) -> bool {
        self.rank() > other.rank()
    }

    /// The calendar point slot this unit writes to.
    pub(crate) fn slot(self) -> usize {
        match self {
            Granularity::Century | Granularity::YearOfCentury | Granularity::Year => SLOT_YEAR,
            Granularity::Month | Granularity::WeekOfYear => SLOT_MONTH,
            Granularity::DayOfMonth | Granularity::DayOfWeek | Granularity::Day => SLOT_DAY,
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => {
                SLOT_HOUR
            }
            Granularity::Minute => SLOT_MINUTE,
        }
    }

    pub fn is_compound(self) -> bool {
        matches!(self, Granularity::TimeOfDay | Granularity::Day)
    }

    /// Split a compound value into primitive `(granularity, value)` pairs.
    ///
    /// ```text
    /// TimeOfDay "14:30"      -> [(HourOfDay, 14), (Minute, 30)]
    /// Day       "3.06.2015"  -> [(Year, 2015), (Month, 6), (DayOfMonth, 3)]
    /// Day       "3.06"       -> [(Month, 6), (DayOfMonth, 3)]
    /// ```
    ///
    /// Returns `None` if the value does not have the compound's shape; the
    /// instruction is then dropped like any other unresolvable one.
    pub(crate) fn expand(self, value: &str) -> Option<Vec<(Granularity, i64)>> {
        let parts: Vec<&str> = value.split(|c| c == ':' || c == '.').filter(|p| !p.is_empty()).collect();
        let nums: Option<Vec<i64>> = parts.iter().map(|p| p.trim().parse::<i64>().ok()).collect();
        let nums = nums?;
        match self {
            Granularity::TimeOfDay => match nums.as_slice() {
                [h] => Some(vec![(Granularity::HourOfDay, *h), (Granularity::Minute, 0)]),
                [h, m] => Some(vec![(Granularity::HourOfDay, *h), (Granularity::Minute, *m)]),
                _ => None,
            },
            Granularity::Day => match nums.as_slice() {
                [d, m] => Some(vec![(Granularity::Month, *m), (Granularity::DayOfMonth, *d)]),
                [d, m, y] => {
                    Some(vec![(Granularity::Year, *y), (Granularity::Month, *m), (Granularity::DayOfMonth, *d)])
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Granularity::Century => "CENTURY",
            Granularity::YearOfCentury => "YEAR_OF_CENTURY",
            Granularity::Year => "YEAR",
            Granularity::Month => "MONTH",
            Granularity::WeekOfYear => "WEEK_OF_YEAR",
            Granularity::DayOfMonth => "DAY_OF_MONTH",
            Granularity::DayOfWeek => "DAY_OF_WEEK",
            Granularity::HourOfDay => "HOUR_OF_DAY",
            Granularity::HourOfHalfDay => "HOUR_OF_HALF_DAY",
            Granularity::AmPm => "AM_PM",
            Granularity::Minute => "MINUTE",
            Granularity::TimeOfDay => "TIME",
            Granularity::Day => "DAY",
        }
    }
}

impl FromStr for Granularity {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let g = match s.trim().to_ascii_uppercase().as_str() {
            "CENTURY" => Granularity::Century,
            "YEAR_OF_CENTURY" => Granularity::YearOfCentury,
            "YEAR" => Granularity::Year,
            "MONTH" => Granularity::Month,
            "WEEK_OF_YEAR" | "WEEK" => Granularity::WeekOfYear,
            "DAY_OF_MONTH" => Granularity::DayOfMonth,
            "DAY_OF_WEEK" => Granularity::DayOfWeek,
            "HOUR_OF_DAY" => Granularity::HourOfDay,
            "HOUR_OF_HALF_DAY" => Granularity::HourOfHalfDay,
            "AM_PM" => Granularity::AmPm,
            "MINUTE" => Granularity::Minute,
            "TIME" | "TIME_OF_DAY" => Granularity::TimeOfDay,
            "DAY" => Granularity::Day,
            _ => return Err(RuleError::Granularity(s.to_string())),
        };
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_and_month_share_a_rank() {
        assert_eq!(Granularity::Month.rank(), Granularity::WeekOfYear.rank());
        assert!(Granularity::Year.is_coarser_than(Granularity::WeekOfYear));
        assert!(Granularity::Minute.is_finer_than(Granularity::HourOfHalfDay));
        assert!(!Granularity::DayOfWeek.is_finer_than(Granularity::DayOfMonth));
    }

    #[test]
    fn expand_time_of_day() {
        let parts = Granularity::TimeOfDay.expand("14:30").unwrap();
        assert_eq!(parts, vec![(Granularity::HourOfDay, 14), (Granularity::Minute, 30)]);
        assert!(Granularity::TimeOfDay.expand("kell").is_none());
    }

    #[test]
    fn expand_numeric_date() {
        let parts = Granularity::Day.expand("3.06.2015").unwrap();
        assert_eq!(parts[0], (Granularity::Year, 2015));
        assert_eq!(parts[2], (Granularity::DayOfMonth, 3));
    }

    #[test]
    fn parse_names_round_trip() {
        for g in [Granularity::Century, Granularity::WeekOfYear, Granularity::AmPm, Granularity::Day] {
            assert_eq!(g.name().parse::<Granularity>().unwrap(), g);
        }
        assert!("FORTNIGHT".parse::<Granularity>().is_err());
    }
}
