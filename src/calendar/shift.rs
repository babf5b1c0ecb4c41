use chrono::{Datelike, Duration as Span, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::granularity::Granularity;

/// Calendar step units, coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DurationUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl DurationUnit {
    /// Step unit and multiplier a granularity moves by.
    pub(crate) fn of(granularity: Granularity) -> (DurationUnit, i64) {
        match granularity {
            Granularity::Century => (DurationUnit::Year, 100),
            Granularity::YearOfCentury | Granularity::Year => (DurationUnit::Year, 1),
            Granularity::Month => (DurationUnit::Month, 1),
            Granularity::WeekOfYear => (DurationUnit::Week, 1),
            Granularity::DayOfMonth | Granularity::DayOfWeek | Granularity::Day => (DurationUnit::Day, 1),
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => {
                (DurationUnit::Hour, 1)
            }
            Granularity::Minute => (DurationUnit::Minute, 1),
        }
    }

    pub(crate) fn letter(self) -> char {
        match self {
            DurationUnit::Year => 'Y',
            DurationUnit::Month | DurationUnit::Minute => 'M',
            DurationUnit::Week => 'W',
            DurationUnit::Day => 'D',
            DurationUnit::Hour => 'H',
        }
    }

    pub(crate) fn is_time(self) -> bool {
        matches!(self, DurationUnit::Hour | DurationUnit::Minute)
    }

    /// Next finer unit and how many of it make one of `self`.
    pub(crate) fn finer(self) -> Option<(DurationUnit, i64)> {
        match self {
            DurationUnit::Year => Some((DurationUnit::Month, 12)),
            DurationUnit::Month => Some((DurationUnit::Day, 30)),
            DurationUnit::Week => Some((DurationUnit::Day, 7)),
            DurationUnit::Day => Some((DurationUnit::Hour, 24)),
            DurationUnit::Hour => Some((DurationUnit::Minute, 60)),
            DurationUnit::Minute => None,
        }
    }

    /// Granularity a point is opened at to show this unit.
    pub(crate) fn granularity(self) -> Granularity {
        match self {
            DurationUnit::Year => Granularity::Year,
            DurationUnit::Month => Granularity::Month,
            DurationUnit::Week | DurationUnit::Day => Granularity::DayOfMonth,
            DurationUnit::Hour => Granularity::HourOfDay,
            DurationUnit::Minute => Granularity::Minute,
        }
    }
}

/// Move `dt` by `amount` units; `None` when the result leaves chrono's range.
pub(crate) fn shift(dt: NaiveDateTime, amount: i64, unit: DurationUnit) -> Option<NaiveDateTime> {
    match unit {
        DurationUnit::Minute => dt.checked_add_signed(Span::try_minutes(amount)?),
        DurationUnit::Hour => dt.checked_add_signed(Span::try_hours(amount)?),
        DurationUnit::Day => dt.checked_add_signed(Span::try_days(amount)?),
        DurationUnit::Week => dt.checked_add_signed(Span::try_weeks(amount)?),
        DurationUnit::Month => add_months(dt, amount),
        DurationUnit::Year => add_months(dt, amount.checked_mul(12)?),
    }
}

/// Month arithmetic clamping the day to the target month's length.
pub(crate) fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let zero_based = dt.year() as i64 * 12 + dt.month0() as i64 + months;
    let year = i32::try_from(zero_based.div_euclid(12)).ok()?;
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = dt.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).map(|d| NaiveDateTime::new(d, dt.time()))
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_next.pred_opt()?.day())
}

/// First instant of the unit containing `dt` (weeks start on Monday).
pub(crate) fn start_of(unit: DurationUnit, dt: NaiveDateTime) -> NaiveDateTime {
    let midnight = NaiveTime::MIN;
    let date = dt.date();
    match unit {
        DurationUnit::Minute => dt.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(dt),
        DurationUnit::Hour => NaiveTime::from_hms_opt(dt.hour(), 0, 0).map_or(dt, |t| NaiveDateTime::new(date, t)),
        DurationUnit::Day => NaiveDateTime::new(date, midnight),
        DurationUnit::Week => {
            let offset = date.weekday().num_days_from_monday() as i64;
            NaiveDateTime::new(date - Span::days(offset), midnight)
        }
        DurationUnit::Month => NaiveDateTime::new(date.with_day(1).unwrap_or(date), midnight),
        DurationUnit::Year => NaiveDateTime::new(NaiveDate::from_ymd_opt(dt.year(), 1, 1).unwrap_or(date), midnight),
    }
}

/// Last instant (minute resolution) of the unit containing `dt`.
pub(crate) fn end_of(unit: DurationUnit, dt: NaiveDateTime) -> NaiveDateTime {
    let start = start_of(unit, dt);
    shift(start, 1, unit).and_then(|next| next.checked_sub_signed(Span::minutes(1))).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn month_shift_clamps_day() {
        assert_eq!(shift(at(2024, 1, 31, 8), 1, DurationUnit::Month), Some(at(2024, 2, 29, 8)));
        assert_eq!(shift(at(2015, 3, 31, 0), -1, DurationUnit::Month), Some(at(2015, 2, 28, 0)));
    }

    #[test]
    fn year_shift_crosses_leap_day() {
        assert_eq!(shift(at(2016, 2, 29, 0), 1, DurationUnit::Year), Some(at(2017, 2, 28, 0)));
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(start_of(DurationUnit::Week, at(2015, 6, 3, 15)), at(2015, 6, 1, 0));
    }

    #[test]
    fn end_of_month_is_last_minute() {
        let end = end_of(DurationUnit::Month, at(2015, 6, 3, 15));
        assert_eq!(end, NaiveDate::from_ymd_opt(2015, 6, 30).unwrap().and_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn days_in_february() {
        assert_eq!(days_in_month(2015, 2), Some(28));
        assert_eq!(days_in_month(2016, 2), Some(29));
        assert_eq!(days_in_month(2015, 12), Some(31));
    }
}
