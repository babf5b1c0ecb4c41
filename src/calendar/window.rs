//! SEEK: stepping search, the Baldwin window and N-th subpart lookup.
//!
//! All three walk the focus in whole units of the target (days for weekdays,
//! months for month names and seasons, ...) and test a [`Target`] predicate.
//! Probes are always computed from the original focus (`focus + k units`),
//! so month arithmetic never drifts on short months.

use super::labels::{Label, PartOfDay};
use super::point::{CalendarPoint, DayForm, HourForm, MonthForm, YearForm, integer, label_of, time, with_ymd};
use super::shift::{DurationUnit, end_of, shift, start_of};
use crate::error::ValueError;
use crate::granularity::Granularity;
use crate::Tense;
use crate::semantics::{Direction, Operation, SemanticInstruction, Value};
use chrono::{Datelike, Duration as Span, NaiveDateTime, Timelike};
use tracing::trace;

/// Baldwin window radii, in units of the searched field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekWindows {
    /// Days around the focus for bare weekday names.
    pub weekday: i64,
    /// Months around the focus for bare month names.
    pub month: i64,
    /// Years around the focus for two-digit years.
    pub year_of_century: i64,
    /// Months around the focus for season names.
    pub season: i64,
    /// Months around the focus for quarter and half-year labels.
    pub quarter: i64,
}

impl Default for SeekWindows {
    fn default() -> Self {
        SeekWindows { weekday: 3, month: 6, year_of_century: 5, season: 6, quarter: 6 }
    }
}

impl SeekWindows {
    /// Window radius for a Baldwin search of `value` in `granularity`.
    pub fn radius(&self, granularity: Granularity, value: &Value) -> i64 {
        match label_of(value) {
            Some(Label::Season(_)) => return self.season,
            Some(Label::Quarter(_) | Label::Half(_)) => return self.quarter,
            Some(Label::Weekend | Label::Workday) => return self.weekday,
            _ => {}
        }
        match granularity {
            Granularity::DayOfWeek => self.weekday,
            Granularity::Month => self.month,
            Granularity::YearOfCentury => self.year_of_century,
            _ => 0,
        }
    }
}

/// Step searches give up after this many units per requested match.
const SEEK_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Weekday(u32),
    Month(u32),
    DayOfMonth(u32),
    Week(u32),
    Year(i32),
    YearOfCentury(i32),
    Century(i32),
    Hour(u32),
    Minute(u32),
    Label(Label),
    /// Any unit boundary.
    Boundary(DurationUnit),
}

impl Target {
    fn new(granularity: Granularity, value: &Value) -> Result<Target, ValueError> {
        if *value == Value::Any {
            return Ok(Target::Boundary(DurationUnit::of(granularity).0));
        }
        if let Some(label) = label_of(value) {
            return Ok(Target::Label(label));
        }
        let n = integer(value)?;
        let field_error = || ValueError::Field { field: granularity.name(), value: value.to_string() };
        let small = |lo: i64, hi: i64| if (lo..=hi).contains(&n) { Ok(n as u32) } else { Err(field_error()) };
        let target = match granularity {
            Granularity::DayOfWeek => Target::Weekday(small(1, 7)?),
            Granularity::Month => Target::Month(small(1, 12)?),
            Granularity::DayOfMonth | Granularity::Day => Target::DayOfMonth(small(1, 31)?),
            Granularity::WeekOfYear => Target::Week(small(1, 53)?),
            Granularity::Year => Target::Year(i32::try_from(n).map_err(|_| field_error())?),
            Granularity::YearOfCentury => Target::YearOfCentury(small(0, 99)? as i32),
            Granularity::Century => Target::Century(i32::try_from(n).map_err(|_| field_error())?),
            Granularity::HourOfDay | Granularity::TimeOfDay => Target::Hour(small(0, 23)?),
            Granularity::Minute => Target::Minute(small(0, 59)?),
            Granularity::HourOfHalfDay | Granularity::AmPm => return Err(field_error()),
        };
        Ok(target)
    }

    fn unit(self) -> DurationUnit {
        match self {
            Target::Weekday(_) | Target::DayOfMonth(_) => DurationUnit::Day,
            Target::Month(_) => DurationUnit::Month,
            Target::Week(_) => DurationUnit::Week,
            Target::Year(_) | Target::YearOfCentury(_) | Target::Century(_) => DurationUnit::Year,
            Target::Hour(_) => DurationUnit::Hour,
            Target::Minute(_) => DurationUnit::Minute,
            Target::Label(Label::Season(_) | Label::Quarter(_) | Label::Half(_)) => DurationUnit::Month,
            Target::Label(Label::PartOfDay(_) | Label::Am | Label::Pm) => DurationUnit::Hour,
            Target::Label(Label::Weekend | Label::Workday) => DurationUnit::Day,
            Target::Boundary(unit) => unit,
        }
    }

    fn holds(self, dt: NaiveDateTime) -> bool {
        match self {
            Target::Weekday(d) => dt.weekday().number_from_monday() == d,
            Target::Month(m) => dt.month() == m,
            Target::DayOfMonth(d) => dt.day() == d,
            Target::Week(w) => dt.iso_week().week() == w,
            Target::Year(y) => dt.year() == y,
            Target::YearOfCentury(y) => dt.year().rem_euclid(100) == y,
            Target::Century(c) => dt.year().div_euclid(100) == c,
            Target::Hour(h) => dt.hour() == h,
            Target::Minute(m) => dt.minute() == m,
            Target::Label(label) => label.holds(dt),
            Target::Boundary(_) => true,
        }
    }

    /// The same target taken as absolute within the unit containing `focus`.
    fn in_container(self, focus: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Target::Weekday(d) => {
                let current = focus.weekday().number_from_monday() as i64;
                shift(focus, d as i64 - current, DurationUnit::Day)
            }
            Target::Month(m) => with_ymd(focus, focus.year(), m, focus.day()),
            Target::YearOfCentury(y) => with_ymd(focus, focus.year().div_euclid(100) * 100 + y, focus.month(), focus.day()),
            Target::Label(Label::Season(season)) => with_ymd(focus, focus.year(), season.first_month(), 1),
            Target::Label(Label::Quarter(q)) => with_ymd(focus, focus.year(), (q as u32 - 1) * 3 + 1, 1),
            Target::Label(Label::Half(h)) => with_ymd(focus, focus.year(), (h as u32 - 1) * 6 + 1, 1),
            Target::Label(Label::Weekend) => {
                shift(focus, 6 - focus.weekday().number_from_monday() as i64, DurationUnit::Day)
            }
            Target::Label(Label::PartOfDay(pod)) => Some(NaiveDateTime::new(focus.date(), time(pod.representative_hour(), 0))),
            Target::Hour(h) => Some(NaiveDateTime::new(focus.date(), time(h, focus.minute()))),
            _ => None,
        }
    }

    /// Labels covering several consecutive stepping units. A run of matching
    /// units is one occurrence (one summer, one evening), not several.
    fn spans_units(self) -> bool {
        matches!(
            self,
            Target::Label(
                Label::Season(_) | Label::Quarter(_) | Label::Half(_) | Label::PartOfDay(_) | Label::Am | Label::Pm
                    | Label::Weekend
            )
        )
    }

    /// Granularity the found value is written at.
    fn written(self, requested: Granularity) -> Granularity {
        match self {
            Target::Label(Label::Season(_) | Label::Quarter(_) | Label::Half(_)) => Granularity::Month,
            Target::Label(Label::PartOfDay(_)) => Granularity::HourOfDay,
            Target::Label(Label::Weekend | Label::Workday) => Granularity::DayOfWeek,
            _ => requested,
        }
    }
}

impl CalendarPoint {
    /// Walk `steps` matches from the focus (sign = direction). Zero steps
    /// means "this one": the current unit if it matches, else the next.
    /// Excluding the current match skips the whole occurrence holding the
    /// focus, so "next summer" in June is a year away.
    pub fn seek(
        &mut self,
        granularity: Granularity,
        value: &Value,
        steps: i32,
        exclude_current: bool,
    ) -> Result<(), ValueError> {
        let target = Target::new(granularity, value)?;
        let unit = target.unit();
        let sign: i64 = if steps < 0 { -1 } else { 1 };
        let wanted = (steps as i64).abs().max(1);
        let exclude_current = (exclude_current && steps != 0) || matches!(target, Target::Boundary(_)) && steps != 0;

        let grouped = target.spans_units();
        let mut inside = grouped && exclude_current && target.holds(self.focus);
        let mut found = 0;
        let first = if exclude_current { 1 } else { 0 };
        for i in first..=SEEK_LIMIT * wanted {
            let Some(step) = shift(self.focus, sign * i, unit) else {
                break;
            };
            let holds = target.holds(step);
            let entering = holds && !inside;
            inside = grouped && holds;
            if entering {
                found += 1;
                if found == wanted {
                    trace!(granularity = granularity.name(), %value, steps, found = %step, "seek");
                    self.land(target, granularity, step);
                    return Ok(());
                }
            }
        }
        Err(ValueError::Field { field: granularity.name(), value: value.to_string() })
    }

    /// Baldwin window: the match closest to the focus within `radius` units
    /// (later side first on ties), else the value taken as absolute within
    /// the containing unit.
    pub fn seek_nearest(&mut self, granularity: Granularity, value: &Value, radius: i64) -> Result<(), ValueError> {
        let target = Target::new(granularity, value)?;
        let unit = target.unit();
        for distance in 0..=radius.max(0) {
            let offsets: &[i64] = if distance == 0 { &[0] } else { &[distance, -distance] };
            for &k in offsets {
                if let Some(step) = shift(self.focus, k, unit).filter(|p| target.holds(*p)) {
                    trace!(granularity = granularity.name(), %value, distance = k, "baldwin window hit");
                    self.land(target, granularity, step);
                    return Ok(());
                }
            }
        }

        let step = target
            .in_container(self.focus)
            .ok_or_else(|| ValueError::Field { field: granularity.name(), value: value.to_string() })?;
        trace!(granularity = granularity.name(), %value, radius, "baldwin window miss, absolute fallback");
        self.land(target, granularity, step);
        Ok(())
    }

    /// N-th occurrence of the target inside the `within` unit holding the
    /// focus; negative `n` counts from the end. Fails when the scan leaves
    /// the container before finding it.
    pub fn seek_nth(
        &mut self,
        granularity: Granularity,
        value: &Value,
        n: i32,
        within: Granularity,
    ) -> Result<(), ValueError> {
        let not_found = || ValueError::Field { field: granularity.name(), value: format!("{value} #{n}") };
        if n == 0 {
            return Err(not_found());
        }
        let target = Target::new(granularity, value)?;
        let unit = target.unit();
        let container = DurationUnit::of(within).0;
        let lo = start_of(container, self.focus);
        let hi = end_of(container, self.focus);

        let base = if n < 0 {
            start_of(unit, hi)
        } else if unit == DurationUnit::Week {
            let to_monday = (7 - lo.weekday().num_days_from_monday() as i64) % 7;
            lo.checked_add_signed(Span::days(to_monday)).ok_or_else(not_found)?
        } else {
            lo
        };
        let base = match unit {
            DurationUnit::Day | DurationUnit::Week => NaiveDateTime::new(base.date(), self.focus.time()),
            _ => base,
        };

        let sign: i64 = if n > 0 { 1 } else { -1 };
        let wanted = (n as i64).abs();
        let mut found = 0;
        for i in 0.. {
            let step = shift(base, sign * i, unit).ok_or_else(not_found)?;
            if start_of(unit, step) < start_of(unit, lo) || step > hi {
                return Err(not_found());
            }
            if target.holds(step) {
                found += 1;
                if found == wanted {
                    trace!(granularity = granularity.name(), %value, n, within = within.name(), "nth subpart");
                    self.land(target, granularity, step);
                    return Ok(());
                }
            }
        }
        Err(not_found())
    }

    /// Replay one resolved instruction. `tense` is the tense of the verb the
    /// expression hangs on, if any.
    pub fn apply(
        &mut self,
        instruction: &SemanticInstruction,
        tense: Option<Tense>,
        windows: &SeekWindows,
    ) -> Result<(), ValueError> {
        let (granularity, value) = (instruction.granularity, &instruction.value);
        match instruction.op {
            Operation::Set => self.set(granularity, value, instruction.keep_mask),
            Operation::Add => self.add(granularity, value, instruction.keep_mask),
            Operation::Seek => match (&instruction.direction, instruction.within) {
                (Direction::Steps(n), Some(within)) => self.seek_nth(granularity, value, *n, within),
                (Direction::Steps(n), None) => self.seek(granularity, value, *n, instruction.exclude_current),
                (Direction::FromTense, _) if tense == Some(Tense::Past) => self.seek(granularity, value, -1, true),
                (Direction::Nearest | Direction::FromTense, _) => {
                    self.seek_nearest(granularity, value, windows.radius(granularity, value))
                }
                (Direction::Ref(label), _) => Err(ValueError::Field { field: "direction", value: label.clone() }),
            },
        }
    }

    /// Move the focus to a found instant and show it the way the target reads.
    fn land(&mut self, target: Target, granularity: Granularity, step: NaiveDateTime) {
        self.focus = step;
        match target {
            Target::Label(Label::PartOfDay(pod)) => {
                let date = if pod == PartOfDay::Night && step.hour() < 6 {
                    step.date().pred_opt().unwrap_or(step.date())
                } else {
                    step.date()
                };
                self.focus = NaiveDateTime::new(date, time(pod.representative_hour(), 0));
                self.hour_form = HourForm::PartOfDay(pod);
            }
            Target::Label(Label::Weekend) => {
                if step.weekday().number_from_monday() == 7 {
                    self.focus = shift(step, -1, DurationUnit::Day).unwrap_or(step);
                }
                self.day_form = DayForm::Weekend;
                self.month_form = MonthForm::Week;
            }
            Target::Label(Label::Season(season)) => self.month_form = MonthForm::Season(season),
            Target::Label(Label::Quarter(q)) => self.month_form = MonthForm::Quarter(q),
            Target::Label(Label::Half(h)) => self.month_form = MonthForm::Half(h),
            Target::Label(Label::Am | Label::Pm) | Target::Hour(_) => self.hour_form = HourForm::Hour,
            Target::Weekday(_) | Target::Label(Label::Workday) => self.adopt_weekday_form(),
            Target::DayOfMonth(_) => {
                self.day_form = DayForm::Month;
                self.month_form = MonthForm::Month;
            }
            Target::Month(_) => self.month_form = MonthForm::Month,
            Target::Week(_) => self.month_form = MonthForm::Week,
            Target::Year(_) | Target::YearOfCentury(_) => self.year_form = YearForm::Full,
            Target::Century(_) => self.year_form = YearForm::Century,
            Target::Minute(_) => {}
            Target::Boundary(_) => match granularity {
                Granularity::WeekOfYear => self.month_form = MonthForm::Week,
                Granularity::Month => self.month_form = MonthForm::Month,
                Granularity::DayOfWeek => self.adopt_weekday_form(),
                _ => {}
            },
        }
        self.written(target.written(granularity), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn point(y: &str, m: &str, d: &str) -> CalendarPoint {
        CalendarPoint::from_fields([y, m, d, "12", "00"]).unwrap().fresh()
    }

    #[test]
    fn seek_excluding_current_skips_today() {
        let mut p = point("2015", "06", "01");
        p.seek(Granularity::DayOfWeek, &Value::int(1), 1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-08");

        let mut p = point("2015", "06", "01");
        p.seek(Granularity::DayOfWeek, &Value::int(1), 1, false).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-01");
    }

    #[test]
    fn seek_walks_several_matches() {
        let mut p = point("2015", "06", "01");
        p.seek(Granularity::DayOfWeek, &Value::int(3), 2, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-10");

        let mut p = point("2015", "06", "01");
        p.seek(Granularity::DayOfWeek, &Value::int(3), -1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-05-27");
    }

    #[test]
    fn baldwin_falls_back_to_this_years_month() {
        let mut p = point("2015", "01", "15");
        let windows = SeekWindows { month: 1, ..SeekWindows::default() };
        p.seek_nearest(Granularity::Month, &Value::int(3), windows.month).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-03");
    }

    #[test]
    fn baldwin_prefers_the_closest_match() {
        let mut p = point("2015", "01", "15");
        p.seek_nearest(Granularity::Month, &Value::int(12), 6).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2014-12");

        let mut p = point("2015", "06", "01");
        p.seek_nearest(Granularity::DayOfWeek, &Value::int(3), 3).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-03");
    }

    #[test]
    fn two_digit_year_outside_window_stays_in_century() {
        let mut p = point("2015", "06", "01");
        p.seek_nearest(Granularity::YearOfCentury, &Value::int(9), 5).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2009");

        let mut p = point("2015", "06", "01");
        p.seek_nearest(Granularity::YearOfCentury, &Value::int(99), 20).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "1999");
    }

    #[test]
    fn seasons_and_parts_of_day() {
        let mut p = point("2015", "06", "01");
        p.seek(Granularity::Month, &Value::label("WI"), 1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-WI");

        let mut p = point("2016", "01", "10");
        p.seek_nearest(Granularity::Month, &Value::label("WI"), 6).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-WI");

        let mut p = point("2015", "06", "01");
        p.seek(Granularity::HourOfDay, &Value::label("EV"), 0, false).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-01TEV");
    }

    #[test]
    fn next_and_previous_season_skip_the_current_one() {
        let cases = vec![
            ("2016-SU", "SU", 1),
            ("2014-SU", "SU", -1),
            ("2015-FA", "FA", 1),
            ("2015-WI", "WI", 1),
            ("2014-WI", "WI", -1),
            ("2017-SU", "SU", 2),
        ];
        for (expected, season, steps) in cases {
            let mut p = point("2015", "06", "01");
            p.seek(Granularity::Month, &Value::label(season), steps, true).unwrap();
            assert_eq!(p.to_value_string().unwrap(), expected, "{season} {steps}");
        }

        let mut p = point("2015", "06", "01");
        p.seek(Granularity::Month, &Value::label("SU"), 0, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-SU");
    }

    #[test]
    fn next_and_previous_quarter_skip_the_current_one() {
        let cases = vec![("2016-Q2", "Q2", 1), ("2014-Q2", "Q2", -1), ("2015-Q3", "Q3", 1), ("2015-Q1", "Q1", -1)];
        for (expected, quarter, steps) in cases {
            let mut p = point("2015", "06", "01");
            p.seek(Granularity::Month, &Value::label(quarter), steps, true).unwrap();
            assert_eq!(p.to_value_string().unwrap(), expected, "{quarter} {steps}");
        }

        let mut p = point("2015", "05", "15");
        p.seek(Granularity::Month, &Value::label("H1"), 1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2016-H1");
    }

    #[test]
    fn next_weekend_from_a_saturday() {
        let mut p = point("2015", "06", "06");
        p.seek(Granularity::DayOfWeek, &Value::label("WE"), 1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-W24-WE");
    }

    #[test]
    fn weekend_is_week_based() {
        let mut p = point("2015", "06", "01");
        p.seek_nearest(Granularity::DayOfWeek, &Value::label("WE"), 3).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-W22-WE");

        let mut p = point("2015", "06", "03");
        p.seek(Granularity::DayOfWeek, &Value::label("WE"), 1, true).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-W23-WE");
    }

    #[test]
    fn tense_picks_the_seek_direction() {
        let wednesday = SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::FromTense);
        let windows = SeekWindows::default();

        let mut p = point("2015", "06", "01");
        p.apply(&wednesday, Some(Tense::Past), &windows).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-05-27");

        let mut p = point("2015", "06", "01");
        p.apply(&wednesday, Some(Tense::Present), &windows).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-03");

        let mut p = point("2015", "06", "01");
        p.apply(&wednesday, None, &windows).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-03");
    }

    #[test]
    fn unresolved_direction_is_an_error() {
        let seek = SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::Ref("N".into()));
        let mut p = point("2015", "06", "01");
        assert!(p.apply(&seek, None, &SeekWindows::default()).is_err());
    }

    #[test]
    fn nth_weekday_of_month() {
        let mut p = point("2015", "06", "20");
        p.seek_nth(Granularity::DayOfWeek, &Value::int(1), 3, Granularity::Month).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-15");

        let mut p = point("2015", "06", "20");
        p.seek_nth(Granularity::DayOfWeek, &Value::int(5), -1, Granularity::Month).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-06-26");

        let mut p = point("2015", "06", "20");
        assert!(p.seek_nth(Granularity::DayOfWeek, &Value::int(1), 6, Granularity::Month).is_err());
    }

    #[test]
    fn nth_week_of_month_and_quarter_of_year() {
        let mut p = point("2015", "06", "20");
        p.seek_nth(Granularity::WeekOfYear, &Value::Any, -2, Granularity::Month).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-W26");

        let mut p = point("2015", "06", "20");
        p.seek_nth(Granularity::Month, &Value::label("Q1"), 1, Granularity::Year).unwrap();
        assert_eq!(p.to_value_string().unwrap(), "2015-Q1");
    }
}
