//! Calendar point: a focus instant plus per-slot visibility.
//!
//! The focus is always a concrete `NaiveDateTime`; what the point *says* is
//! decided by the five slots. Every write re-derives the slots so the printed
//! value stays contiguous and left-anchored:
//!
//! ```text
//!            year   month/week   day    hour/pod   minute
//! coarser  ◀──── opened (or masked if unknown / explicitly masked)
//! written         ───────────▶ opened (masked with keep_mask)
//! finer                            ────▶ unset unless written this pass
//! ```
//!
//! A slot that is unset but sits left of a shown slot prints as a mask, so
//! the value string never has a hole.

use super::labels::{Label, PartOfDay, Season, half_of, quarter_of};
use super::shift::{DurationUnit, add_months, days_in_month, shift};
use crate::error::ValueError;
use crate::granularity::{Granularity, SLOT_COUNT, SLOT_DAY, SLOT_HOUR, SLOT_MINUTE, SLOT_MONTH, SLOT_YEAR};
use crate::semantics::Value;
use crate::NumeralValue;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    Unset,
    Masked,
    Opened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum YearForm {
    Full,
    Century,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MonthForm {
    Month,
    Week,
    Season(Season),
    Quarter(u8),
    Half(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DayForm {
    Month,
    Week,
    Weekend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum HourForm {
    Hour,
    PartOfDay(PartOfDay),
}

bitflags::bitflags! {
    /// Fields written during the current resolution pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Touched: u8 {
        const YEAR         = 1 << 0;
        const MONTH        = 1 << 1;
        const WEEK         = 1 << 2;
        const DAY_OF_MONTH = 1 << 3;
        const DAY_OF_WEEK  = 1 << 4;
        const HOUR         = 1 << 5;
        const MINUTE       = 1 << 6;
    }
}

impl Touched {
    pub(crate) fn of(granularity: Granularity) -> Touched {
        match granularity {
            Granularity::Century | Granularity::YearOfCentury | Granularity::Year => Touched::YEAR,
            Granularity::Month => Touched::MONTH,
            Granularity::WeekOfYear => Touched::WEEK,
            Granularity::DayOfMonth | Granularity::Day => Touched::DAY_OF_MONTH,
            Granularity::DayOfWeek => Touched::DAY_OF_WEEK,
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => {
                Touched::HOUR
            }
            Granularity::Minute => Touched::MINUTE,
        }
    }

    fn of_slot(slot: usize) -> Touched {
        match slot {
            SLOT_YEAR => Touched::YEAR,
            SLOT_MONTH => Touched::MONTH | Touched::WEEK,
            SLOT_DAY => Touched::DAY_OF_MONTH | Touched::DAY_OF_WEEK,
            SLOT_HOUR => Touched::HOUR,
            _ => Touched::MINUTE,
        }
    }
}

/// Resolved date/time with per-field opened/masked/unset status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPoint {
    pub(crate) focus: NaiveDateTime,
    pub(crate) slots: [SlotState; SLOT_COUNT],
    /// Slots whose value came from the seed (reference time or anchor).
    pub(crate) known: [bool; SLOT_COUNT],
    /// Slots explicitly masked; they stay masked until written with a value.
    pub(crate) sticky: [bool; SLOT_COUNT],
    pub(crate) year_form: YearForm,
    pub(crate) month_form: MonthForm,
    pub(crate) day_form: DayForm,
    pub(crate) hour_form: HourForm,
    pub(crate) touched: Touched,
}

enum FieldInput {
    Empty,
    Masked,
    Value(u32),
}

const FIELD_NAMES: [&str; SLOT_COUNT] = ["year", "month", "day", "hour", "minute"];

fn parse_field(slot: usize, raw: &str) -> Result<FieldInput, ValueError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(FieldInput::Empty);
    }
    if raw.chars().all(|c| c == 'X' || c == 'x') {
        return Ok(FieldInput::Masked);
    }
    raw.parse::<u32>()
        .map(FieldInput::Value)
        .map_err(|_| ValueError::Field { field: FIELD_NAMES[slot], value: raw.to_string() })
}

impl CalendarPoint {
    /// Every field opened at `dt`.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        CalendarPoint {
            focus: dt.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(dt),
            slots: [SlotState::Opened; SLOT_COUNT],
            known: [true; SLOT_COUNT],
            sticky: [false; SLOT_COUNT],
            year_form: YearForm::Full,
            month_form: MonthForm::Month,
            day_form: DayForm::Month,
            hour_form: HourForm::Hour,
            touched: Touched::empty(),
        }
    }

    /// Build from five field strings (year, month, day, hour, minute): digits
    /// open a field, an `X` run masks it, an empty string leaves it unset.
    /// Missing finer values default to the first of their range; the year
    /// must be numeric.
    pub fn from_fields(fields: [&str; SLOT_COUNT]) -> Result<Self, ValueError> {
        let mut parsed = Vec::with_capacity(SLOT_COUNT);
        for (slot, raw) in fields.iter().enumerate() {
            parsed.push(parse_field(slot, raw)?);
        }

        let value = |slot: usize, default: u32| match parsed[slot] {
            FieldInput::Value(v) => v,
            _ => default,
        };
        let FieldInput::Value(year) = parsed[SLOT_YEAR] else {
            return Err(ValueError::Field { field: "year", value: fields[SLOT_YEAR].to_string() });
        };
        let (month, day, hour, minute) = (value(SLOT_MONTH, 1), value(SLOT_DAY, 1), value(SLOT_HOUR, 0), value(SLOT_MINUTE, 0));
        let describe = || format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}");
        let date = i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
            .ok_or_else(|| ValueError::Date(describe()))?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| ValueError::Date(describe()))?;

        let mut point = CalendarPoint::from_datetime(NaiveDateTime::new(date, time));
        for (slot, input) in parsed.iter().enumerate() {
            let (state, known, sticky) = match input {
                FieldInput::Empty => (SlotState::Unset, false, false),
                FieldInput::Masked => (SlotState::Masked, false, true),
                FieldInput::Value(_) => (SlotState::Opened, true, false),
            };
            point.slots[slot] = state;
            point.known[slot] = known;
            point.sticky[slot] = sticky;
        }
        Ok(point)
    }

    /// Start of a new resolution pass seeded from this point: nothing shown,
    /// the shown fields of `self` remembered as known.
    pub fn fresh(&self) -> Self {
        CalendarPoint {
            focus: self.focus,
            slots: [SlotState::Unset; SLOT_COUNT],
            known: self.slots.map(|s| s == SlotState::Opened),
            sticky: [false; SLOT_COUNT],
            year_form: YearForm::Full,
            month_form: MonthForm::Month,
            day_form: DayForm::Month,
            hour_form: HourForm::Hour,
            touched: Touched::empty(),
        }
    }

    pub fn focus(&self) -> NaiveDateTime {
        self.focus
    }

    pub fn slot(&self, granularity: Granularity) -> SlotState {
        self.slots[granularity.slot()]
    }

    pub fn is_unset(&self) -> bool {
        self.slots.iter().all(|s| *s == SlotState::Unset)
    }

    /// True when an hour/part-of-day or minute field is shown.
    pub fn shows_time(&self) -> bool {
        self.slots[SLOT_HOUR] != SlotState::Unset || self.slots[SLOT_MINUTE] != SlotState::Unset
    }

    /// Finest shown slot.
    pub(crate) fn finest_slot(&self) -> Option<usize> {
        (0..SLOT_COUNT).rev().find(|&s| self.slots[s] != SlotState::Unset)
    }

    // --- writes ---------------------------------------------------------------

    /// Overwrite a field.
    pub fn set(&mut self, granularity: Granularity, value: &Value, keep_mask: bool) -> Result<(), ValueError> {
        match value {
            Value::Mask => {
                self.mask(granularity);
                return Ok(());
            }
            Value::Any => {
                self.open(granularity);
                return Ok(());
            }
            _ => {}
        }
        if granularity.is_compound() {
            return self.set_compound(granularity, value, keep_mask);
        }
        if let Some(label) = label_of(value) {
            return self.set_label(granularity, label, keep_mask);
        }

        let n = integer(value)?;
        let field_error = || ValueError::Field { field: granularity.name(), value: value.to_string() };
        let focus = self.focus;
        match granularity {
            Granularity::Century => {
                let year = n.checked_mul(100).and_then(|c| c.checked_add(focus.year().rem_euclid(100) as i64));
                self.set_year(year.ok_or_else(field_error)?)?;
                self.year_form = YearForm::Century;
            }
            Granularity::YearOfCentury => {
                if !(0..100).contains(&n) {
                    return Err(field_error());
                }
                self.set_year(focus.year().div_euclid(100) as i64 * 100 + n)?;
                self.year_form = YearForm::Full;
            }
            Granularity::Year => {
                self.set_year(n)?;
                self.year_form = YearForm::Full;
            }
            Granularity::Month => {
                if !(1..=12).contains(&n) {
                    return Err(field_error());
                }
                self.focus = with_ymd(focus, focus.year(), n as u32, focus.day()).ok_or_else(field_error)?;
                self.month_form = MonthForm::Month;
            }
            Granularity::WeekOfYear => {
                let iso = focus.iso_week();
                let date = u32::try_from(n)
                    .ok()
                    .and_then(|w| NaiveDate::from_isoywd_opt(iso.year(), w, focus.weekday()))
                    .ok_or_else(field_error)?;
                self.focus = NaiveDateTime::new(date, focus.time());
                self.month_form = MonthForm::Week;
            }
            Granularity::DayOfMonth => {
                let date = u32::try_from(n).ok().and_then(|d| focus.date().with_day(d)).ok_or_else(field_error)?;
                self.focus = NaiveDateTime::new(date, focus.time());
                self.day_form = DayForm::Month;
                self.month_form = MonthForm::Month;
            }
            Granularity::DayOfWeek => {
                if !(1..=7).contains(&n) {
                    return Err(field_error());
                }
                let current = focus.weekday().number_from_monday() as i64;
                self.focus = shift(focus, n - current, DurationUnit::Day).ok_or_else(field_error)?;
                self.adopt_weekday_form();
            }
            Granularity::HourOfDay => {
                let (date, hour) = match n {
                    0..=23 => (focus.date(), n as u32),
                    24 => (focus.date().succ_opt().ok_or_else(field_error)?, 0),
                    _ => return Err(field_error()),
                };
                self.focus = NaiveDateTime::new(date, time(hour, focus.minute()));
                self.hour_form = HourForm::Hour;
            }
            Granularity::HourOfHalfDay => {
                if !(1..=12).contains(&n) {
                    return Err(field_error());
                }
                let hour = n as u32 % 12 + if focus.hour() >= 12 { 12 } else { 0 };
                self.focus = NaiveDateTime::new(focus.date(), time(hour, focus.minute()));
                self.hour_form = HourForm::Hour;
            }
            Granularity::AmPm => {
                let pm = match n {
                    0 => false,
                    1 => true,
                    _ => return Err(field_error()),
                };
                self.set_half_day(pm);
            }
            Granularity::Minute => {
                if !(0..60).contains(&n) {
                    return Err(field_error());
                }
                self.focus = NaiveDateTime::new(focus.date(), time(focus.hour(), n as u32));
            }
            Granularity::TimeOfDay | Granularity::Day => return self.set_compound(granularity, value, keep_mask),
        }
        self.written(granularity, keep_mask);
        Ok(())
    }

    /// Move a field relative to its current value.
    pub fn add(&mut self, granularity: Granularity, value: &Value, keep_mask: bool) -> Result<(), ValueError> {
        match value {
            Value::Mask => {
                self.mask(granularity);
                return Ok(());
            }
            Value::Any => {
                self.open(granularity);
                return Ok(());
            }
            _ => {}
        }
        let amount = number(value)?;
        let (unit, factor) = DurationUnit::of(granularity);
        let steps = split_amount(amount, unit)
            .into_iter()
            .map(|(u, n)| (u, if u == unit { n * factor } else { n }))
            .collect::<Vec<_>>();

        let mut focus = self.focus;
        for (u, n) in &steps {
            focus = shift(focus, *n, *u)
                .ok_or_else(|| ValueError::Field { field: granularity.name(), value: value.to_string() })?;
        }
        self.focus = focus;

        // A fractional amount ends up written at the finest unit it reached.
        let written = steps.last().map_or(granularity, |(u, _)| if *u == unit { granularity } else { u.granularity() });
        match written {
            Granularity::Century => self.year_form = YearForm::Century,
            Granularity::YearOfCentury | Granularity::Year => self.year_form = YearForm::Full,
            Granularity::Month => self.month_form = MonthForm::Month,
            Granularity::WeekOfYear => self.month_form = MonthForm::Week,
            Granularity::DayOfWeek => self.adopt_weekday_form(),
            Granularity::DayOfMonth | Granularity::Day => {
                self.day_form = DayForm::Month;
                self.month_form = MonthForm::Month;
            }
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => {
                self.hour_form = HourForm::Hour
            }
            Granularity::Minute => {}
        }
        self.written(written, keep_mask);
        Ok(())
    }

    /// Show a field at its current value.
    pub fn open(&mut self, granularity: Granularity) {
        match granularity {
            Granularity::Century => self.year_form = YearForm::Century,
            Granularity::YearOfCentury | Granularity::Year => self.year_form = YearForm::Full,
            Granularity::Month => self.month_form = MonthForm::Month,
            Granularity::WeekOfYear => self.month_form = MonthForm::Week,
            Granularity::DayOfMonth | Granularity::Day => {
                self.day_form = DayForm::Month;
                self.month_form = MonthForm::Month;
            }
            Granularity::DayOfWeek => self.adopt_weekday_form(),
            Granularity::HourOfDay | Granularity::HourOfHalfDay | Granularity::AmPm | Granularity::TimeOfDay => {
                self.hour_form = HourForm::Hour
            }
            Granularity::Minute => {}
        }
        self.written(granularity, false);
    }

    /// Explicitly mask a field; it prints as an `X` run until written with a
    /// concrete value.
    pub fn mask(&mut self, granularity: Granularity) {
        let slot = granularity.slot();
        self.sticky[slot] = true;
        match granularity {
            Granularity::Century => self.year_form = YearForm::Century,
            Granularity::WeekOfYear => self.month_form = MonthForm::Week,
            Granularity::DayOfWeek if self.month_form == MonthForm::Week => self.day_form = DayForm::Week,
            _ => {}
        }
        self.written(granularity, true);
    }

    fn set_compound(&mut self, granularity: Granularity, value: &Value, keep_mask: bool) -> Result<(), ValueError> {
        let parts = granularity
            .expand(&value.to_string())
            .ok_or_else(|| ValueError::Field { field: granularity.name(), value: value.to_string() })?;
        for (g, n) in parts {
            self.set(g, &Value::int(n), keep_mask)?;
        }
        Ok(())
    }

    fn set_label(&mut self, granularity: Granularity, label: Label, keep_mask: bool) -> Result<(), ValueError> {
        let focus = self.focus;
        let field_error = || ValueError::Field { field: granularity.name(), value: format!("{label:?}") };
        let written = match label {
            Label::Season(season) => {
                self.focus = with_ymd(focus, focus.year(), season.first_month(), 1).ok_or_else(field_error)?;
                self.month_form = MonthForm::Season(season);
                Granularity::Month
            }
            Label::Quarter(q) => {
                self.focus = with_ymd(focus, focus.year(), (q as u32 - 1) * 3 + 1, 1).ok_or_else(field_error)?;
                self.month_form = MonthForm::Quarter(q);
                Granularity::Month
            }
            Label::Half(h) => {
                self.focus = with_ymd(focus, focus.year(), (h as u32 - 1) * 6 + 1, 1).ok_or_else(field_error)?;
                self.month_form = MonthForm::Half(h);
                Granularity::Month
            }
            Label::PartOfDay(pod) => {
                self.focus = NaiveDateTime::new(focus.date(), time(pod.representative_hour(), 0));
                self.hour_form = HourForm::PartOfDay(pod);
                Granularity::HourOfDay
            }
            Label::Weekend => {
                let saturday = 6 - focus.weekday().number_from_monday() as i64;
                self.focus = shift(focus, saturday, DurationUnit::Day).ok_or_else(field_error)?;
                self.day_form = DayForm::Weekend;
                self.month_form = MonthForm::Week;
                Granularity::DayOfWeek
            }
            Label::Am | Label::Pm => {
                self.set_half_day(label == Label::Pm);
                Granularity::AmPm
            }
            Label::Workday => return Err(field_error()),
        };
        self.written(written, keep_mask);
        Ok(())
    }

    fn set_year(&mut self, year: i64) -> Result<(), ValueError> {
        let focus = self.focus;
        self.focus = i32::try_from(year)
            .ok()
            .and_then(|y| with_ymd(focus, y, focus.month(), focus.day()))
            .ok_or(ValueError::Field { field: "year", value: year.to_string() })?;
        Ok(())
    }

    fn set_half_day(&mut self, pm: bool) {
        let hour = self.focus.hour() % 12 + if pm { 12 } else { 0 };
        self.focus = NaiveDateTime::new(self.focus.date(), time(hour, self.focus.minute()));
        self.hour_form = HourForm::Hour;
    }

    /// Day-of-week is printed week-based only inside a masked week
    /// (`XXXX-WXX-1`); otherwise it resolves to a calendar date.
    pub(crate) fn adopt_weekday_form(&mut self) {
        if self.sticky[SLOT_MONTH] && self.month_form == MonthForm::Week {
            self.day_form = DayForm::Week;
        } else {
            self.day_form = DayForm::Month;
            self.month_form = MonthForm::Month;
        }
    }

    /// Re-derive slot states after `granularity` was written.
    pub(crate) fn written(&mut self, granularity: Granularity, keep_mask: bool) {
        let slot = granularity.slot();
        self.touched |= Touched::of(granularity);

        for coarser in 0..slot {
            self.slots[coarser] = if self.sticky[coarser] {
                SlotState::Masked
            } else if self.slots[coarser] == SlotState::Opened
                || self.known[coarser]
                || self.touched.intersects(Touched::of_slot(coarser))
            {
                SlotState::Opened
            } else {
                SlotState::Masked
            };
        }

        if !keep_mask {
            self.sticky[slot] = false;
        }
        self.slots[slot] = if keep_mask || self.sticky[slot] { SlotState::Masked } else { SlotState::Opened };

        for finer in slot + 1..SLOT_COUNT {
            if !self.touched.intersects(Touched::of_slot(finer)) {
                self.slots[finer] = SlotState::Unset;
            }
        }
    }

    // --- rendering ------------------------------------------------------------

    /// TIMEX3 value string, e.g. `2015-06-03`, `2015-W23-WE`, `XXXX-WXX-1`,
    /// `2015-06-01TMO`, `19`.
    pub fn to_value_string(&self) -> Result<String, ValueError> {
        let last = self.finest_slot().ok_or(ValueError::Unset)?;
        let mut out = String::new();
        for slot in 0..=last {
            let opened = self.slots[slot] == SlotState::Opened;
            match slot {
                SLOT_YEAR => out.push_str(&self.render_year(opened)),
                SLOT_MONTH => out.push_str(&self.render_month(opened)),
                SLOT_DAY => out.push_str(&self.render_day(opened)),
                SLOT_HOUR => out.push_str(&self.render_hour(opened)),
                _ => out.push_str(&if opened { format!(":{:02}", self.focus.minute()) } else { ":XX".to_string() }),
            }
        }
        Ok(out)
    }

    fn display_year(&self) -> i32 {
        let shown = |slot: usize| self.slots[slot] != SlotState::Unset;
        match self.month_form {
            MonthForm::Week if shown(SLOT_MONTH) => self.focus.iso_week().year(),
            MonthForm::Season(Season::Winter) if shown(SLOT_MONTH) && self.focus.month() <= 2 => self.focus.year() - 1,
            _ => self.focus.year(),
        }
    }

    fn render_year(&self, opened: bool) -> String {
        match (self.year_form, opened) {
            (YearForm::Full, true) => format!("{:04}", self.display_year()),
            (YearForm::Full, false) => "XXXX".to_string(),
            (YearForm::Century, true) => format!("{:02}", self.display_year().div_euclid(100)),
            (YearForm::Century, false) => "XX".to_string(),
        }
    }

    fn render_month(&self, opened: bool) -> String {
        let month = self.focus.month();
        match (self.month_form, opened) {
            (MonthForm::Month, true) => format!("-{month:02}"),
            (MonthForm::Week, true) => format!("-W{:02}", self.focus.iso_week().week()),
            (MonthForm::Week, false) => "-WXX".to_string(),
            (MonthForm::Season(_), true) => format!("-{}", Season::of_month(month).code()),
            (MonthForm::Quarter(_), true) => format!("-Q{}", quarter_of(month)),
            (MonthForm::Half(_), true) => format!("-H{}", half_of(month)),
            (_, false) => "-XX".to_string(),
        }
    }

    fn render_day(&self, opened: bool) -> String {
        match (self.day_form, opened) {
            (DayForm::Month, true) => format!("-{:02}", self.focus.day()),
            (DayForm::Month, false) => "-XX".to_string(),
            (DayForm::Week, true) => format!("-{}", self.focus.weekday().number_from_monday()),
            (DayForm::Week, false) => "-X".to_string(),
            (DayForm::Weekend, _) => "-WE".to_string(),
        }
    }

    fn render_hour(&self, opened: bool) -> String {
        match (self.hour_form, opened) {
            (HourForm::Hour, true) => format!("T{:02}", self.focus.hour()),
            (HourForm::PartOfDay(pod), true) => format!("T{}", pod.code()),
            (_, false) => "TXX".to_string(),
        }
    }
}

impl fmt::Display for CalendarPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_value_string() {
            Ok(value) => f.write_str(&value),
            Err(_) => f.write_str("<unset>"),
        }
    }
}

pub(crate) fn with_ymd(focus: NaiveDateTime, year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    let day = day.min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).map(|d| NaiveDateTime::new(d, focus.time()))
}

pub(crate) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub(crate) fn label_of(value: &Value) -> Option<Label> {
    match value {
        Value::Label(text) => Label::parse(text),
        _ => None,
    }
}

pub(crate) fn number(value: &Value) -> Result<NumeralValue, ValueError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Text(t) => t
            .trim()
            .parse::<i64>()
            .map(NumeralValue::Integer)
            .map_err(|_| ValueError::Field { field: "value", value: t.clone() }),
        other => Err(ValueError::Field { field: "value", value: other.to_string() }),
    }
}

pub(crate) fn integer(value: &Value) -> Result<i64, ValueError> {
    number(value)?.as_integer().ok_or_else(|| ValueError::Field { field: "value", value: value.to_string() })
}

/// Split an amount of `unit` into integral steps, carrying fractions down to
/// finer units (`1/2` hour -> 30 minutes, `3/2` days -> 1 day 12 hours).
pub(crate) fn split_amount(amount: NumeralValue, unit: DurationUnit) -> Vec<(DurationUnit, i64)> {
    let (mut numerator, denominator) = match amount {
        NumeralValue::Integer(n) => return vec![(unit, n)],
        NumeralValue::Fraction { numerator, denominator } if denominator != 0 => (numerator, denominator),
        NumeralValue::Fraction { .. } => return Vec::new(),
    };
    let mut out = Vec::new();
    let mut unit = unit;
    loop {
        let whole = numerator / denominator;
        let rest = numerator % denominator;
        if whole != 0 {
            out.push((unit, whole));
        }
        if rest == 0 {
            break;
        }
        match unit.finer() {
            Some((finer, factor)) => {
                numerator = rest * factor;
                unit = finer;
            }
            None => {
                let rounded = (rest as f64 / denominator as f64).round() as i64;
                if rounded != 0 {
                    out.push((unit, rounded));
                }
                break;
            }
        }
    }
    out
}
