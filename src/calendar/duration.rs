//! Spans: per-unit amounts plus "unknown magnitude" markers.
//!
//! `kaks päeva` is `{Day: 2}` -> `P2D`; `mitu päeva` ("several days") has no
//! amount and prints as `PXD`. Week amounts fold into days once any other
//! date unit is present, since `P1W3D` is not a valid ISO 8601 duration.

use super::point::{CalendarPoint, MonthForm, SlotState, number, split_amount};
use super::shift::{DurationUnit, shift};
use crate::error::ValueError;
use crate::granularity::{Granularity, SLOT_DAY, SLOT_HOUR, SLOT_MINUTE, SLOT_MONTH, SLOT_YEAR};
use crate::semantics::{EndpointDirection, Operation, SemanticInstruction, Value};
use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Width of an unknown magnitude: `X` or `XX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fuzz {
    One,
    Two,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duration {
    parts: BTreeMap<DurationUnit, i64>,
    fuzzy: BTreeMap<DurationUnit, Fuzz>,
}

impl Duration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(unit: DurationUnit, amount: i64) -> Self {
        let mut d = Self::default();
        d.parts.insert(unit, amount);
        d
    }

    pub fn apply(&mut self, instruction: &SemanticInstruction) -> Result<(), ValueError> {
        match instruction.op {
            Operation::Set => self.set(instruction.granularity, &instruction.value),
            Operation::Add => self.add(instruction.granularity, &instruction.value),
            Operation::Seek => {
                Err(ValueError::Field { field: "duration", value: format!("SEEK {}", instruction.value) })
            }
        }
    }

    /// Overwrite the amount of one unit.
    pub fn set(&mut self, granularity: Granularity, value: &Value) -> Result<(), ValueError> {
        self.write(granularity, value, false)
    }

    /// Add to the amount of one unit.
    pub fn add(&mut self, granularity: Granularity, value: &Value) -> Result<(), ValueError> {
        self.write(granularity, value, true)
    }

    fn write(&mut self, granularity: Granularity, value: &Value, accumulate: bool) -> Result<(), ValueError> {
        let (unit, factor) = DurationUnit::of(granularity);
        if let Some(fuzz) = fuzz_of(value) {
            self.parts.remove(&unit);
            self.fuzzy.insert(unit, fuzz);
            return Ok(());
        }
        if granularity.is_compound() {
            let parts = granularity
                .expand(&value.to_string())
                .ok_or_else(|| ValueError::Field { field: granularity.name(), value: value.to_string() })?;
            for (g, n) in parts {
                self.write(g, &Value::int(n), accumulate)?;
            }
            return Ok(());
        }

        let amount = number(value)?;
        for (i, (u, n)) in split_amount(amount, unit).into_iter().enumerate() {
            let n = if u == unit { n * factor } else { n };
            self.fuzzy.remove(&u);
            let slot = self.parts.entry(u).or_insert(0);
            // Carried fraction parts always accumulate into the finer unit.
            if accumulate || i > 0 {
                *slot += n;
            } else {
                *slot = n;
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.fuzzy.is_empty()
    }

    pub fn is_fuzzy(&self) -> bool {
        !self.fuzzy.is_empty()
    }

    pub fn amount(&self, unit: DurationUnit) -> Option<i64> {
        self.parts.get(&unit).copied()
    }

    /// Finest unit carrying an amount or a fuzzy marker.
    pub fn finest_unit(&self) -> Option<DurationUnit> {
        self.parts.keys().chain(self.fuzzy.keys()).max().copied()
    }

    /// ISO 8601 duration, e.g. `P2D`, `PT1H30M`, `PXY`.
    pub fn to_value_string(&self) -> Result<String, ValueError> {
        if self.is_empty() {
            return Err(ValueError::EmptyDuration);
        }
        let mut parts = self.parts.clone();
        let mixed = [DurationUnit::Year, DurationUnit::Month, DurationUnit::Day]
            .iter()
            .any(|u| parts.contains_key(u) || self.fuzzy.contains_key(u));
        if mixed && !self.fuzzy.contains_key(&DurationUnit::Week) {
            if let Some(weeks) = parts.remove(&DurationUnit::Week) {
                *parts.entry(DurationUnit::Day).or_insert(0) += weeks * 7;
            }
        }

        let mut out = String::from("P");
        let mut in_time = false;
        for unit in [
            DurationUnit::Year,
            DurationUnit::Month,
            DurationUnit::Week,
            DurationUnit::Day,
            DurationUnit::Hour,
            DurationUnit::Minute,
        ] {
            let amount = match (self.fuzzy.get(&unit), parts.get(&unit)) {
                (Some(Fuzz::One), _) => "X".to_string(),
                (Some(Fuzz::Two), _) => "XX".to_string(),
                (None, Some(n)) => n.abs().to_string(),
                (None, None) => continue,
            };
            if unit.is_time() && !in_time {
                out.push('T');
                in_time = true;
            }
            out.push_str(&amount);
            out.push(unit.letter());
        }
        Ok(out)
    }

    /// Move `dt` by this span (`sign` = +1 forward, -1 backward). Fuzzy spans
    /// cannot be applied.
    pub fn shift(&self, dt: NaiveDateTime, sign: i64) -> Option<NaiveDateTime> {
        if self.is_fuzzy() {
            return None;
        }
        self.parts.iter().try_fold(dt, |at, (unit, n)| shift(at, sign * n.abs(), *unit))
    }

    /// Span covered by two points, counted in the finest field both show.
    /// Day and coarser units count inclusively (`3.-5. juuni` is 3 days);
    /// hours and minutes count the difference, carried into hours and days
    /// (`9:00-17:30` is `PT8H30M`).
    pub fn between(begin: &CalendarPoint, end: &CalendarPoint) -> Option<Duration> {
        let slot = [SLOT_MINUTE, SLOT_HOUR, SLOT_DAY, SLOT_MONTH, SLOT_YEAR]
            .into_iter()
            .find(|&s| begin.slots[s] != SlotState::Unset && end.slots[s] != SlotState::Unset)?;
        let weeks = slot == SLOT_MONTH && begin.month_form == MonthForm::Week && end.month_form == MonthForm::Week;
        let unit = match slot {
            SLOT_YEAR => DurationUnit::Year,
            SLOT_MONTH if weeks => DurationUnit::Week,
            SLOT_MONTH => {
                if begin.month_form != MonthForm::Month || end.month_form != MonthForm::Month {
                    return None;
                }
                DurationUnit::Month
            }
            SLOT_DAY => DurationUnit::Day,
            SLOT_HOUR => DurationUnit::Hour,
            _ => DurationUnit::Minute,
        };

        if begin.slots[slot] == SlotState::Masked || end.slots[slot] == SlotState::Masked {
            let mut d = Duration::default();
            d.fuzzy.insert(unit, Fuzz::One);
            return Some(d);
        }

        let (a, b) = (begin.focus, end.focus);
        if unit.is_time() {
            let minutes = match unit {
                DurationUnit::Hour => (b - a).num_hours() * 60,
                _ => (b - a).num_minutes(),
            };
            trace!(?unit, minutes, "clock span between endpoints");
            if minutes <= 0 {
                return None;
            }
            let mut d = Duration::default();
            let carried = [
                (DurationUnit::Day, minutes / MINUTES_PER_DAY),
                (DurationUnit::Hour, minutes % MINUTES_PER_DAY / 60),
                (DurationUnit::Minute, minutes % 60),
            ];
            d.parts.extend(carried.into_iter().filter(|(_, n)| *n > 0));
            return Some(d);
        }

        let count = match unit {
            DurationUnit::Year => (b.year() - a.year()) as i64 + 1,
            DurationUnit::Month => {
                (b.year() as i64 * 12 + b.month0() as i64) - (a.year() as i64 * 12 + a.month0() as i64) + 1
            }
            DurationUnit::Week => (b.date() - a.date()).num_days().div_euclid(7) + 1,
            DurationUnit::Day => (b.date() - a.date()).num_days() + 1,
            DurationUnit::Hour | DurationUnit::Minute => 0,
        };
        trace!(?unit, count, "span between endpoints");
        (count > 0).then(|| Duration::of(unit, count))
    }

    /// Begin and end points implied by this span relative to `seed`, shown at
    /// the span's finest unit. `None` for fuzzy or empty spans.
    pub fn endpoints(
        &self,
        seed: &CalendarPoint,
        direction: EndpointDirection,
    ) -> Option<(CalendarPoint, CalendarPoint)> {
        let granularity = self.finest_unit()?.granularity();
        let mut anchor = seed.fresh();
        anchor.open(granularity);
        let mut other = anchor.clone();
        other.focus = match direction {
            EndpointDirection::Forward => self.shift(anchor.focus, 1)?,
            EndpointDirection::Backward => self.shift(anchor.focus, -1)?,
        };
        Some(match direction {
            EndpointDirection::Forward => (anchor, other),
            EndpointDirection::Backward => (other, anchor),
        })
    }
}

fn fuzz_of(value: &Value) -> Option<Fuzz> {
    match value {
        Value::Mask => Some(Fuzz::One),
        Value::Label(s) | Value::Text(s) => match s.as_str() {
            "X" => Some(Fuzz::One),
            "XX" => Some(Fuzz::Two),
            _ => None,
        },
        _ => None,
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_value_string() {
            Ok(value) => f.write_str(&value),
            Err(_) => f.write_str("<empty>"),
        }
    }
}
