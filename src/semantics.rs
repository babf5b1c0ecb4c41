//! Semantic instructions: the SET / ADD / SEEK program attached to patterns.
//!
//! A rule never computes a date itself. Pattern elements and rules carry
//! [`SemanticInstruction`]s whose values may still point into the match
//! (a numeral, a regex group, another element's value). Once a phrase match
//! is materialized the references are resolved (see `pattern/rule.rs`) and the
//! candidate ends up with a flat, priority-ordered list of concrete
//! instructions that the resolution engine replays against a calendar point
//! or duration.
//!
//! ```text
//! "kahe päeva pärast"
//!   NUM  -> value 2
//!   UNIT -> (no instructions)
//!   rule -> ADD DAY_OF_MONTH Ref(NUM)
//! resolved:  ADD DAY_OF_MONTH 2
//! ```

use crate::NumeralValue;
use crate::granularity::Granularity;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Set,
    Add,
    Seek,
}

/// Instruction value, possibly still a reference into the match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A concrete number (integer or fraction).
    Number(NumeralValue),
    /// A label: part of day (`MO`), season (`SU`), quarter (`Q2`), weekend (`WE`) ...
    Label(String),
    /// Compound text such as `14:30` or `3.06.2015`.
    Text(String),
    /// Explicitly unknown: the field prints as an `X` run.
    Mask,
    /// Open the field at its current value (SET) / any unit boundary (SEEK).
    Any,

    // --- references, resolved when the candidate is materialized ----------
    /// Numeral carried by the tokens of the owning element, plus an offset.
    Numeral { offset: i64 },
    /// Index of the matched literal/lemma alternative, plus an offset.
    AlternativeIndex { offset: i64 },
    /// A capture group of the owning regex element.
    Group(usize),
    /// The value of another element (by label) or instruction (by label).
    Ref { label: String, negate: bool, offset: i64 },
    /// Label built from another value: `Template { prefix: "Q", .. }` -> `Q2`.
    Template { prefix: String, source: Box<Value> },
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Number(NumeralValue::Integer(n))
    }

    pub fn label(s: &str) -> Self {
        Value::Label(s.to_string())
    }

    pub fn reference(label: &str) -> Self {
        Value::Ref { label: label.to_string(), negate: false, offset: 0 }
    }

    pub fn negated_reference(label: &str) -> Self {
        Value::Ref { label: label.to_string(), negate: true, offset: 0 }
    }

    /// True once no part of the value points back into a match.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Label(_) | Value::Text(_) | Value::Mask | Value::Any)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_integer(),
            Value::Text(t) => t.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Label(s) | Value::Text(s) => f.write_str(s),
            Value::Mask => f.write_str("X"),
            Value::Any => f.write_str("*"),
            Value::Numeral { offset } => write!(f, "<numeral{offset:+}>"),
            Value::AlternativeIndex { offset } => write!(f, "<alt{offset:+}>"),
            Value::Group(g) => write!(f, "<group {g}>"),
            Value::Ref { label, negate, offset } => {
                write!(f, "<{}{label}{offset:+}>", if *negate { "-" } else { "" })
            }
            Value::Template { prefix, source } => write!(f, "{prefix}{source}"),
        }
    }
}

/// Which way (and how far) a SEEK walks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Walk to the n-th match; the sign is the direction. With `within`, the
    /// n-th occurrence inside the container (negative counts from its end).
    Steps(i32),
    /// Baldwin window around the focus.
    Nearest,
    /// Past-tense anchoring verb walks back one match, anything else uses the
    /// Baldwin window.
    FromTense,
    /// Step count taken from another element's value (`kolmas esmaspäev`).
    Ref(String),
}

/// Where to look for the sibling expression an instruction is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    Backward,
    Forward,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorScope {
    Sentence,
    Words(usize),
}

/// Requirement that an instruction starts from another expression's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorSpec {
    /// Pattern marker the sibling candidate must carry.
    pub marker: String,
    pub direction: SearchDirection,
    pub scope: AnchorScope,
}

impl AnchorSpec {
    pub fn backward(marker: &str) -> Self {
        AnchorSpec { marker: marker.to_string(), direction: SearchDirection::Backward, scope: AnchorScope::Sentence }
    }

    pub fn within_words(mut self, radius: usize) -> Self {
        self.scope = AnchorScope::Words(radius);
        self
    }

    pub fn towards(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// One SET / ADD / SEEK directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticInstruction {
    pub op: Operation,
    pub granularity: Granularity,
    pub value: Value,
    /// Name other instructions can reference this one's value by.
    pub label: Option<String>,
    pub direction: Direction,
    pub exclude_current: bool,
    /// Leave the written field masked (only its coarser context opens).
    pub keep_mask: bool,
    /// Container unit for N-th-subpart seeks.
    pub within: Option<Granularity>,
    pub anchor: Option<AnchorSpec>,
    /// Word class (with repeat suffix) whose element produced the instruction.
    pub class: Option<String>,
    pub priority: i32,
}

impl SemanticInstruction {
    pub fn new(op: Operation, granularity: Granularity, value: Value) -> Self {
        SemanticInstruction {
            op,
            granularity,
            value,
            label: None,
            direction: match op {
                Operation::Seek => Direction::Nearest,
                _ => Direction::Steps(0),
            },
            exclude_current: false,
            keep_mask: false,
            within: None,
            anchor: None,
            class: None,
            priority: default_priority(op, granularity),
        }
    }

    pub fn set(granularity: Granularity, value: Value) -> Self {
        Self::new(Operation::Set, granularity, value)
    }

    pub fn add(granularity: Granularity, value: Value) -> Self {
        Self::new(Operation::Add, granularity, value)
    }

    pub fn seek(granularity: Granularity, value: Value, direction: Direction) -> Self {
        Self::new(Operation::Seek, granularity, value).toward(direction)
    }

    pub fn toward(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn excluding_current(mut self) -> Self {
        self.exclude_current = true;
        self
    }

    pub fn keeping_mask(mut self) -> Self {
        self.keep_mask = true;
        self
    }

    pub fn within(mut self, container: Granularity) -> Self {
        self.within = Some(container);
        self
    }

    pub fn anchored(mut self, spec: AnchorSpec) -> Self {
        self.anchor = Some(spec);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn needs_anchor(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Coarse fields first; within a rank SET, then ADD, then SEEK.
fn default_priority(op: Operation, granularity: Granularity) -> i32 {
    let op_rank = match op {
        Operation::Set => 0,
        Operation::Add => 1,
        Operation::Seek => 2,
    };
    granularity.rank() as i32 * 10 + op_rank
}

impl fmt::Display for SemanticInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Operation::Set => "SET",
            Operation::Add => "ADD",
            Operation::Seek => "SEEK",
        };
        write!(f, "{op} {} {}", self.granularity.name(), self.value)?;
        match &self.direction {
            Direction::Steps(0) => {}
            Direction::Steps(n) => write!(f, " dir={n}")?,
            Direction::Nearest => write!(f, " dir=~")?,
            Direction::FromTense => write!(f, " dir=tense")?,
            Direction::Ref(l) => write!(f, " dir=<{l}>")?,
        }
        if let Some(w) = self.within {
            write!(f, " within={}", w.name())?;
        }
        if let Some(a) = &self.anchor {
            write!(f, " anchor={}", a.marker)?;
        }
        Ok(())
    }
}

/// Semantic payload composed into every word pattern: the instructions the
/// element contributes plus the value it exposes to references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticFragment {
    pub instructions: Vec<SemanticInstruction>,
    pub value: Option<Value>,
}

impl SemanticFragment {
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty() && self.value.is_none()
    }
}

/// TIMEX3 `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimexType {
    Date,
    Time,
    Duration,
    Set,
}

impl TimexType {
    pub fn as_str(self) -> &'static str {
        match self {
            TimexType::Date => "DATE",
            TimexType::Time => "TIME",
            TimexType::Duration => "DURATION",
            TimexType::Set => "SET",
        }
    }
}

/// Which side of a duration the implicit endpoints sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointDirection {
    /// Begins at the anchor, ends a span later ("within two days").
    Forward,
    /// Ends at the anchor, begins a span earlier ("the past two days").
    Backward,
}

/// Non-value TIMEX3 attributes a rule (or merge rule) contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub modifier: Option<String>,
    pub quant: Option<String>,
    pub freq: Option<String>,
    pub implicit_endpoints: Option<EndpointDirection>,
}

impl Attributes {
    /// Fill unset attributes from `other`.
    pub(crate) fn absorb(&mut self, other: &Attributes) {
        if self.modifier.is_none() {
            self.modifier = other.modifier.clone();
        }
        if self.quant.is_none() {
            self.quant = other.quant.clone();
        }
        if self.freq.is_none() {
            self.freq = other.freq.clone();
        }
        if self.implicit_endpoints.is_none() {
            self.implicit_endpoints = other.implicit_endpoints;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_orders_coarse_before_fine() {
        let year = SemanticInstruction::set(Granularity::Year, Value::int(2015));
        let day = SemanticInstruction::add(Granularity::DayOfMonth, Value::int(1));
        let seek = SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::Steps(1));
        assert!(year.priority < day.priority);
        assert!(day.priority < seek.priority);
    }

    #[test]
    fn display_is_compact() {
        let i = SemanticInstruction::seek(Granularity::DayOfWeek, Value::int(3), Direction::Steps(1));
        assert_eq!(i.to_string(), "SEEK DAY_OF_WEEK 3 dir=1");
        let r = SemanticInstruction::add(Granularity::DayOfMonth, Value::negated_reference("NUM"));
        assert_eq!(r.to_string(), "ADD DAY_OF_MONTH <-NUM+0>");
    }

    #[test]
    fn references_are_unresolved() {
        assert!(!Value::reference("NUM").is_resolved());
        assert!(Value::Mask.is_resolved());
        assert_eq!(Value::Text("14".into()).as_int(), Some(14));
    }
}
