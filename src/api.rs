use crate::calendar::{CalendarPoint, SeekWindows};
use crate::engine::{self, RunMetrics};
use crate::error::ValueError;
use crate::granularity::SLOT_COUNT;
use crate::pattern::MergeRule;
use crate::{Rule, Token};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

pub use crate::engine::{CandidateSummary, Timex};

static DEFAULT_RULES: Lazy<RuleSet> = Lazy::new(RuleSet::estonian);

/// Tagging context.
///
/// Holds the document reference time every relative expression ("homme",
/// "eelmisel nädalal") is resolved against.
#[derive(Debug, Clone)]
pub struct Context {
    reference: CalendarPoint,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            let date = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap_or_default();
            Self::from_datetime(NaiveDateTime::new(date, NaiveTime::MIN))
        } else {
            Self::from_datetime(Local::now().naive_local())
        }
    }
}

impl Context {
    pub fn from_datetime(reference: NaiveDateTime) -> Self {
        Context { reference: CalendarPoint::from_datetime(reference) }
    }

    /// Reference time as five field strings: year, month, day, hour, minute.
    /// Empty fields are unknown, `X` runs are masked.
    pub fn from_fields(fields: [&str; SLOT_COUNT]) -> Result<Self, ValueError> {
        Ok(Context { reference: CalendarPoint::from_fields(fields)? })
    }

    /// `YYYY-MM-DD`, optionally followed by `THH:MM`; trailing fields may be
    /// left out (`2015-06`).
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let (date, time) = text.trim().split_once('T').unwrap_or((text.trim(), ""));
        let mut fields = [""; SLOT_COUNT];
        let parts = date.split('-').chain(time.split(':')).filter(|p| !p.is_empty());
        for (i, part) in parts.enumerate() {
            let field = fields.get_mut(i).ok_or_else(|| ValueError::Field { field: "reference", value: text.to_string() })?;
            *field = part;
        }
        Self::from_fields(fields)
    }

    pub fn reference(&self) -> &CalendarPoint {
        &self.reference
    }
}

/// Options that affect tagging and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Baldwin window radii for bare weekday, month, season, quarter and
    /// two-digit year references.
    pub windows: SeekWindows,
    /// Word radius for sibling anchors whose instruction only asks for the
    /// same sentence.
    pub anchor_radius: usize,
    /// Turn merged ranges into a duration with linked endpoints.
    pub split_ranges: bool,
    /// Split `N-M` tokens into a range start and a range end.
    pub split_hyphen_tokens: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { windows: SeekWindows::default(), anchor_radius: 30, split_ranges: true, split_hyphen_tokens: true }
    }
}

/// Rules and merge rules a run uses.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
    pub merges: Vec<MergeRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, merges: Vec<MergeRule>) -> Self {
        RuleSet { rules, merges }
    }

    /// The built-in Estonian rule library.
    pub fn estonian() -> Self {
        RuleSet { rules: crate::rules::default_rules(), merges: crate::rules::default_merge_rules() }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::estonian()
    }
}

/// Result of [`tag`] and [`tag_with`].
#[derive(Debug, Clone)]
pub struct Annotated {
    /// TIMEX3 annotations in text order, endpoints after their expression.
    pub timexes: Vec<Timex>,
    /// Every candidate of the run, including pruned ones.
    pub candidates: Vec<CandidateSummary>,
    /// The internal token stream with candidate memberships attached.
    pub tokens: Vec<Token>,
    pub metrics: RunMetrics,
}

/// Tag `tokens` with the built-in rules.
///
/// # Example
/// ```
/// use timexer::{Context, Options, Token, tag};
///
/// let tokens = vec![Token::new("kolmapäeval").with_analysis("kolmapäev", "S", "sg ad")];
/// let context = Context::parse("2015-06-01").unwrap();
/// let out = tag(tokens, &context, &Options::default());
/// assert_eq!(out.timexes[0].value.as_deref(), Some("2015-06-03"));
/// ```
pub fn tag(tokens: Vec<Token>, context: &Context, options: &Options) -> Annotated {
    tag_with(tokens, &DEFAULT_RULES, context, options)
}

/// Tag `tokens` with a caller-built rule set.
pub fn tag_with(tokens: Vec<Token>, rules: &RuleSet, context: &Context, options: &Options) -> Annotated {
    let tagger = engine::Tagger::new(tokens, &rules.rules, &rules.merges, options);
    let run = tagger.run_with_metrics(context, options);
    Annotated { timexes: run.timexes, candidates: run.candidates, tokens: run.tokens, metrics: run.metrics }
}
