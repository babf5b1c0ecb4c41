extern crate self as timexer;

#[macro_use]
mod macros;
mod api;
pub mod calendar;
mod engine;
pub mod error;
pub mod granularity;
pub mod pattern;
pub mod rules;
pub mod semantics;

pub use api::{Annotated, CandidateSummary, Context, Options, RuleSet, Timex, tag, tag_with};
pub use calendar::{CalendarPoint, Duration};
pub use engine::{REFERENCE_TID, RunMetrics, RunResult, Stage, Tagger};
pub use error::{RuleError, ValueError};
pub use granularity::Granularity;
pub use pattern::{
    Filter, MergeKind, MergeRule, NegativePattern, NumeralKind, PatternElement, PhrasePattern, Rule, SubPart, Verdict,
    WordPattern,
};
pub use semantics::{
    AnchorScope, AnchorSpec, Attributes, Direction, EndpointDirection, Operation, SearchDirection,
    SemanticInstruction, TimexType, Value,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Token model -------------------------------------------------------------

/// One morphological reading of a token.
///
/// `pos` is a single part-of-speech letter (`S` noun, `V` verb, `N` cardinal,
/// `O` ordinal, `H` proper name, ...) and `form` holds the space separated
/// form tags (`sg ad`, `s`, `nud`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub lemma: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub form: String,
}

impl Analysis {
    pub fn new(lemma: &str, pos: &str, form: &str) -> Self {
        Analysis { lemma: lemma.to_string(), pos: pos.to_string(), form: form.to_string() }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.form.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty())
    }

    /// True if every required tag is present. `_X_` names a part of speech.
    pub fn has_features(&self, required: &[String]) -> bool {
        required.iter().all(|tag| match tag.strip_prefix('_').and_then(|t| t.strip_suffix('_')) {
            Some(pos) => self.pos == pos,
            None => self.tags().any(|t| t == tag),
        })
    }

    pub fn is_verb(&self) -> bool {
        self.pos == "V"
    }
}

/// A parsed numeral value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumeralValue {
    Integer(i64),
    Fraction { numerator: i64, denominator: i64 },
}

impl NumeralValue {
    pub fn as_integer(self) -> Option<i64> {
        match self {
            NumeralValue::Integer(n) => Some(n),
            NumeralValue::Fraction { numerator, denominator } if denominator != 0 && numerator % denominator == 0 => {
                Some(numerator / denominator)
            }
            NumeralValue::Fraction { .. } => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            NumeralValue::Integer(n) => n as f64,
            NumeralValue::Fraction { numerator, denominator } => numerator as f64 / denominator.max(1) as f64,
        }
    }

    pub fn negated(self) -> Self {
        match self {
            NumeralValue::Integer(n) => NumeralValue::Integer(-n),
            NumeralValue::Fraction { numerator, denominator } => {
                NumeralValue::Fraction { numerator: -numerator, denominator }
            }
        }
    }

    pub fn offset(self, by: i64) -> Self {
        match self {
            NumeralValue::Integer(n) => NumeralValue::Integer(n + by),
            NumeralValue::Fraction { numerator, denominator } => {
                NumeralValue::Fraction { numerator: numerator + by * denominator, denominator }
            }
        }
    }
}

impl fmt::Display for NumeralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumeralValue::Integer(n) => write!(f, "{n}"),
            NumeralValue::Fraction { numerator, denominator } => write!(f, "{numerator}/{denominator}"),
        }
    }
}

/// Position of a token inside a multi-word numeral phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumeralRole {
    Single,
    Start,
    Middle,
    End,
}

/// Grammatical tense resolved for verb tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tense {
    Present,
    Past,
}

/// Identifier of a candidate expression within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CandidateId(pub usize);

/// Role of a token inside a candidate expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MembershipRole {
    Single,
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Membership {
    pub candidate: CandidateId,
    pub role: MembershipRole,
}

/// One analysed input token.
///
/// The public fields are what the morphological pre-processing hands over;
/// the rest is derived or attached by the engine during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text as it appeared in the source.
    pub text: String,
    /// Position of the token in the original text.
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub analyses: Vec<Analysis>,
    #[serde(default)]
    pub numeral: Option<NumeralValue>,
    #[serde(default)]
    pub numeral_role: Option<NumeralRole>,
    #[serde(default)]
    pub sentence_start: bool,
    #[serde(default)]
    pub sentence_end: bool,

    #[serde(skip)]
    pub(crate) position: usize,
    #[serde(skip)]
    pub(crate) normalized: String,
    #[serde(skip)]
    pub(crate) lower: String,
    #[serde(skip)]
    pub(crate) memberships: Vec<Membership>,
    #[serde(skip)]
    pub(crate) tense: Option<Tense>,
    #[serde(skip)]
    pub(crate) range_start: bool,
    #[serde(skip)]
    pub(crate) range_end: bool,
}

static ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,3}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})\.?$").expect("static roman numeral regex")
});

impl Token {
    pub fn new(text: &str) -> Self {
        let mut token = Token { text: text.to_string(), ..Token::default() };
        token.refresh_forms();
        token
    }

    pub fn with_analysis(mut self, lemma: &str, pos: &str, form: &str) -> Self {
        self.analyses.push(Analysis::new(lemma, pos, form));
        self
    }

    pub fn with_numeral(mut self, value: NumeralValue) -> Self {
        self.numeral = Some(value);
        self
    }

    pub fn with_numeral_role(mut self, role: NumeralRole) -> Self {
        self.numeral_role = Some(role);
        self
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn starting_sentence(mut self) -> Self {
        self.sentence_start = true;
        self
    }

    pub fn ending_sentence(mut self) -> Self {
        self.sentence_end = true;
        self
    }

    /// Special-symbol-normalized, punctuation-trimmed surface form.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Index in the (possibly re-split) internal token stream.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tense(&self) -> Option<Tense> {
        self.tense
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    pub fn is_range_start(&self) -> bool {
        self.range_start
    }

    pub fn is_range_end(&self) -> bool {
        self.range_end
    }

    pub(crate) fn refresh_forms(&mut self) {
        self.normalized = engine::normalize_surface(&self.text);
        self.lower = self.normalized.to_lowercase();
    }

    pub(crate) fn is_quote(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| matches!(c, '"' | '\'' | '«' | '»' | '„' | '“' | '”'))
    }

    /// Effective numeral role; a numeral without a role is a one-word phrase.
    pub(crate) fn numeral_role(&self) -> Option<NumeralRole> {
        match (self.numeral, self.numeral_role) {
            (_, Some(role)) => Some(role),
            (Some(_), None) => Some(NumeralRole::Single),
            (None, None) => None,
        }
    }

    /// Numeral sub-type, derived from the value, the surface shape and the
    /// part-of-speech of the analyses.
    pub(crate) fn numeral_kind(&self) -> Option<NumeralKind> {
        self.numeral_role()?;
        if matches!(self.numeral, Some(NumeralValue::Fraction { .. })) {
            return Some(NumeralKind::Fraction);
        }
        // The left half of a split `N-M` token keeps its hyphen.
        let text = self.normalized.trim_end_matches('-');
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            return Some(NumeralKind::Digits);
        }
        if text.len() > 1 && text.ends_with('.') && text[..text.len() - 1].chars().all(|c| c.is_ascii_digit()) {
            return Some(NumeralKind::Ordinal);
        }
        if !text.is_empty() && ROMAN.is_match(text) {
            return Some(NumeralKind::Roman);
        }
        if self.analyses.iter().any(|a| a.pos == "O") {
            return Some(NumeralKind::Ordinal);
        }
        Some(NumeralKind::Cardinal)
    }
}

/// Parse a Roman numeral (`XX`, `xiv.`); `None` if the text is not one.
pub(crate) fn parse_roman(text: &str) -> Option<i64> {
    let upper = text.trim().to_uppercase();
    if upper.trim_end_matches('.').is_empty() || !ROMAN.is_match(&upper) {
        return None;
    }
    let digit = |c: char| match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values: Vec<i64> = upper.trim_end_matches('.').chars().map(digit).collect::<Option<_>>()?;
    let mut total = 0;
    for (i, v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > v => total -= v,
            _ => total += v,
        }
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_numerals() {
        assert_eq!(parse_roman("XX"), Some(20));
        assert_eq!(parse_roman("xiv."), Some(14));
        assert_eq!(parse_roman("MCMXCIX"), Some(1999));
        assert_eq!(parse_roman("kell"), None);
        assert_eq!(parse_roman(""), None);
    }

    #[test]
    fn analysis_feature_matching() {
        let a = Analysis::new("juuni", "S", "sg el");
        assert!(a.has_features(&["el".to_string()]));
        assert!(a.has_features(&["_S_".to_string(), "sg".to_string()]));
        assert!(!a.has_features(&["ter".to_string()]));
    }

    #[test]
    fn numeral_kinds_follow_surface_shape() {
        let digits = Token::new("15").with_numeral(NumeralValue::Integer(15));
        assert_eq!(digits.numeral_kind(), Some(NumeralKind::Digits));
        let ordinal = Token::new("5.").with_numeral(NumeralValue::Integer(5));
        assert_eq!(ordinal.numeral_kind(), Some(NumeralKind::Ordinal));
        let roman = Token::new("XX").with_numeral(NumeralValue::Integer(20));
        assert_eq!(roman.numeral_kind(), Some(NumeralKind::Roman));
        let word = Token::new("kahe").with_analysis("kaks", "N", "sg g").with_numeral(NumeralValue::Integer(2));
        assert_eq!(word.numeral_kind(), Some(NumeralKind::Cardinal));
        assert_eq!(Token::new("päeva").numeral_kind(), None);
    }
}
