//! Single-token matchers.
//!
//! Every variant carries a [`SemanticFragment`]: the instructions it
//! contributes when it takes part in a phrase match and the value it exposes
//! to `Value::Ref` lookups. Classes add their own fragment on top of the
//! member that matched.

use super::numeral::{NumeralKind, NumeralWord};
use crate::error::RuleError;
use crate::semantics::{SemanticFragment, SemanticInstruction, Value};
use crate::{NumeralRole, NumeralValue, Token};
use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

/// Outcome of testing one token against one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    None,
    /// First token of a multi-token numeral phrase.
    PartialStart,
    /// Inner token of a multi-token numeral phrase.
    PartialMiddle,
    Final,
}

impl Verdict {
    pub fn is_none(self) -> bool {
        self == Verdict::None
    }

    pub fn is_partial(self) -> bool {
        matches!(self, Verdict::PartialStart | Verdict::PartialMiddle)
    }
}

/// Verdict plus whatever the match learned about the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMatch {
    pub verdict: Verdict,
    /// Index of the literal/lemma alternative that matched.
    pub alternative: Option<usize>,
    /// Regex capture groups; group 0 is the whole token.
    pub groups: Vec<String>,
    /// Member indices from the outermost class down to the leaf that matched.
    pub(crate) path: Vec<usize>,
    /// Final verdict on the last token of a multi-token numeral phrase; only
    /// valid after the phrase start was consumed by the same element.
    pub(crate) continuation: bool,
}

impl WordMatch {
    pub(crate) fn none() -> Self {
        WordMatch { verdict: Verdict::None, alternative: None, groups: Vec::new(), path: Vec::new(), continuation: false }
    }

    fn with_verdict(verdict: Verdict) -> Self {
        WordMatch { verdict, ..WordMatch::none() }
    }

    fn alternative(index: usize) -> Self {
        WordMatch { verdict: Verdict::Final, alternative: Some(index), ..WordMatch::none() }
    }
}

#[derive(Debug, Clone)]
pub enum WordPattern {
    /// Normalized surface text, compared case-insensitively.
    Literal { alternatives: Vec<String>, fragment: SemanticFragment },
    /// Canonical form of any analysis, optionally with a part of speech.
    Lemma { alternatives: Vec<String>, pos: Option<String>, fragment: SemanticFragment },
    /// Whole-token regex. `regex` is `None` when the source did not compile.
    Regex { source: String, regex: Option<Regex>, fragment: SemanticFragment },
    Numeral(NumeralWord),
    /// Named list of patterns; the first member with a verdict wins.
    Class { name: String, members: Vec<WordPattern>, fragment: SemanticFragment },
}

impl WordPattern {
    pub fn literal(alternatives: &[&str]) -> Self {
        WordPattern::Literal {
            alternatives: alternatives.iter().map(|a| a.to_lowercase()).collect(),
            fragment: SemanticFragment::default(),
        }
    }

    pub fn lemma(alternatives: &[&str]) -> Self {
        WordPattern::Lemma {
            alternatives: alternatives.iter().map(|a| canonical_lemma(a)).collect(),
            pos: None,
            fragment: SemanticFragment::default(),
        }
    }

    pub fn lemma_with_pos(alternatives: &[&str], pos: &str) -> Self {
        match Self::lemma(alternatives) {
            WordPattern::Lemma { alternatives, fragment, .. } => {
                WordPattern::Lemma { alternatives, pos: Some(pos.to_string()), fragment }
            }
            other => other,
        }
    }

    /// Regex element; a source that does not compile yields an element that
    /// never matches.
    pub fn regex(source: &str) -> Self {
        Self::try_regex(source).unwrap_or_else(|err| {
            warn!(pattern = source, error = %err, "regex element degraded to never-matching");
            WordPattern::Regex { source: source.to_string(), regex: None, fragment: SemanticFragment::default() }
        })
    }

    pub fn try_regex(source: &str) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(&format!("^(?:{source})$"))
            .case_insensitive(true)
            .build()
            .map_err(|e| RuleError::Regex { pattern: source.to_string(), message: e.to_string() })?;
        Ok(WordPattern::Regex { source: source.to_string(), regex: Some(regex), fragment: SemanticFragment::default() })
    }

    /// Numeral phrase of any of `kinds` (empty: any kind).
    pub fn numeral(kinds: &[NumeralKind]) -> Self {
        WordPattern::Numeral(NumeralWord::new(kinds))
    }

    pub fn class(name: &str, members: Vec<WordPattern>) -> Self {
        WordPattern::Class { name: name.to_string(), members, fragment: SemanticFragment::default() }
    }

    /// Restrict a numeral element to an inclusive value range.
    pub fn in_range(mut self, lo: i64, hi: i64) -> Self {
        if let WordPattern::Numeral(n) = &mut self {
            n.range = Some((lo, hi));
        }
        self
    }

    pub fn with(mut self, instruction: SemanticInstruction) -> Self {
        self.fragment_mut().instructions.push(instruction);
        self
    }

    pub fn with_semantics(mut self, instructions: Vec<SemanticInstruction>) -> Self {
        self.fragment_mut().instructions.extend(instructions);
        self
    }

    /// Value exposed to references from other elements and rule semantics.
    pub fn valued(mut self, value: Value) -> Self {
        self.fragment_mut().value = Some(value);
        self
    }

    pub fn fragment(&self) -> &SemanticFragment {
        match self {
            WordPattern::Literal { fragment, .. }
            | WordPattern::Lemma { fragment, .. }
            | WordPattern::Regex { fragment, .. }
            | WordPattern::Class { fragment, .. } => fragment,
            WordPattern::Numeral(n) => &n.fragment,
        }
    }

    fn fragment_mut(&mut self) -> &mut SemanticFragment {
        match self {
            WordPattern::Literal { fragment, .. }
            | WordPattern::Lemma { fragment, .. }
            | WordPattern::Regex { fragment, .. }
            | WordPattern::Class { fragment, .. } => fragment,
            WordPattern::Numeral(n) => &mut n.fragment,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            WordPattern::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn matches(&self, token: &Token) -> WordMatch {
        match self {
            WordPattern::Literal { alternatives, .. } => {
                if token.lower.is_empty() {
                    return WordMatch::none();
                }
                alternatives.iter().position(|a| *a == token.lower).map_or_else(WordMatch::none, WordMatch::alternative)
            }
            WordPattern::Lemma { alternatives, pos, .. } => {
                for (i, alt) in alternatives.iter().enumerate() {
                    let hit = token.analyses.iter().any(|a| {
                        canonical_lemma(&a.lemma) == *alt && pos.as_ref().is_none_or(|p| a.pos == *p)
                    });
                    if hit {
                        return WordMatch::alternative(i);
                    }
                }
                WordMatch::none()
            }
            WordPattern::Regex { regex, .. } => {
                let Some(re) = regex else {
                    return WordMatch::none();
                };
                match re.captures(&token.normalized) {
                    Some(caps) => WordMatch {
                        groups: caps.iter().map(|g| g.map_or_else(String::new, |m| m.as_str().to_string())).collect(),
                        ..WordMatch::with_verdict(Verdict::Final)
                    },
                    None => WordMatch::none(),
                }
            }
            WordPattern::Numeral(n) => WordMatch {
                continuation: token.numeral_role() == Some(NumeralRole::End),
                ..WordMatch::with_verdict(n.verdict(token))
            },
            WordPattern::Class { members, .. } => {
                for (i, member) in members.iter().enumerate() {
                    let mut m = member.matches(token);
                    if !m.verdict.is_none() {
                        m.path.insert(0, i);
                        return m;
                    }
                }
                WordMatch::none()
            }
        }
    }

    /// Semantic fragment for a concrete match: the leaf member's
    /// instructions first, then each enclosing class's. Values local to the
    /// match (numeral, alternative index, regex group) are filled in;
    /// cross-element references are left for the rule to resolve.
    pub(crate) fn fragment_for(&self, m: &WordMatch, tokens: &[&Token]) -> SemanticFragment {
        let mut out = SemanticFragment::default();
        self.collect(&m.path, m, tokens, &mut out);
        out
    }

    fn collect(&self, path: &[usize], m: &WordMatch, tokens: &[&Token], out: &mut SemanticFragment) {
        if let (WordPattern::Class { members, .. }, Some((first, rest))) = (self, path.split_first()) {
            if let Some(member) = members.get(*first) {
                member.collect(rest, m, tokens, out);
            }
        }

        let own = self.fragment();
        for instruction in &own.instructions {
            match resolve_local(&instruction.value, m, tokens) {
                Some(value) => out.instructions.push(SemanticInstruction { value, ..instruction.clone() }),
                None => trace!(instruction = %instruction, "dropping instruction: value not present in match"),
            }
        }

        if out.value.is_none() {
            out.value = match (&own.value, self) {
                (Some(v), _) => resolve_local(v, m, tokens),
                (None, WordPattern::Numeral(_)) => resolve_local(&Value::Numeral { offset: 0 }, m, tokens),
                (None, WordPattern::Regex { .. }) => resolve_local(&Value::Group(0), m, tokens),
                (None, _) => None,
            };
        }
    }
}

fn resolve_local(value: &Value, m: &WordMatch, tokens: &[&Token]) -> Option<Value> {
    match value {
        Value::Numeral { offset } => phrase_numeral(tokens).map(|n| Value::Number(n.offset(*offset))),
        Value::AlternativeIndex { offset } => m.alternative.map(|i| Value::int(i as i64 + offset)),
        Value::Group(g) => m.groups.get(*g).filter(|s| !s.is_empty()).map(|s| match s.parse::<i64>() {
            Ok(n) => Value::int(n),
            Err(_) => Value::Text(s.clone()),
        }),
        Value::Template { prefix, source } => match resolve_local(source, m, tokens)? {
            v if v.is_resolved() => Some(Value::Label(format!("{prefix}{v}"))),
            v => Some(Value::Template { prefix: prefix.clone(), source: Box::new(v) }),
        },
        other => Some(other.clone()),
    }
}

/// Numeral phrases carry their value on the last token.
fn phrase_numeral(tokens: &[&Token]) -> Option<NumeralValue> {
    tokens.iter().rev().find_map(|t| t.numeral)
}

/// Lemmas from the analyser mark compound boundaries (`kolma_päev`, `nädala=vahetus`).
fn canonical_lemma(lemma: &str) -> String {
    lemma.chars().filter(|c| !matches!(c, '_' | '=' | '+')).collect::<String>().to_lowercase()
}
