//! Rules: a phrase pattern plus filter-gated semantics, markers and vetoes.

use super::automaton::{PatternElement, PhraseMatch, PhrasePattern};
use crate::Token;
use crate::error::RuleError;
use crate::semantics::{Attributes, Direction, EndpointDirection, SemanticInstruction, TimexType, Value};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Names one element of a rule's phrase pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubPart {
    Index(usize),
    /// Element label: class name, explicit label, or `CLASS_n` for repeats.
    Label(String),
}

impl From<&str> for SubPart {
    fn from(label: &str) -> Self {
        SubPart::Label(label.to_string())
    }
}

impl From<usize> for SubPart {
    fn from(index: usize) -> Self {
        SubPart::Index(index)
    }
}

/// `|`-separated alternatives, each a whitespace-separated set of tags that
/// must all be present on one analysis (`"sg el|pl el"`, `"_V_ s"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpec {
    alternatives: Vec<Vec<String>>,
}

impl FeatureSpec {
    /// A spec without any tag degrades to one that never accepts.
    pub fn parse(spec: &str) -> Self {
        let alternatives: Vec<Vec<String>> = spec
            .split('|')
            .map(|alt| alt.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|alt| !alt.is_empty())
            .collect();
        if alternatives.is_empty() {
            warn!(spec, "empty morphological filter degraded to never-matching");
        }
        FeatureSpec { alternatives }
    }

    pub fn accepts(&self, token: &Token) -> bool {
        token.analyses.iter().any(|a| self.alternatives.iter().any(|alt| a.has_features(alt)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every token of the sub-part has an analysis carrying the features.
    Morph { part: SubPart, features: FeatureSpec },
    /// The sub-part was (or, negated, was not) matched.
    Structural { part: SubPart, negated: bool },
}

impl Filter {
    pub fn morph(part: impl Into<SubPart>, features: &str) -> Self {
        Filter::Morph { part: part.into(), features: FeatureSpec::parse(features) }
    }

    pub fn matched(part: impl Into<SubPart>) -> Self {
        Filter::Structural { part: part.into(), negated: false }
    }

    pub fn not_matched(part: impl Into<SubPart>) -> Self {
        Filter::Structural { part: part.into(), negated: true }
    }

    /// Textual form: `LABEL:features` for morphological filters, `LABEL` or
    /// `!LABEL` for structural ones.
    pub fn parse(spec: &str) -> Result<Self, RuleError> {
        let spec = spec.trim();
        if let Some((part, features)) = spec.split_once(':') {
            if part.trim().is_empty() || features.trim().is_empty() {
                return Err(RuleError::Filter(spec.to_string()));
            }
            return Ok(Filter::morph(part.trim(), features));
        }
        match spec.strip_prefix('!') {
            Some(part) if !part.trim().is_empty() => Ok(Filter::not_matched(part.trim())),
            None if !spec.is_empty() => Ok(Filter::matched(spec)),
            _ => Err(RuleError::Filter(spec.to_string())),
        }
    }

    fn passes(&self, phrase: &PhrasePattern, m: &PhraseMatch, tokens: &[Token]) -> bool {
        match self {
            Filter::Morph { part, features } => {
                let Some(index) = resolve_part(phrase, part) else {
                    return false;
                };
                let part_tokens = m.tokens_of(index);
                !part_tokens.is_empty() && part_tokens.iter().all(|&t| features.accepts(&tokens[t]))
            }
            Filter::Structural { part, negated } => {
                let matched = resolve_part(phrase, part).is_some_and(|i| m.matched(i));
                matched != *negated
            }
        }
    }
}

fn resolve_part(phrase: &PhrasePattern, part: &SubPart) -> Option<usize> {
    match part {
        SubPart::Index(i) => (*i < phrase.elements().len()).then_some(*i),
        SubPart::Label(label) => phrase.element_index(label),
    }
}

/// Regex sequence matched at a fixed offset from a candidate's first token;
/// a hit deletes the candidate. Case-sensitive, on the normalized text.
#[derive(Debug, Clone)]
pub struct NegativePattern {
    offset: isize,
    words: Vec<Option<Regex>>,
}

impl NegativePattern {
    pub fn new(offset: isize, words: &[&str]) -> Self {
        let words = words
            .iter()
            .map(|w| match Regex::new(&format!("^(?:{w})$")) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(pattern = *w, error = %err, "negative pattern word degraded to never-matching");
                    None
                }
            })
            .collect();
        NegativePattern { offset, words }
    }

    pub(crate) fn matches(&self, tokens: &[Token], start: usize) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let base = start as isize + self.offset;
        self.words.iter().enumerate().all(|(i, word)| {
            let pos = base + i as isize;
            pos >= 0
                && match (tokens.get(pos as usize), word) {
                    (Some(token), Some(re)) => re.is_match(&token.normalized),
                    _ => false,
                }
        })
    }
}

/// A block of rule semantics; contributes only when all its filters pass.
#[derive(Debug, Clone, Default)]
pub struct RuleSemantics {
    pub filters: Vec<Filter>,
    pub instructions: Vec<SemanticInstruction>,
    pub markers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub(crate) phrase: PhrasePattern,
    pub(crate) kind: Option<TimexType>,
    pub(crate) blocks: Vec<RuleSemantics>,
    pub(crate) negatives: Vec<NegativePattern>,
    pub(crate) attributes: Attributes,
}

/// A rule match that survived vetoes, with its semantics assembled.
#[derive(Debug, Clone)]
pub(crate) struct RawCandidate {
    pub(crate) rule: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) kind: Option<TimexType>,
    pub(crate) instructions: Vec<SemanticInstruction>,
    pub(crate) markers: Vec<String>,
    pub(crate) attributes: Attributes,
}

#[derive(Debug, Default)]
pub(crate) struct Extraction {
    pub(crate) candidates: Vec<RawCandidate>,
    pub(crate) vetoed: usize,
}

impl Rule {
    pub fn new(name: &str, elements: Vec<PatternElement>) -> Self {
        Rule {
            name: name.to_string(),
            phrase: PhrasePattern::new(elements),
            kind: None,
            blocks: vec![RuleSemantics::default()],
            negatives: Vec::new(),
            attributes: Attributes::default(),
        }
    }

    pub fn phrase(&self) -> &PhrasePattern {
        &self.phrase
    }

    pub fn kind(mut self, kind: TimexType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Unconditional instructions.
    pub fn semantics(mut self, instructions: Vec<SemanticInstruction>) -> Self {
        self.blocks[0].instructions.extend(instructions);
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.blocks[0].markers.push(marker.to_string());
        self
    }

    /// Instructions and markers gated by `filters`.
    pub fn when(mut self, filters: Vec<Filter>, instructions: Vec<SemanticInstruction>, markers: &[&str]) -> Self {
        self.blocks.push(RuleSemantics {
            filters,
            instructions,
            markers: markers.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    pub fn negative(mut self, pattern: NegativePattern) -> Self {
        self.negatives.push(pattern);
        self
    }

    pub fn modifier(mut self, modifier: &str) -> Self {
        self.attributes.modifier = Some(modifier.to_string());
        self
    }

    pub fn quant(mut self, quant: &str) -> Self {
        self.attributes.quant = Some(quant.to_string());
        self
    }

    pub fn freq(mut self, freq: &str) -> Self {
        self.attributes.freq = Some(freq.to_string());
        self
    }

    pub fn implicit_endpoints(mut self, direction: EndpointDirection) -> Self {
        self.attributes.implicit_endpoints = Some(direction);
        self
    }

    /// Scan `tokens` and materialize every match that is not vetoed.
    pub(crate) fn extract(&self, tokens: &[Token]) -> Extraction {
        let mut out = Extraction::default();
        for m in self.phrase.scan(tokens) {
            if let Some(neg) = self.negatives.iter().position(|n| n.matches(tokens, m.start)) {
                debug!(rule = %self.name, start = m.start, end = m.end, negative = neg, "candidate vetoed");
                out.vetoed += 1;
                continue;
            }
            match self.materialize(&m, tokens) {
                Some(candidate) => {
                    debug!(
                        rule = %self.name,
                        start = m.start,
                        end = m.end,
                        instructions = candidate.instructions.len(),
                        "rule fired"
                    );
                    out.candidates.push(candidate);
                }
                None => trace!(rule = %self.name, start = m.start, "match carries no semantics"),
            }
        }
        out
    }

    fn materialize(&self, m: &PhraseMatch, tokens: &[Token]) -> Option<RawCandidate> {
        let labels = self.phrase.labels();
        let mut instructions = Vec::new();
        let mut element_values: HashMap<&str, Value> = HashMap::new();

        for (index, element) in self.phrase.elements().iter().enumerate() {
            let Some(Some(sub)) = m.parts.get(index) else {
                continue;
            };
            let part_tokens: Vec<&Token> = sub.tokens.iter().map(|&t| &tokens[t]).collect();
            let fragment = element.pattern.fragment_for(&sub.word, &part_tokens);
            let label = labels[index].as_str();
            if let Some(value) = fragment.value {
                element_values.insert(label, value);
            }
            for mut instruction in fragment.instructions {
                instruction.class.get_or_insert_with(|| label.to_string());
                instructions.push(instruction);
            }
        }

        let mut markers = Vec::new();
        for block in &self.blocks {
            if block.filters.iter().all(|f| f.passes(&self.phrase, m, tokens)) {
                instructions.extend(block.instructions.iter().cloned());
                markers.extend(block.markers.iter().cloned());
            } else {
                trace!(rule = %self.name, filters = block.filters.len(), "semantic block filtered out");
            }
        }

        let instructions = expand_compounds(resolve_references(instructions, &element_values));
        if instructions.is_empty() && markers.is_empty() {
            return None;
        }

        Some(RawCandidate {
            rule: self.name.clone(),
            start: m.start,
            end: m.end,
            kind: self.kind,
            instructions,
            markers,
            attributes: self.attributes.clone(),
        })
    }
}

/// Resolve `Ref`/`Template` values and `Direction::Ref` step counts. Labeled
/// instructions are visible to references once their own value resolved;
/// resolution repeats until nothing changes so chains settle. Whatever is
/// still unresolved afterwards is dropped.
fn resolve_references(
    mut instructions: Vec<SemanticInstruction>,
    element_values: &HashMap<&str, Value>,
) -> Vec<SemanticInstruction> {
    let mut labeled: HashMap<String, Value> = HashMap::new();
    loop {
        let mut progressed = false;
        for instruction in instructions.iter_mut() {
            if !instruction.value.is_resolved() {
                if let Some(v) = resolve_value(&instruction.value, &labeled, element_values) {
                    instruction.value = v;
                    progressed = true;
                }
            }
            if let Direction::Ref(label) = &instruction.direction {
                let steps = lookup(label, &labeled, element_values).and_then(|v| v.as_int());
                if let Some(n) = steps {
                    instruction.direction = Direction::Steps(n as i32);
                    progressed = true;
                }
            }
            if let (Some(label), true) = (&instruction.label, instruction.value.is_resolved()) {
                if !labeled.contains_key(label) {
                    labeled.insert(label.clone(), instruction.value.clone());
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }

    instructions.retain(|i| {
        let keep = i.value.is_resolved() && !matches!(i.direction, Direction::Ref(_));
        if !keep {
            trace!(instruction = %i, "dropping unresolved instruction");
        }
        keep
    });
    instructions
}

fn lookup<'a>(
    label: &str,
    labeled: &'a HashMap<String, Value>,
    element_values: &'a HashMap<&str, Value>,
) -> Option<&'a Value> {
    labeled.get(label).or_else(|| element_values.get(label)).filter(|v| v.is_resolved())
}

fn resolve_value(
    value: &Value,
    labeled: &HashMap<String, Value>,
    element_values: &HashMap<&str, Value>,
) -> Option<Value> {
    match value {
        Value::Ref { label, negate, offset } => {
            let found = lookup(label, labeled, element_values)?;
            if !*negate && *offset == 0 {
                return Some(found.clone());
            }
            let number = match found {
                Value::Number(n) => *n,
                other => crate::NumeralValue::Integer(other.as_int()?),
            };
            let number = if *negate { number.negated() } else { number };
            Some(Value::Number(number.offset(*offset)))
        }
        Value::Template { prefix, source } => {
            let inner = if source.is_resolved() {
                (**source).clone()
            } else {
                resolve_value(source, labeled, element_values)?
            };
            Some(Value::Label(format!("{prefix}{inner}")))
        }
        v if v.is_resolved() => Some(v.clone()),
        _ => None,
    }
}

/// Replace compound-granularity instructions by their primitive parts, then
/// order everything by priority (stable, so equal priorities keep rule order).
fn expand_compounds(instructions: Vec<SemanticInstruction>) -> Vec<SemanticInstruction> {
    let mut out = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        if !instruction.granularity.is_compound() {
            out.push(instruction);
            continue;
        }
        let text = instruction.value.to_string();
        match instruction.granularity.expand(&text) {
            Some(parts) => {
                for (granularity, n) in parts {
                    let mut part = SemanticInstruction::new(instruction.op, granularity, Value::int(n));
                    part.exclude_current = instruction.exclude_current;
                    part.keep_mask = instruction.keep_mask;
                    part.anchor = instruction.anchor.clone();
                    part.class = instruction.class.clone();
                    out.push(part);
                }
            }
            None => trace!(instruction = %instruction, "compound value has the wrong shape"),
        }
    }
    out.sort_by_key(|i| i.priority);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::granularity::Granularity;
    use crate::pattern::WordPattern;
    use crate::{NumeralValue, Operation};

    fn day_month_rule() -> Rule {
        let day = WordPattern::numeral(&[]).in_range(1, 31);
        let month = WordPattern::class("MONTH", vec![WordPattern::lemma(&["mai", "juuni"])
            .with(SemanticInstruction::set(Granularity::Month, Value::AlternativeIndex { offset: 5 }))]);
        Rule::new("<day> <month>", vec![PatternElement::from(day).labeled("DAY"), month.into()])
            .semantics(vec![SemanticInstruction::set(Granularity::DayOfMonth, Value::reference("DAY"))])
            .marker("DATE")
            .when(vec![Filter::morph("MONTH", "el")], vec![], &["RANGE_FROM"])
            .when(vec![Filter::morph("MONTH", "ter")], vec![], &["RANGE_TO"])
    }

    fn tokens() -> Vec<Token> {
        vec![
            Token::new("3.").with_numeral(NumeralValue::Integer(3)),
            Token::new("juunist").with_analysis("juuni", "S", "sg el"),
        ]
    }

    #[test]
    fn references_resolve_and_sort_by_priority() {
        let out = day_month_rule().extract(&tokens());
        assert_eq!(out.candidates.len(), 1);
        let c = &out.candidates[0];
        let rendered: Vec<String> = c.instructions.iter().map(|i| i.to_string()).collect();
        assert_eq!(rendered, vec!["SET MONTH 6", "SET DAY_OF_MONTH 3"]);
        assert_eq!(c.instructions[0].class.as_deref(), Some("MONTH"));
    }

    #[test]
    fn filters_gate_markers() {
        let out = day_month_rule().extract(&tokens());
        assert_eq!(out.candidates[0].markers, vec!["DATE".to_string(), "RANGE_FROM".to_string()]);
    }

    #[test]
    fn negative_pattern_vetoes() {
        let rule = Rule::new("<month>", vec![WordPattern::literal(&["august"]).into()])
            .semantics(vec![SemanticInstruction::set(Granularity::Month, Value::int(8))])
            .negative(NegativePattern::new(-1, &["[A-ZÕÄÖÜŠŽ][a-zõäöüšž]+"]));
        let named = vec![Token::new("Juhan"), Token::new("August")];
        let out = rule.extract(&named);
        assert!(out.candidates.is_empty());
        assert_eq!(out.vetoed, 1);

        let month = vec![Token::new("eelmisel"), Token::new("augustil")];
        assert_eq!(rule.extract(&month).vetoed, 0);
    }

    #[test]
    fn compound_instructions_expand() {
        let rule = Rule::new("<hh:mm>", vec![WordPattern::regex(r"\d{1,2}:\d{2}").into()])
            .semantics(vec![SemanticInstruction::set(Granularity::TimeOfDay, Value::reference("#0"))]);
        let out = rule.extract(&[Token::new("14:30")]);
        let c = &out.candidates[0];
        assert_eq!(c.instructions.len(), 2);
        assert_eq!(c.instructions[0].granularity, Granularity::HourOfDay);
        assert_eq!(c.instructions[1].value, Value::int(30));
        assert!(c.instructions.iter().all(|i| i.op == Operation::Set));
    }

    #[test]
    fn filter_text_form() {
        assert_eq!(Filter::parse("MONTH:el|ter").ok(), Some(Filter::morph("MONTH", "el|ter")));
        assert_eq!(Filter::parse("!YEAR").ok(), Some(Filter::not_matched("YEAR")));
        assert!(Filter::parse(":el").is_err());
        assert!(Filter::parse("").is_err());
    }

    #[test]
    fn unresolvable_reference_is_dropped() {
        let rule = Rule::new("x", vec![WordPattern::literal(&["x"]).into()])
            .semantics(vec![SemanticInstruction::add(Granularity::Year, Value::reference("MISSING"))])
            .marker("M");
        let out = rule.extract(&[Token::new("x")]);
        assert!(out.candidates[0].instructions.is_empty());
    }
}
