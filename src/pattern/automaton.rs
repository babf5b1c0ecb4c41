//! Phrase automaton: an NFA whose transitions are word patterns.
//!
//! For an N-element pattern the states are `0..=N`; element `i` moves state
//! `i` to `i + 1` on a final verdict, keeps the path on `i` on a partial one,
//! and optional elements add an epsilon edge `i -> i + 1`. Every token
//! re-seeds the start closure, so a phrase may begin anywhere.

use super::word::{Verdict, WordMatch, WordPattern};
use crate::Token;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// One position of a phrase pattern.
#[derive(Debug, Clone)]
pub struct PatternElement {
    pub(crate) pattern: WordPattern,
    pub(crate) optional: bool,
    pub(crate) label: Option<String>,
}

impl PatternElement {
    pub fn new(pattern: WordPattern) -> Self {
        PatternElement { pattern, optional: false, label: None }
    }

    /// May be skipped; contributes no tokens when it is.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Name used by references and filters instead of the class name.
    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn pattern(&self) -> &WordPattern {
        &self.pattern
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl From<WordPattern> for PatternElement {
    fn from(pattern: WordPattern) -> Self {
        PatternElement::new(pattern)
    }
}

/// Tokens and match details one element consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubMatch {
    pub(crate) tokens: Vec<usize>,
    pub(crate) word: WordMatch,
}

/// A completed phrase match over token indices `start..=end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    pub start: usize,
    pub end: usize,
    pub(crate) parts: Vec<Option<SubMatch>>,
}

impl PhraseMatch {
    pub fn matched(&self, element: usize) -> bool {
        self.parts.get(element).is_some_and(Option::is_some)
    }

    pub fn tokens_of(&self, element: usize) -> &[usize] {
        match self.parts.get(element) {
            Some(Some(sub)) => &sub.tokens,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LivePath {
    state: usize,
    history: BTreeMap<usize, SubMatch>,
}

impl LivePath {
    fn consumed(&self) -> bool {
        !self.history.is_empty()
    }

    fn record(&mut self, element: usize, token: usize, word: WordMatch) {
        let sub = self.history.entry(element).or_insert_with(|| SubMatch { tokens: Vec::new(), word: word.clone() });
        sub.tokens.push(token);
        sub.word = word;
    }
}

#[derive(Debug, Clone)]
pub struct PhrasePattern {
    elements: Vec<PatternElement>,
    labels: Vec<String>,
}

impl PhrasePattern {
    /// Element labels default to the class name (`#i` for plain elements),
    /// with `_1`, `_2`, ... appended when a label repeats.
    pub fn new(elements: Vec<PatternElement>) -> Self {
        let base: Vec<String> = elements
            .iter()
            .enumerate()
            .map(|(i, e)| match (&e.label, e.pattern.class_name()) {
                (Some(label), _) => label.clone(),
                (None, Some(class)) => class.to_string(),
                (None, None) => format!("#{i}"),
            })
            .collect();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let labels = base
            .iter()
            .map(|label| {
                if base.iter().filter(|b| *b == label).count() < 2 {
                    return label.clone();
                }
                let n = seen.entry(label.as_str()).or_insert(0);
                *n += 1;
                format!("{label}_{n}")
            })
            .collect();

        PhrasePattern { elements, labels }
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn element_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Run the automaton over `tokens`, returning every accepted match in
    /// order of its last token. Paths never cross a sentence start.
    pub fn scan(&self, tokens: &[Token]) -> Vec<PhraseMatch> {
        let n = self.elements.len();
        let mut accepted = Vec::new();
        if n == 0 {
            return accepted;
        }

        let mut live: Vec<LivePath> = Vec::new();
        for (index, token) in tokens.iter().enumerate() {
            if token.sentence_start {
                live.clear();
            }
            live.extend(self.closure(LivePath { state: 0, history: BTreeMap::new() }).into_iter().filter(|p| p.state < n));

            let mut memo: HashMap<&str, WordMatch> = HashMap::new();
            let mut next: Vec<LivePath> = Vec::new();
            for mut path in live.drain(..) {
                let element = &self.elements[path.state];
                let word = classify(element, token, &mut memo);
                let started = path.history.get(&path.state).is_some();
                match word.verdict {
                    Verdict::None => {}
                    Verdict::PartialStart if !started => {
                        path.record(path.state, index, word);
                        push_unique(&mut next, path);
                    }
                    Verdict::PartialMiddle if started => {
                        path.record(path.state, index, word);
                        push_unique(&mut next, path);
                    }
                    Verdict::PartialStart | Verdict::PartialMiddle => {}
                    Verdict::Final if word.continuation && !started => {}
                    Verdict::Final => {
                        path.record(path.state, index, word);
                        path.state += 1;
                        for reached in self.closure(path) {
                            if reached.state == n {
                                accepted.push(self.materialize(reached));
                            } else {
                                push_unique(&mut next, reached);
                            }
                        }
                    }
                }
            }
            live = next;
        }

        trace!(matches = accepted.len(), "phrase scan finished");
        accepted
    }

    /// `path` plus every state reachable over optional elements.
    fn closure(&self, path: LivePath) -> Vec<LivePath> {
        let mut out = vec![path];
        while let Some(last) = out.last() {
            if last.state >= self.elements.len() || !self.elements[last.state].optional {
                break;
            }
            let mut skipped = last.clone();
            skipped.state += 1;
            out.push(skipped);
        }
        out.retain(|p| p.consumed() || p.state < self.elements.len());
        out
    }

    fn materialize(&self, path: LivePath) -> PhraseMatch {
        let consumed = path.history.values().flat_map(|s| s.tokens.iter().copied());
        let (start, end) = consumed.fold((usize::MAX, 0), |(lo, hi), t| (lo.min(t), hi.max(t)));
        let mut parts = vec![None; self.elements.len()];
        for (element, sub) in path.history {
            parts[element] = Some(sub);
        }
        PhraseMatch { start, end, parts }
    }
}

/// Class verdicts are memoized by class name for the current token.
fn classify<'p>(element: &'p PatternElement, token: &Token, memo: &mut HashMap<&'p str, WordMatch>) -> WordMatch {
    match element.pattern.class_name() {
        Some(name) => memo.entry(name).or_insert_with(|| element.pattern.matches(token)).clone(),
        None => element.pattern.matches(token),
    }
}

fn push_unique(paths: &mut Vec<LivePath>, path: LivePath) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NumeralRole, NumeralValue};

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|w| Token::new(w)).collect()
    }

    #[test]
    fn matches_anywhere_in_the_stream() {
        let p = PhrasePattern::new(vec![WordPattern::literal(&["kell"]).into(), WordPattern::regex(r"\d{1,2}").into()]);
        let found = p.scan(&tokens(&["tulen", "kell", "14", "kell", "15"]));
        let spans: Vec<(usize, usize)> = found.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn optional_elements_add_epsilon_edges() {
        let p = PhrasePattern::new(vec![
            PatternElement::new(WordPattern::literal(&["kell"])).optional(),
            WordPattern::regex(r"\d{1,2}:\d{2}").into(),
        ]);
        let with = p.scan(&tokens(&["kell", "14:30"]));
        assert!(with.iter().any(|m| (m.start, m.end) == (0, 1) && m.matched(0)));
        assert!(with.iter().any(|m| (m.start, m.end) == (1, 1) && !m.matched(0)));

        let without = p.scan(&tokens(&["juba", "14:30"]));
        assert_eq!(without.len(), 1);
        assert_eq!((without[0].start, without[0].end), (1, 1));
    }

    #[test]
    fn multi_token_numeral_stays_on_one_element() {
        let mut words = tokens(&["kahekümne", "kolme", "päeva"]);
        words[0] = words[0].clone().with_analysis("kakskümmend", "N", "sg g").with_numeral_role(NumeralRole::Start);
        words[1] = words[1]
            .clone()
            .with_analysis("kolm", "N", "sg g")
            .with_numeral_role(NumeralRole::End)
            .with_numeral(NumeralValue::Integer(23));

        let p = PhrasePattern::new(vec![WordPattern::numeral(&[]).into(), WordPattern::literal(&["päeva"]).into()]);
        let found = p.scan(&words);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tokens_of(0), &[0, 1]);
        assert_eq!(found[0].tokens_of(1), &[2]);
    }

    #[test]
    fn repeated_classes_get_suffixed_labels() {
        let day = || WordPattern::class("DAY", vec![WordPattern::regex(r"\d+")]);
        let p = PhrasePattern::new(vec![day().into(), WordPattern::literal(&["-"]).into(), day().into()]);
        assert_eq!(p.labels(), &["DAY_1".to_string(), "#1".to_string(), "DAY_2".to_string()]);
        assert_eq!(p.element_index("DAY_2"), Some(2));
    }

    #[test]
    fn sentence_start_cuts_live_paths() {
        let mut words = tokens(&["kell", "14"]);
        words[1].sentence_start = true;
        let p = PhrasePattern::new(vec![WordPattern::literal(&["kell"]).into(), WordPattern::regex(r"\d+").into()]);
        assert!(p.scan(&words).is_empty());
    }
}
