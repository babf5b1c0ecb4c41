//! Rules that join adjacent candidates into phrases and ranges.

use super::word::{Verdict, WordPattern};
use crate::Token;
use crate::semantics::{Attributes, TimexType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeKind {
    /// Children are resolved in order, each continuing from the previous
    /// child's state; the merged expression carries the last value.
    Phrase,
    /// Both endpoints start from the parent's state independently.
    Range,
}

#[derive(Debug, Clone)]
pub struct MergeRule {
    pub name: String,
    pub kind: MergeKind,
    pub(crate) left: String,
    pub(crate) right: String,
    pub(crate) connector: Option<WordPattern>,
    pub(crate) across_split: bool,
    pub(crate) split: bool,
    pub(crate) result_kind: Option<TimexType>,
    pub(crate) markers: Vec<String>,
    pub(crate) attributes: Attributes,
}

impl MergeRule {
    fn new(name: &str, kind: MergeKind, left: &str, right: &str) -> Self {
        MergeRule {
            name: name.to_string(),
            kind,
            left: left.to_string(),
            right: right.to_string(),
            connector: None,
            across_split: false,
            split: false,
            result_kind: None,
            markers: Vec::new(),
            attributes: Attributes::default(),
        }
    }

    pub fn phrase(name: &str, left: &str, right: &str) -> Self {
        Self::new(name, MergeKind::Phrase, left, right)
    }

    pub fn range(name: &str, left: &str, right: &str) -> Self {
        Self::new(name, MergeKind::Range, left, right)
    }

    /// Require exactly one token between the two candidates, matching `pattern`.
    pub fn with_connector(mut self, pattern: WordPattern) -> Self {
        self.connector = Some(pattern);
        self
    }

    /// Join across a split `N-M` token: the left candidate must end on the
    /// range-start half, the right one begin on the range-end half.
    pub fn across_range_split(mut self) -> Self {
        self.across_split = true;
        self
    }

    /// Emit the range as a duration with two linked endpoint expressions.
    pub fn splitting(mut self) -> Self {
        self.split = true;
        self
    }

    pub fn yielding(mut self, kind: TimexType) -> Self {
        self.result_kind = Some(kind);
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.markers.push(marker.to_string());
        self
    }

    pub fn modifier(mut self, modifier: &str) -> Self {
        self.attributes.modifier = Some(modifier.to_string());
        self
    }

    pub(crate) fn accepts(&self, left: &[String], right: &[String]) -> bool {
        left.iter().any(|m| *m == self.left) && right.iter().any(|m| *m == self.right)
    }

    /// Do candidates ending at `left_end` and starting at `right_start` sit
    /// where this rule allows?
    pub(crate) fn connects(&self, tokens: &[Token], left_end: usize, right_start: usize) -> bool {
        if self.across_split {
            return right_start == left_end + 1
                && tokens.get(left_end).is_some_and(|t| t.range_start)
                && tokens.get(right_start).is_some_and(|t| t.range_end);
        }
        match &self.connector {
            None => right_start == left_end + 1,
            Some(pattern) => {
                right_start == left_end + 2
                    && tokens.get(left_end + 1).is_some_and(|t| pattern.matches(t).verdict == Verdict::Final)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_must_sit_between() {
        let rule = MergeRule::range("a - b", "DATE", "DATE").with_connector(WordPattern::literal(&["-", "kuni"]));
        let tokens = vec![Token::new("3."), Token::new("kuni"), Token::new("5.")];
        assert!(rule.connects(&tokens, 0, 2));
        assert!(!rule.connects(&tokens, 0, 1));
    }

    #[test]
    fn split_tokens_connect_on_range_flags() {
        let rule = MergeRule::range("N-M", "RANGE_DAY_FROM", "DATE").across_range_split();
        let mut tokens = vec![Token::new("8-"), Token::new("10")];
        assert!(!rule.connects(&tokens, 0, 1));
        tokens[0].range_start = true;
        tokens[1].range_end = true;
        assert!(rule.connects(&tokens, 0, 1));
    }

    #[test]
    fn markers_select_sides() {
        let rule = MergeRule::phrase("date time", "DATE", "TIME");
        assert!(rule.accepts(&["DATE".to_string()], &["TIME".to_string(), "X".to_string()]));
        assert!(!rule.accepts(&["TIME".to_string()], &["DATE".to_string()]));
    }
}
