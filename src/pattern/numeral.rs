//! Special-numeral element: Roman numerals and (multi-token) numeral phrases.

use super::word::Verdict;
use crate::semantics::SemanticFragment;
use crate::{NumeralRole, NumeralValue, Token};

/// Numeral sub-types a numeral element may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumeralKind {
    /// Number word (`kaks`, `kakskümmend`).
    Cardinal,
    /// Ordinal word or digits with a trailing dot (`teine`, `5.`).
    Ordinal,
    /// Bare digits (`15`).
    Digits,
    /// Roman numeral (`XX`).
    Roman,
    /// Fraction (`pool`, `1/2`).
    Fraction,
}

#[derive(Debug, Clone)]
pub struct NumeralWord {
    pub(crate) kinds: Vec<NumeralKind>,
    pub(crate) range: Option<(i64, i64)>,
    pub(crate) fragment: SemanticFragment,
}

impl NumeralWord {
    pub(crate) fn new(kinds: &[NumeralKind]) -> Self {
        NumeralWord { kinds: kinds.to_vec(), range: None, fragment: SemanticFragment::default() }
    }

    /// A multi-token numeral phrase is tracked through its roles: the first
    /// token starts a partial match, middle tokens keep it alive and only the
    /// phrase end (which carries the phrase value) can make it final.
    pub(crate) fn verdict(&self, token: &Token) -> Verdict {
        let Some(role) = token.numeral_role() else {
            return Verdict::None;
        };
        let Some(kind) = token.numeral_kind() else {
            return Verdict::None;
        };
        if !self.kinds.is_empty() && !self.kinds.contains(&kind) {
            return Verdict::None;
        }

        match role {
            NumeralRole::Start => Verdict::PartialStart,
            NumeralRole::Middle => Verdict::PartialMiddle,
            NumeralRole::Single | NumeralRole::End => match token.numeral {
                Some(value) if self.in_range(value) => Verdict::Final,
                _ => Verdict::None,
            },
        }
    }

    fn in_range(&self, value: NumeralValue) -> bool {
        match self.range {
            None => true,
            Some((lo, hi)) => {
                let v = value.as_f64();
                v >= lo as f64 && v <= hi as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cardinal(text: &str, value: Option<i64>, role: NumeralRole) -> Token {
        let mut t = Token::new(text).with_analysis(text, "N", "sg n").with_numeral_role(role);
        t.numeral = value.map(NumeralValue::Integer);
        t
    }

    #[test]
    fn multi_token_phrase_is_partial_until_its_end() {
        let p = NumeralWord::new(&[NumeralKind::Cardinal]);
        assert_eq!(p.verdict(&cardinal("kakskümmend", None, NumeralRole::Start)), Verdict::PartialStart);
        assert_eq!(p.verdict(&cardinal("kolm", Some(23), NumeralRole::End)), Verdict::Final);
    }

    #[test]
    fn range_is_checked_on_the_phrase_value() {
        let mut p = NumeralWord::new(&[]);
        p.range = Some((1, 31));
        assert_eq!(p.verdict(&cardinal("kolm", Some(3), NumeralRole::Single)), Verdict::Final);
        assert_eq!(p.verdict(&cardinal("sada", Some(100), NumeralRole::Single)), Verdict::None);
    }

    #[test]
    fn kind_filter_rejects_other_subtypes() {
        let p = NumeralWord::new(&[NumeralKind::Ordinal]);
        let digits = Token::new("15").with_numeral(NumeralValue::Integer(15));
        assert_eq!(p.verdict(&digits), Verdict::None);
        let ordinal = Token::new("15.").with_numeral(NumeralValue::Integer(15));
        assert_eq!(p.verdict(&ordinal), Verdict::Final);
    }

    #[test]
    fn missing_value_is_treated_as_absent() {
        let p = NumeralWord::new(&[]);
        assert_eq!(p.verdict(&cardinal("mitu", None, NumeralRole::Single)), Verdict::None);
    }
}
