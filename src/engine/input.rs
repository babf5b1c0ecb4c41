//! Input preparation: surface normalization, numerals, hyphen ranges, tense.
//!
//! ```text
//! caller tokens ──▶ normalize ──▶ split "8-10" ──▶ numerals ──▶ tense ──▶ positions
//!                   "(juunil),"     "8-" "10"       "XX." -> 20    "oli" -> Past
//! ```

use crate::api::Options;
use crate::{NumeralValue, Tense, Token, parse_roman};
use tracing::trace;

/// Form tags that put a verb in the past: simple past endings and the
/// `nud`/`tud` participles.
const PAST_TAGS: &[&str] = &["s", "sin", "sid", "sime", "site", "ti", "nud", "tud"];

/// Map typographic dashes and quotes to ASCII and trim surrounding
/// punctuation. A trailing period survives on numbers (`3.`, `XX.`) and on
/// anything without lowercase letters; a trailing hyphen always survives.
pub(crate) fn normalize_surface(text: &str) -> String {
    let mapped: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '–' | '—' | '−' => '-',
            '«' | '»' | '„' | '“' | '”' => '"',
            '‘' | '’' | '`' => '\'',
            other => other,
        })
        .collect();

    // '09 is a two-digit year, not a quoted word.
    if let Some(rest) = mapped.strip_prefix('\'') {
        if rest.len() == 2 && rest.chars().all(|c| c.is_ascii_digit()) {
            return mapped;
        }
    }

    let trimmed =
        mapped.trim_matches(|c| matches!(c, ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\''));
    match trimmed.strip_suffix('.') {
        Some(body) if !body.is_empty() && body.chars().any(|c| c.is_lowercase()) => body.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Largest Roman numeral read from text: centuries and ordinal days. Above
/// this the letters are far more often words (`CD`, `MIX`) than numbers.
const ROMAN_MAX: i64 = 39;

/// Parse digits, `N.` ordinals and Roman numerals. A Roman reading needs the
/// analyser to agree (numeral `N`/`O` analyses only, or none at all).
fn parse_numeral(token: &Token) -> Option<NumeralValue> {
    let body = token.normalized.trim_end_matches('-');
    let digits = body.strip_suffix('.').unwrap_or(body);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.parse().ok().map(NumeralValue::Integer);
    }
    if body.chars().any(|c| c.is_ascii_lowercase()) {
        return None;
    }
    if !token.analyses.iter().all(|a| matches!(a.pos.as_str(), "N" | "O")) {
        return None;
    }
    parse_roman(body).filter(|v| (1..=ROMAN_MAX).contains(v)).map(NumeralValue::Integer)
}

fn verb_tense(token: &Token) -> Option<Tense> {
    let verbs: Vec<_> = token.analyses.iter().filter(|a| a.is_verb()).collect();
    if verbs.is_empty() {
        return None;
    }
    let past = verbs.iter().any(|a| a.tags().any(|t| PAST_TAGS.contains(&t)));
    Some(if past { Tense::Past } else { Tense::Present })
}

/// Split `N-M` into a range-start half `N-` and a range-end half `M`, both
/// at the original text offset.
fn split_range(token: &Token) -> Option<(Token, Token)> {
    let caps = regex!(r"^(\d+\.?)-(\d+\.?)$").captures(token.normalized())?;
    let (left, right) = (caps.get(1)?.as_str(), caps.get(2)?.as_str());
    if !(is_day_sized(left) && is_day_sized(right)) && !(is_year(left) && is_year(right)) {
        return None;
    }

    let mut start = Token::new(&format!("{left}-")).at(token.offset);
    start.sentence_start = token.sentence_start;
    start.range_start = true;

    let mut end = Token::new(right).at(token.offset);
    end.sentence_end = token.sentence_end;
    end.range_end = true;

    trace!(text = %token.text, left, right, "split range token");
    Some((start, end))
}

/// `8`, `10.`: fits a day or month number.
fn is_day_sized(side: &str) -> bool {
    side.trim_end_matches('.').parse::<u32>().is_ok_and(|n| n <= 31)
}

fn is_year(side: &str) -> bool {
    side.len() == 4 && side.chars().all(|c| c.is_ascii_digit())
}

/// Turn caller tokens into the internal stream the automaton scans.
pub(crate) fn prepare(tokens: Vec<Token>, options: &Options) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for mut token in tokens {
        token.refresh_forms();
        token.memberships.clear();
        if options.split_hyphen_tokens {
            if let Some((start, end)) = split_range(&token) {
                out.push(start);
                out.push(end);
                continue;
            }
        }
        out.push(token);
    }

    for (position, token) in out.iter_mut().enumerate() {
        token.position = position;
        if token.numeral.is_none() && token.numeral_role.is_none() {
            token.numeral = parse_numeral(token);
        }
        token.tense = verb_tense(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization_trims_and_maps() {
        assert_eq!(normalize_surface("(juunil),"), "juunil");
        assert_eq!(normalize_surface("juunil."), "juunil");
        assert_eq!(normalize_surface("3."), "3.");
        assert_eq!(normalize_surface("XX."), "XX.");
        assert_eq!(normalize_surface("8–10"), "8-10");
        assert_eq!(normalize_surface("„täna“"), "täna");
        assert_eq!(normalize_surface("'09"), "'09");
        assert_eq!(normalize_surface("14:30"), "14:30");
        assert_eq!(normalize_surface("8-"), "8-");
    }

    #[test]
    fn numerals_are_parsed_when_missing() {
        let tokens = prepare(vec![Token::new("2015"), Token::new("5."), Token::new("XX"), Token::new("kell")], &Options::default());
        let numerals: Vec<_> = tokens.iter().map(|t| t.numeral).collect();
        assert_eq!(
            numerals,
            vec![Some(NumeralValue::Integer(2015)), Some(NumeralValue::Integer(5)), Some(NumeralValue::Integer(20)), None]
        );
    }

    #[test]
    fn hyphen_ranges_split_in_two() {
        let tokens = prepare(vec![Token::new("3.–5.").at(7), Token::new("juunini").at(13)], &Options::default());
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].normalized(), "3.-");
        assert!(tokens[0].is_range_start());
        assert_eq!(tokens[1].normalized(), "5.");
        assert!(tokens[1].is_range_end());
        assert_eq!(tokens[1].offset, 7);
        assert_eq!(tokens[2].position(), 2);
        assert_eq!(tokens[0].numeral, Some(NumeralValue::Integer(3)));

        let off = Options { split_hyphen_tokens: false, ..Options::default() };
        assert_eq!(prepare(vec![Token::new("8-10")], &off).len(), 1);
    }

    #[test]
    fn roman_numerals_need_a_small_value_and_numeral_analyses() {
        let cases: Vec<(Option<NumeralValue>, Token)> = vec![
            (Some(NumeralValue::Integer(14)), Token::new("XIV")),
            (Some(NumeralValue::Integer(3)), Token::new("III.").with_analysis("III", "O", "")),
            (None, Token::new("CD")),
            (None, Token::new("DC")),
            (None, Token::new("MIX")),
            (None, Token::new("X").with_analysis("X", "Y", "")),
        ];
        for (expected, token) in cases {
            let text = token.text.clone();
            let tokens = prepare(vec![token], &Options::default());
            assert_eq!(tokens[0].numeral, expected, "{text}");
        }
    }

    #[test]
    fn only_day_or_year_sized_hyphen_pairs_split() {
        let cases: Vec<(usize, &str)> = vec![(1, "2015-06"), (1, "1-2015"), (1, "32-40"), (2, "2014-2015"), (2, "8-10"), (2, "30.-31.")];
        for (expected, text) in cases {
            assert_eq!(prepare(vec![Token::new(text)], &Options::default()).len(), expected, "{text}");
        }
    }

    #[test]
    fn verb_tense_from_form_tags() {
        let tokens = prepare(
            vec![
                Token::new("käisin").with_analysis("käima", "V", "sin"),
                Token::new("lähen").with_analysis("minema", "V", "n"),
                Token::new("oli").with_analysis("olema", "V", "s"),
                Token::new("maja").with_analysis("maja", "S", "sg n"),
            ],
            &Options::default(),
        );
        let tenses: Vec<_> = tokens.iter().map(|t| t.tense()).collect();
        assert_eq!(tenses, vec![Some(Tense::Past), Some(Tense::Present), Some(Tense::Past), None]);
    }
}
