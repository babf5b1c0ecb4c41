//! Pattern layer: word patterns, the phrase automaton, rules and merge rules.
//!
//! ```text
//! WordPattern ──(one per element)──▶ PhrasePattern (NFA over tokens)
//!                                        │ PhraseMatch
//!                                        ▼
//!                          Rule: negative patterns ─▶ veto
//!                                filters ─▶ gated semantics + markers
//!                                        │ RawCandidate
//!                                        ▼
//!                              engine (overlap, merge, resolve)
//! ```
//!
//! Everything here is immutable once built and safe to share between runs;
//! per-run state (live paths, memo tables) lives on the stack of
//! [`PhrasePattern::scan`].
//!
//! Construction never fails: an element that cannot be built (bad regex,
//! empty filter) becomes permanently inert and a `tracing` warning is emitted.

#[path = "pattern/automaton.rs"]
mod automaton;
#[path = "pattern/merge.rs"]
mod merge;
#[path = "pattern/numeral.rs"]
mod numeral;
#[path = "pattern/rule.rs"]
mod rule;
#[path = "pattern/word.rs"]
mod word;

pub use automaton::{PatternElement, PhraseMatch, PhrasePattern};
pub use merge::{MergeKind, MergeRule};
pub use numeral::NumeralKind;
pub use rule::{FeatureSpec, Filter, NegativePattern, Rule, RuleSemantics, SubPart};
pub use word::{Verdict, WordMatch, WordPattern};

pub(crate) use rule::{Extraction, RawCandidate};
