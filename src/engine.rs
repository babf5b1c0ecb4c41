//! Tagging and resolution engine.
//!
//! The engine is split into focused submodules under `src/engine/`; this file
//! only wires them together and re-exports the public surface.
//!
//! ## How the parts work together
//!
//! ```text
//! tokens ── prepare (input.rs)
//!             - normalize surface, parse numerals, verb tense
//!             - split `8-10` into `8-` + `10`
//!                 │
//!                 v
//! rules ──── Rule::extract (pattern/)     one automaton per rule
//!             - dedup via CandidateKey (dedup.rs)
//!             - push into the Arena (candidate.rs)
//!                 │
//!                 v
//!            eliminate (overlap.rs)       subsumed candidates detached
//!            merge_adjacent (merge.rs)    phrases + ranges, fixpoint
//!            anchor_all (anchor.rs)       verbs + sibling expressions
//!                 │
//!                 v
//!            Resolver (resolve.rs)        pass 1: independent trees
//!                                         pass 2: anchored trees
//!            split_all (split.rs)         pass 3: ranges, implicit endpoints
//!                 │
//!                 v
//!            emit (timex.rs)  ──▶  Vec<Timex>
//! ```
//!
//! ## Responsibilities by module
//!
//! - `input.rs`: turns caller tokens into the internal token stream.
//! - `candidate.rs`: the candidate arena; relations are ids, never references.
//! - `dedup.rs`: stable keys so alternative derivations of one match collapse.
//! - `overlap.rs`, `merge.rs`, `anchor.rs`: structure between candidates.
//! - `resolve.rs`, `split.rs`: values.
//! - `timex.rs`: output records.
//! - `tagger.rs`: the run object orchestrating all of the above.
//! - `metrics.rs`: per-run timings and counters.
//!
//! ## Debugging
//!
//! Every stage emits `tracing` events: `debug` for decisions (rule fired,
//! candidate vetoed, subsumed, merged, anchored, resolved, split), `trace`
//! for the details behind them. The binary installs no subscriber; library
//! users attach their own.

#[path = "engine/anchor.rs"]
mod anchor;
#[path = "engine/candidate.rs"]
mod candidate;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/input.rs"]
mod input;
#[path = "engine/merge.rs"]
mod merge;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/overlap.rs"]
mod overlap;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/split.rs"]
mod split;
#[path = "engine/tagger.rs"]
mod tagger;
#[path = "engine/timex.rs"]
mod timex;

pub use candidate::Stage;
pub(crate) use input::normalize_surface;
pub use metrics::{CandidateSummary, RunMetrics, RunResult};
pub use tagger::Tagger;
pub use timex::{REFERENCE_TID, Timex};
