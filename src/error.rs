//! Typed failures.
//!
//! Almost nothing in the tagger is allowed to fail loudly: malformed rule
//! elements degrade to inert predicates and unresolvable candidates simply
//! stay unresolved. The few places that *do* report an error use these enums
//! so callers (rule loaders, the CLI) can surface a readable message.

use thiserror::Error;

/// Problems found while building a rule element from external definitions.
///
/// The builders never return these to the engine: a pattern that fails to
/// build is replaced by a never-matching one and the error is only logged.
/// Loaders that want to report bad rule files can call the `try_*`
/// constructors directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A word or negative pattern regex did not compile.
    #[error("invalid regular expression `{pattern}`: {message}")]
    Regex { pattern: String, message: String },

    /// A morphological filter had no usable feature alternative.
    #[error("malformed morphological filter `{0}`")]
    Filter(String),

    /// A granularity name was not recognised.
    #[error("unknown granularity `{0}`")]
    Granularity(String),
}

/// Problems computing or constructing calendar values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A calendar point has no field with any representation at all.
    #[error("calendar point has no field with a representation")]
    Unset,

    /// A duration has neither a concrete nor a fuzzy component.
    #[error("duration has no known or fuzzy component")]
    EmptyDuration,

    /// A reference field was neither digits, an `X` mask, nor empty.
    #[error("invalid {field} field `{value}`")]
    Field { field: &'static str, value: String },

    /// The reference fields parsed but do not name a real date.
    #[error("reference date {0} does not exist")]
    Date(String),
}
