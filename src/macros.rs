#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Whole-token regular expression element.
#[macro_export]
macro_rules! re {
    ($pat:expr) => {
        $crate::WordPattern::regex($pat)
    };
}

/// Lemma set element: `lemma!["eile", "täna"]`.
#[macro_export]
macro_rules! lemma {
    ($($alt:expr),+ $(,)?) => {
        $crate::WordPattern::lemma(&[$($alt),+])
    };
}

/// Literal (normalized, case-insensitive) text element.
#[macro_export]
macro_rules! lit {
    ($($alt:expr),+ $(,)?) => {
        $crate::WordPattern::literal(&[$($alt),+])
    };
}

/// Declarative rule builder.
///
/// ```ignore
/// rule! {
///     name: "<weekday>",
///     pattern: [weekday_class()],
///     kind: TimexType::Date,
///     semantics: [SemanticInstruction::seek(..)],
///     markers: ["DATE"],
/// }
/// ```
///
/// Filtered semantic blocks and attributes are added with the `Rule` builder
/// methods on the returned value.
#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        pattern: [ $($el:expr),* $(,)? ]
        $(, kind: $kind:expr)?
        $(, semantics: [ $($sem:expr),* $(,)? ])?
        $(, markers: [ $($marker:expr),* $(,)? ])?
        $(, negative: [ $($neg:expr),* $(,)? ])?
        $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut rule = $crate::Rule::new($name, vec![ $($crate::PatternElement::from($el)),* ]);
        $( rule = rule.kind($kind); )?
        $( rule = rule.semantics(vec![ $($sem),* ]); )?
        $( $( rule = rule.marker($marker); )* )?
        $( $( rule = rule.negative($neg); )* )?
        rule
    }};
}
