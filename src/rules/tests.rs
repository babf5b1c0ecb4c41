use crate::rules::helpers::{amount, unit_class};
use crate::rules::{default_merge_rules, default_rules, rules_months};
use crate::semantics::{AnchorSpec, SearchDirection, SemanticInstruction as I, TimexType, Value};
use crate::{Context, NumeralValue, Options, PatternElement, RuleSet, Timex, Token, WordPattern, tag, tag_with};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn w(text: &str, lemma: &str, pos: &str, form: &str) -> Token {
    Token::new(text).with_analysis(lemma, pos, form)
}

fn n(text: &str, lemma: &str, pos: &str, value: i64) -> Token {
    Token::new(text).with_analysis(lemma, pos, "sg n").with_numeral(NumeralValue::Integer(value))
}

fn run(tokens: Vec<Token>) -> Vec<Timex> {
    tag(tokens, &Context::default(), &Options::default()).timexes
}

#[test]
fn single_expression_values() {
    let cases: Vec<(&str, Vec<Token>)> = vec![
        ("2015-06-03", vec![w("kolmapäeval", "kolma_päev", "S", "sg ad")]),
        ("2015-06-01", vec![w("täna", "täna", "D", "")]),
        ("2015-05-31", vec![w("eile", "eile", "D", "")]),
        ("2015-06-02", vec![w("homme", "homme", "D", "")]),
        ("2015-W24", vec![w("järgmisel", "järgmine", "A", "sg ad"), w("nädalal", "nädal", "S", "sg ad")]),
        ("2015-05", vec![w("eelmisel", "eelmine", "A", "sg ad"), w("kuul", "kuu", "S", "sg ad")]),
        ("2016", vec![w("järgmisel", "järgmine", "A", "sg ad"), w("aastal", "aasta", "S", "sg ad")]),
        ("2015-06-05", vec![Token::new("5."), w("juunil", "juuni", "S", "sg ad")]),
        ("2014-12-24", vec![Token::new("24.12.2014")]),
        ("2015-06-03", vec![Token::new("2015-06-03")]),
        ("2015-06-01T14:00", vec![Token::new("kell"), Token::new("14")]),
        ("2015-06-03T14:00", vec![Token::new("3."), w("juunil", "juuni", "S", "sg ad"), Token::new("kell"), Token::new("14")]),
        ("2015-08", vec![w("augustis", "august", "S", "sg in")]),
        ("2015-SU", vec![w("suvel", "suvi", "S", "sg ad")]),
        ("2014-SU", vec![w("eelmisel", "eelmine", "A", "sg ad"), w("suvel", "suvi", "S", "sg ad")]),
        ("2015-Q2", vec![n("teises", "teine", "O", 2), w("kvartalis", "kvartal", "S", "sg in")]),
        ("2015-W23-WE", vec![w("nädalavahetusel", "nädala_vahetus", "S", "sg ad")]),
        ("2015-06-01TEV", vec![w("täna", "täna", "D", ""), w("õhtul", "õhtu", "S", "sg ad")]),
        ("19", vec![Token::new("XX"), w("sajandil", "sajand", "S", "sg ad")]),
        ("2009", vec![Token::new("'09")]),
        ("2015-05-30", vec![n("kaks", "kaks", "N", 2), w("päeva", "päev", "S", "sg p"), Token::new("tagasi")]),
        ("2015-06-03", vec![n("kahe", "kaks", "N", 2), w("päeva", "päev", "S", "sg g"), Token::new("pärast")]),
        (
            "2015-06-15",
            vec![
                w("juuni", "juuni", "S", "sg g"),
                n("kolmandal", "kolmas", "O", 3),
                w("esmaspäeval", "esmas_päev", "S", "sg ad"),
            ],
        ),
        ("P2D", vec![n("kaks", "kaks", "N", 2), w("päeva", "päev", "S", "sg p")]),
        ("PXD", vec![w("mitu", "mitu", "P", "sg n"), w("päeva", "päev", "S", "sg p")]),
    ];

    for (expected, tokens) in cases {
        let text: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
        let out = run(tokens);
        assert_eq!(out.len(), 1, "{text:?}: {out:?}");
        assert_eq!(out[0].value.as_deref(), Some(expected), "{text:?}");
    }
}

#[test]
fn duration_within_gets_implicit_endpoints() {
    let out = run(vec![n("kahe", "kaks", "N", 2), w("päeva", "päev", "S", "sg g"), Token::new("jooksul")]);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].kind, TimexType::Duration);
    assert_eq!(out[0].value.as_deref(), Some("P2D"));
    assert_eq!(out[0].text, "kahe päeva jooksul");
    assert_eq!((out[0].begin_point.as_deref(), out[0].end_point.as_deref()), (Some("t2"), Some("t3")));

    assert_eq!(out[1].value.as_deref(), Some("2015-06-01"));
    assert_eq!(out[2].value.as_deref(), Some("2015-06-03"));
    assert!(out[1].implicit && out[2].implicit);
    assert_eq!(out[1].text, "");
}

#[test]
fn last_duration_ends_at_the_reference() {
    let out = run(vec![
        w("viimase", "viimane", "A", "sg g"),
        n("kahe", "kaks", "N", 2),
        w("päeva", "päev", "S", "sg g"),
        Token::new("jooksul"),
    ]);
    let values: Vec<_> = out.iter().map(|t| t.value.clone().unwrap_or_default()).collect();
    assert_eq!(values, vec!["P2D", "2015-05-30", "2015-06-01"]);
}

#[test]
fn past_tense_verb_looks_back() {
    let out = run(vec![
        w("Koosolek", "koosolek", "S", "sg n"),
        w("oli", "olema", "V", "s"),
        w("kolmapäeval", "kolma_päev", "S", "sg ad"),
    ]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value.as_deref(), Some("2015-05-27"));
}

#[test]
fn longer_match_subsumes_the_bare_weekday() {
    let out = tag(
        vec![w("eelmisel", "eelmine", "A", "sg ad"), w("kolmapäeval", "kolma_päev", "S", "sg ad")],
        &Context::default(),
        &Options::default(),
    );
    assert_eq!(out.timexes.len(), 1);
    assert_eq!(out.timexes[0].value.as_deref(), Some("2015-05-27"));
    assert_eq!(out.timexes[0].text, "eelmisel kolmapäeval");

    let bare = out.candidates.iter().find(|c| c.rule == "<weekday>").unwrap();
    assert!(!bare.top_level);
    assert_eq!(bare.subsumed_by.as_deref(), Some("<dir> <weekday>"));
}

#[test]
fn august_after_a_name_is_vetoed() {
    let out = tag(
        vec![w("Juhan", "Juhan", "H", "sg n"), w("August", "August", "H", "sg n")],
        &Context::default(),
        &Options::default(),
    );
    assert!(out.timexes.is_empty());
    assert_eq!(out.metrics.vetoed, 1);
}

#[test]
fn month_range_is_split() {
    let out = run(vec![w("juunist", "juuni", "S", "sg el"), w("augustini", "august", "S", "sg ter")]);
    let values: Vec<_> = out.iter().map(|t| t.value.clone().unwrap_or_default()).collect();
    assert_eq!(values, vec!["P3M", "2015-06", "2015-08"]);
    assert_eq!(out[0].kind, TimexType::Duration);
    assert_eq!(out[0].begin_point.as_deref(), Some("t2"));
    assert_eq!(out[2].text, "augustini");
}

#[test]
fn hyphen_day_range_is_split() {
    let out = run(vec![Token::new("3.-5.").at(0), w("juunini", "juuni", "S", "sg ter").at(6)]);
    let values: Vec<_> = out.iter().map(|t| t.value.clone().unwrap_or_default()).collect();
    assert_eq!(values, vec!["P3D", "2015-06-03", "2015-06-05"]);
    assert_eq!(out[0].text, "3.-5. juunini");
    assert_eq!(out[1].text, "3.-");
}

#[test]
fn weekday_range_from_case_endings() {
    let out = run(vec![w("esmaspäevast", "esmas_päev", "S", "sg el"), w("reedeni", "reede", "S", "sg ter")]);
    let values: Vec<_> = out.iter().map(|t| t.value.clone().unwrap_or_default()).collect();
    assert_eq!(values, vec!["P5D", "2015-06-01", "2015-06-05"]);
}

#[test]
fn later_is_relative_to_the_previous_date() {
    let out = run(vec![
        Token::new("3."),
        w("juunil", "juuni", "S", "sg ad"),
        w("ja", "ja", "J", ""),
        n("kaks", "kaks", "N", 2),
        w("päeva", "päev", "S", "sg p"),
        Token::new("hiljem"),
    ]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].value.as_deref(), Some("2015-06-03"));
    assert_eq!(out[1].value.as_deref(), Some("2015-06-05"));
    assert!(out[1].temporal_function);
    assert_eq!(out[1].anchor_time_id.as_deref(), Some("t1"));
}

#[test]
fn absolute_dates_are_not_temporal_functions() {
    let out = run(vec![Token::new("24.12.2014")]);
    assert!(!out[0].temporal_function);
    assert_eq!(out[0].anchor_time_id, None);

    let out = run(vec![w("homme", "homme", "D", "")]);
    assert!(out[0].temporal_function);
    assert_eq!(out[0].anchor_time_id.as_deref(), Some(crate::REFERENCE_TID));
}

#[test]
fn sets_and_modifiers() {
    let out = run(vec![w("igal", "iga", "P", "sg ad"), w("esmaspäeval", "esmas_päev", "S", "sg ad")]);
    assert_eq!(out[0].kind, TimexType::Set);
    assert_eq!(out[0].value.as_deref(), Some("XXXX-WXX-1"));
    assert_eq!(out[0].quant.as_deref(), Some("EVERY"));

    let out = run(vec![w("juuni", "juuni", "S", "sg g"), w("alguses", "algus", "S", "sg in")]);
    assert_eq!(out[0].value.as_deref(), Some("2015-06"));
    assert_eq!(out[0].modifier.as_deref(), Some("START"));
}

#[test]
fn rule_names_are_unique() {
    let rules = default_rules();
    let names: HashSet<&str> = rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.len(), rules.len());
    assert!(!default_merge_rules().is_empty());
}

#[test]
fn next_and_previous_seasons_leave_the_current_one() {
    let cases: Vec<(&str, Vec<Token>)> = vec![
        ("2016-SU", vec![w("järgmisel", "järgmine", "A", "sg ad"), w("suvel", "suvi", "S", "sg ad")]),
        ("2014-SU", vec![w("eelmisel", "eelmine", "A", "sg ad"), w("suvel", "suvi", "S", "sg ad")]),
        ("2015-WI", vec![w("järgmisel", "järgmine", "A", "sg ad"), w("talvel", "talv", "S", "sg ad")]),
        ("2014-WI", vec![w("eelmisel", "eelmine", "A", "sg ad"), w("talvel", "talv", "S", "sg ad")]),
        ("2015-FA", vec![w("järgmisel", "järgmine", "A", "sg ad"), w("sügisel", "sügis", "S", "sg ad")]),
        ("2015-SP", vec![w("eelmisel", "eelmine", "A", "sg ad"), w("kevadel", "kevad", "S", "sg ad")]),
    ];

    for (expected, tokens) in cases {
        let text: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
        let out = run(tokens);
        assert_eq!(out.len(), 1, "{text:?}: {out:?}");
        assert_eq!(out[0].value.as_deref(), Some(expected), "{text:?}");
    }
}

#[test]
fn same_day_looks_both_ways() {
    let out = run(vec![
        w("samal", "sama", "P", "sg ad"),
        w("päeval", "päev", "S", "sg ad"),
        w("kui", "kui", "J", ""),
        Token::new("3."),
        w("juunil", "juuni", "S", "sg ad"),
    ]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].value.as_deref(), Some("2015-06-03"));
    assert_eq!(out[0].anchor_time_id.as_deref(), Some("t2"));
    assert_eq!(out[1].value.as_deref(), Some("2015-06-03"));
}

/// "samal päeval" pointing forward to "kaks päeva hiljem", which itself hangs
/// on "3. juunil".
fn forward_chain_rules() -> RuleSet {
    let same_as_later = rule! {
        name: "sama <unit> (LATER)",
        pattern: [
            lemma!["sama"],
            unit_class(|g| I::add(g, Value::int(0)).anchored(AnchorSpec::backward("LATER").towards(SearchDirection::Forward))),
        ],
        kind: TimexType::Date,
        markers: ["SAME"],
    };
    let later = rule! {
        name: "<num> <unit> hiljem",
        pattern: [
            PatternElement::from(amount()).labeled("NUM"),
            unit_class(|g| I::add(g, Value::reference("NUM")).anchored(AnchorSpec::backward("DATE"))),
            WordPattern::literal(&["hiljem"]),
        ],
        kind: TimexType::Date,
        markers: ["DATE", "LATER"],
    };
    RuleSet::new(vec![rules_months::rule_day_month(), same_as_later, later], vec![])
}

fn forward_chain_tokens() -> Vec<Token> {
    vec![
        Token::new("3."),
        w("juunil", "juuni", "S", "sg ad"),
        w("ja", "ja", "J", ""),
        w("samal", "sama", "P", "sg ad"),
        w("päeval", "päev", "S", "sg ad"),
        w("ehk", "ehk", "J", ""),
        n("kaks", "kaks", "N", 2),
        w("päeva", "päev", "S", "sg p"),
        Token::new("hiljem"),
    ]
}

#[test]
fn forward_anchor_waits_for_its_own_anchor() {
    let out = tag_with(forward_chain_tokens(), &forward_chain_rules(), &Context::default(), &Options::default()).timexes;
    let values: Vec<_> = out.iter().map(|t| (t.text.as_str(), t.value.clone().unwrap_or_default())).collect();
    assert_eq!(
        values,
        vec![
            ("3. juunil", "2015-06-03".to_string()),
            ("samal päeval", "2015-06-05".to_string()),
            ("kaks päeva hiljem", "2015-06-05".to_string()),
        ]
    );
    assert_eq!(out[1].anchor_time_id.as_deref(), Some("t3"));
    assert_eq!(out[2].anchor_time_id.as_deref(), Some("t1"));
}

#[test]
fn repeated_runs_are_identical() {
    let tokens = || {
        let mut tokens = forward_chain_tokens();
        tokens.extend([w("juunist", "juuni", "S", "sg el"), w("augustini", "august", "S", "sg ter")]);
        tokens
    };
    let rules = forward_chain_rules();
    let first = tag_with(tokens(), &rules, &Context::default(), &Options::default());
    let second = tag_with(tokens(), &rules, &Context::default(), &Options::default());
    assert_eq!(first.timexes, second.timexes);
    assert_eq!(first.candidates, second.candidates);

    let builtin = || {
        vec![
            w("eelmisel", "eelmine", "A", "sg ad"),
            w("kolmapäeval", "kolma_päev", "S", "sg ad"),
            w("ja", "ja", "J", ""),
            n("kaks", "kaks", "N", 2),
            w("päeva", "päev", "S", "sg p"),
            Token::new("hiljem"),
        ]
    };
    let first = tag(builtin(), &Context::default(), &Options::default());
    let second = tag(builtin(), &Context::default(), &Options::default());
    assert_eq!(first.timexes, second.timexes);
    assert_eq!(first.candidates, second.candidates);
}
