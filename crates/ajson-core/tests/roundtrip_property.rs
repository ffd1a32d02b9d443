//! Property tests: printing a parsed tree and reparsing the output
//! yields an equal tree

use std::fmt::Write as _;

use ajson_rs::prelude::*;
use proptest::prelude::*;

/// Generated document shape, rendered to JSON text by [`render`].
#[derive(Debug, Clone)]
enum Doc {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Doc>),
    Map(Vec<(String, Doc)>),
}

// Numbers are kept to a bounded integer part plus at most one fraction
// digit so the accumulate-and-divide parse is stable under reprinting.
fn number_strategy() -> impl Strategy<Value = Doc> {
    (-10_000i32..10_000, proptest::option::of(0u8..10)).prop_map(|(int, frac)| {
        let mut n = f64::from(int.abs()) + frac.map_or(0.0, |f| f64::from(f) / 10.0);
        if int < 0 {
            n = -n;
        }
        Doc::Number(n)
    })
}

fn doc_strategy() -> impl Strategy<Value = Doc> {
    let leaf = prop_oneof![
        Just(Doc::Null),
        any::<bool>().prop_map(Doc::Bool),
        number_strategy(),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Doc::Text),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Doc::List),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..5).prop_map(Doc::Map),
        ]
    })
}

fn root_strategy() -> impl Strategy<Value = Vec<(String, Doc)>> {
    prop::collection::vec(("[a-z]{1,6}", doc_strategy()), 0..6)
}

fn render(doc: &Doc, out: &mut String) {
    match doc {
        Doc::Null => out.push_str("null"),
        Doc::Bool(true) => out.push_str("true"),
        Doc::Bool(false) => out.push_str("false"),
        Doc::Number(n) => {
            let _ = write!(out, "{n}");
        }
        // The generated charset needs no escaping
        Doc::Text(s) => {
            let _ = write!(out, "\"{s}\"");
        }
        Doc::List(elements) => {
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(element, out);
            }
            out.push(']');
        }
        Doc::Map(fields) => {
            out.push('{');
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "\"{name}\":");
                render(value, out);
            }
            out.push('}');
        }
    }
}

fn render_root(fields: &[(String, Doc)]) -> String {
    let mut out = String::new();
    render(&Doc::Map(fields.to_vec()), &mut out);
    out
}

proptest! {
    #[test]
    fn prop_compact_print_reparses_equal(fields in root_strategy()) {
        let text = render_root(&fields);

        let (first, first_state) = parse(&text);
        let first = first.expect("generated document must parse");
        let printed = compact(first_state.value(first));

        let (second, second_state) = parse(&printed);
        let second = second.expect("printed document must reparse");
        prop_assert!(first_state.value(first).equals(second_state.value(second)));
    }

    #[test]
    fn prop_pretty_print_reparses_equal(fields in root_strategy()) {
        let text = render_root(&fields);

        let (first, first_state) = parse(&text);
        let first = first.expect("generated document must parse");
        let printed = pretty(first_state.value(first));

        let (second, second_state) = parse(&printed);
        let second = second.expect("pretty output must reparse");
        prop_assert!(first_state.value(first).equals(second_state.value(second)));
    }

    #[test]
    fn prop_root_length_matches_field_count(fields in root_strategy()) {
        let text = render_root(&fields);
        let (root, state) = parse(&text);
        let root = state.value(root.expect("generated document must parse"));
        prop_assert_eq!(root.len(), fields.len());
    }

    #[test]
    fn prop_reuse_parses_like_fresh(fields in root_strategy()) {
        let text = render_root(&fields);
        let config = ParserConfig::default();

        let (fresh, fresh_state) = parse_with(&text, config.clone(), None);
        let (warm, warm_state) = parse_with(
            r#"{"warmup": [1, 2, 3]}"#,
            config.clone(),
            None,
        );
        prop_assert!(warm.is_some());
        let (reused, reused_state) = parse_with(&text, config, Some(warm_state));

        let fresh = fresh.expect("generated document must parse");
        let reused = reused.expect("reused state must parse the same text");
        prop_assert!(fresh_state.value(fresh).equals(reused_state.value(reused)));
    }
}
