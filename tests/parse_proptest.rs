//! Property-based tests for parsing and flattening
//!
//! Templates are assembled from fragments so that most generated inputs are well formed,
//! while still covering chains, nesting and the escape sequence.

use gillette::emit::flatten;
use gillette::{parse, Instruction, Node};
use proptest::prelude::*;

/// Content without sigils that cannot start the RTF marker
fn plain_text() -> impl Strategy<Value = String> {
    "[^@{][^@]{0,40}"
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("text ".to_string()),
        Just(" ".to_string()),
        Just("@Name".to_string()),
        Just("@Model.Items.Count!".to_string()),
        Just("@(a + b)".to_string()),
        Just("@@".to_string()),
        Just("@{ x(); }".to_string()),
        Just("@if (c) {y}".to_string()),
        Just("else".to_string()),
        Just(", ".to_string()),
        Just("(".to_string()),
        Just("}".to_string()),
        Just("@".to_string()),
        Just("@(".to_string()),
    ]
}

fn template() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..8).prop_map(|parts| parts.concat())
}

/// Well-formed templates with arbitrarily nested named blocks
fn nested_template() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just(String::new()),
        Just("text".to_string()),
        Just("@value".to_string()),
        Just("@{ stmt; }".to_string()),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|parts| parts.join(" ")),
            inner
                .clone()
                .prop_map(|body| format!("@foreach (var x in xs) {{{}}}", body)),
            (inner.clone(), inner)
                .prop_map(|(a, b)| format!("@if (a) {{{}}} else {{{}}}", a, b)),
        ]
    })
}

/// Parenthesized expressions with balanced inner parentheses
fn balanced_expression() -> impl Strategy<Value = String> {
    let leaf = "[a-z0-9 +*.,]{0,5}";
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop::collection::vec(
            prop_oneof![inner.clone(), inner.prop_map(|e| format!("({})", e))],
            1..4,
        )
        .prop_map(|parts| parts.concat())
    })
}

proptest! {
    #[test]
    fn test_text_without_sigil_is_one_literal(text in plain_text()) {
        let tree = parse(&text).unwrap();
        prop_assert_eq!(tree, Node::literal("content", &text));
    }

    #[test]
    fn test_escape_prefix(rest in template()) {
        prop_assume!(!rest.starts_with('@') && !rest.starts_with('{'));

        let escaped = format!("@@{}", rest);
        match (parse(&rest), parse(&escaped)) {
            (Ok(plain), Ok(with_escape)) => {
                let mut expected = vec![Instruction::AppendLiteral("@".to_string())];
                expected.extend(flatten(&plain));
                prop_assert_eq!(flatten(&with_escape), expected);
            }
            (Err(_), Err(_)) => {}
            (plain, with_escape) => prop_assert!(
                false,
                "{:?} gave {:?} but {:?} gave {:?}",
                rest, plain, escaped, with_escape
            ),
        }
    }

    #[test]
    fn test_unambiguous_expression_captures_inner_text(expr in balanced_expression()) {
        let tree = parse(&format!("@({})", expr)).unwrap();
        prop_assert_eq!(tree, Node::value("expression", &expr));
    }

    #[test]
    fn test_chains_are_siblings(
        first in "[a-z]{2,8}",
        second in "[a-z]{2,8}",
        cond in "[a-z]{1,6}",
        body in "[a-z]{0,8}",
        second_sigil in any::<bool>(),
    ) {
        let sigil = if second_sigil { "@" } else { "" };
        let template = format!("@{} ({}) {{{}}} {}{} {{{}}}", first, cond, body, sigil, second, body);
        let tree = parse(&template).unwrap();
        let header = format!("({})", cond);

        let children = tree.children();
        prop_assert_eq!(children.len(), 2);
        prop_assert_eq!(children[0].name(), first.as_str());
        prop_assert_eq!(children[0].text(), Some(header.as_str()));
        prop_assert_eq!(children[1].name(), second.as_str());
        prop_assert_eq!(children[1].text(), Some(""));
    }

    #[test]
    fn test_dangling_inner_brace_always_fails(a in "[a-z ;=]{0,8}", b in "[a-z ;=]{0,8}") {
        let template = format!("@{{{}{{{}}}", a, b);
        prop_assert!(parse(&template).is_err(), "{:?} parsed", template);
    }

    #[test]
    fn test_dangling_inner_paren_always_fails(
        a in "[a-z ,.+]{0,8}",
        b in "[a-z ,.+]{0,8}",
        call in any::<bool>(),
    ) {
        let head = if call { "@f(" } else { "@(" };
        let template = format!("{}{}({})", head, a, b);
        prop_assert!(parse(&template).is_err(), "{:?} parsed", template);
    }

    #[test]
    fn test_blocks_are_balanced(template in nested_template()) {
        let tree = parse(&template).unwrap();
        let mut depth = 0isize;
        for instruction in flatten(&tree) {
            depth += instruction.depth_delta();
            prop_assert!(depth >= 0, "close before open in {:?}", template);
        }
        prop_assert_eq!(depth, 0);
    }

    #[test]
    fn test_parse_never_panics(text in template()) {
        let _ = parse(&text);
    }
}
