//! Property-based testing support with arbitrary generators.
//!
//! This module provides proptest strategies for generating arbitrary
//! termpose trees to test parser/printer invariants.

use proptest::prelude::*;

use crate::term::Term;

/// Text that prints bare: no whitespace or structural characters.
fn bare_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.'-]{1,12}"
}

/// Text that needs quoting or escaping somewhere.
fn awkward_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z :\"\\\\]{1,10}",
        "[a-z \t]{0,6}\n[a-z]{1,6}",
    ]
}

/// Multi-line text, sometimes shaped like a block quote and sometimes not.
fn multiline_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("( {0,3})[a-z]{1,8}( [a-z]{1,5})?|", 2..5).prop_map(|lines| lines.join("\n"))
}

/// Generate arbitrary atom text.
pub fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => bare_text_strategy(),
        2 => awkward_text_strategy(),
        1 => multiline_text_strategy(),
    ]
}

/// Generate an arbitrary tree.
pub fn arb_term() -> impl Strategy<Value = Term> {
    let leaf = arb_text().prop_map(Term::atom);
    leaf.prop_recursive(4, 48, 5, |inner| {
        (arb_text(), prop::collection::vec(inner, 1..5))
            .prop_map(|(head, children)| Term::form(head, children))
    })
}

/// Generate an arbitrary document root: an empty head over top-level items.
pub fn arb_document() -> impl Strategy<Value = Term> {
    prop::collection::vec(arb_term(), 1..4).prop_map(|items| Term::form("", items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format, PrintConfig};
    use crate::{parse, parse_single};

    proptest! {
        /// Printing then parsing gives back the same document.
        #[test]
        fn print_parse_round_trip(doc in arb_document()) {
            let printed = doc.pretty_print();
            let reparsed = parse(&printed);
            prop_assert!(reparsed.is_ok(), "Failed to parse:\n{}\nError: {:?}", printed, reparsed.err());
            prop_assert_eq!(reparsed.unwrap(), doc);
        }

        /// A single non-root term round-trips through `parse_single`.
        #[test]
        fn single_term_round_trip(term in arb_term()) {
            prop_assume!(!term.head().is_empty());
            let printed = term.pretty_print();
            prop_assert_eq!(parse_single(&printed).unwrap(), term);
        }

        /// Printing is idempotent: print(parse(print(x))) == print(x).
        #[test]
        fn print_idempotent(doc in arb_document()) {
            let once = doc.pretty_print();
            let twice = parse(&once).unwrap().pretty_print();
            prop_assert_eq!(once, twice);
        }

        /// The round trip holds for other indentation and width settings.
        #[test]
        fn round_trip_with_spaces_and_narrow_width(doc in arb_document(), width in 4usize..40) {
            let config = PrintConfig::default().with_spaces(2).with_max_width(width);
            let printed = format(&doc, &config);
            prop_assert_eq!(parse(&printed).unwrap(), doc);
        }
    }
}
