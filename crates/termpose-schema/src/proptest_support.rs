//! Property-based tests: every checker reads back what it writes.

use indexmap::IndexMap;
use proptest::prelude::*;

/// Text with spaces, quotes, colons, escapes and the occasional line break.
pub fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z0-9_.-]{1,10}",
        2 => "\\PC{0,16}",
        1 => "[a-z \t:\"\\\\]{0,8}(\n[a-z \t]{0,8}){1,3}",
    ]
}

/// Any finite `f64`, including subnormals and signed zero.
pub fn arb_finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

/// Small maps with awkward keys.
pub fn arb_map() -> impl Strategy<Value = IndexMap<String, i32>> {
    prop::collection::vec((arb_text(), any::<i32>()), 0..6).prop_map(|entries| entries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{combine_trans, decimal, ensure_tag, from_str, numeric, tagged_sequence, text, to_string, Checker};
    use termpose_syntax::{parse, parse_single};

    type Row = (String, f64, String);

    fn products() -> impl Checker<Vec<Row>> {
        tagged_sequence(
            "products",
            combine_trans(
                |row: Row| row,
                |row: &Row| row.clone(),
                (text(), ensure_tag("cost", numeric()), ensure_tag("description", text())),
            ),
        )
    }

    proptest! {
        #[test]
        fn text_round_trip(value in arb_text()) {
            let written = to_string(&value).unwrap();
            prop_assert_eq!(from_str::<String>(&written).unwrap(), value);
        }

        #[test]
        fn integer_round_trip(value in any::<i128>()) {
            prop_assert_eq!(from_str::<i128>(&to_string(&value).unwrap()).unwrap(), value);
        }

        #[test]
        fn decimal_round_trip(value in arb_finite()) {
            prop_assert_eq!(from_str::<f64>(&to_string(&value).unwrap()).unwrap(), value);
        }

        #[test]
        fn f32_round_trip(value in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
            let checker = decimal::<f32>();
            let printed = checker.termify(&value).unwrap().pretty_print();
            prop_assert_eq!(checker.check(&parse_single(&printed).unwrap()).unwrap(), value);
        }

        #[test]
        fn nested_list_round_trip(value in prop::collection::vec(prop::collection::vec(arb_text(), 0..4), 0..4)) {
            let written = to_string(&value).unwrap();
            prop_assert_eq!(from_str::<Vec<Vec<String>>>(&written).unwrap(), value);
        }

        #[test]
        fn map_round_trip(value in arb_map()) {
            let written = to_string(&value).unwrap();
            prop_assert_eq!(from_str::<IndexMap<String, i32>>(&written).unwrap(), value);
        }

        /// Records survive being printed and parsed back.
        #[test]
        fn records_round_trip(rows in prop::collection::vec((arb_text(), arb_finite(), arb_text()), 0..5)) {
            let checker = products();
            let printed = checker.termify(&rows).unwrap().pretty_print();
            prop_assert_eq!(parse(&printed).unwrap().children().len(), 1);
            let reparsed = parse_single(&printed).unwrap();
            prop_assert_eq!(checker.check(&reparsed).unwrap(), rows);
        }
    }
}
