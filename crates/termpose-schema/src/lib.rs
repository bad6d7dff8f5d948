//! Bidirectional checkers between termpose trees and typed values.
//!
//! A [`Checker`] reads a [`Term`](termpose_syntax::Term) into a value and
//! writes the value back. Checkers compose: [`ensure_tag`] finds a named
//! field, [`tagged_sequence`] reads a list under a fixed head, and
//! [`combine_trans`] assembles a record from positional and tagged fields.
//!
//! # Example
//!
//! ```
//! use termpose_schema::{combine_trans, ensure_tag, numeric, tagged_sequence, text, Checker};
//! use termpose_syntax::parse_single;
//!
//! let source = "products\n\thammer cost:5 description\"\n\t\tpremium hammer. great for smashing\n";
//!
//! let products = tagged_sequence(
//!     "products",
//!     combine_trans(
//!         |(name, cost, description): (String, f64, String)| (name, cost, description),
//!         |p: &(String, f64, String)| p.clone(),
//!         (text(), ensure_tag("cost", numeric()), ensure_tag("description", text())),
//!     ),
//! );
//!
//! let list = products.check(&parse_single(source).unwrap()).unwrap();
//! assert_eq!(list[0].0, "hammer");
//! assert_eq!(list[0].1, 5.0);
//! assert_eq!(list[0].2, "premium hammer. great for smashing");
//! ```

pub mod checker;
pub mod combine;
pub mod error;
pub mod primitive;
pub mod schema;
pub mod structure;

#[cfg(test)]
mod proptest_support;

pub use checker::Checker;
pub use combine::{combine_trans, CombineTrans, Fields};
pub use error::{CheckError, CheckErrorKind, TermifyError, TermposeError};
pub use primitive::{
    boolean, decimal, integer, numeric, text, Boolean, Decimal, DecimalChecker, Integer,
    IntegerChecker, Text,
};
pub use schema::{from_str, to_string, to_string_with, Schema};
pub use structure::{
    ensure_tag, map, pair, sequence, tagged_map, tagged_sequence, EnsureTag, Map, Pair, Sequence,
    TaggedMap, TaggedSequence,
};
