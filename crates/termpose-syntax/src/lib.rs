//! Termpose syntax: tree model, parser and printer.
//!
//! This crate provides:
//! - [`Term`], the tree every termpose document parses into
//! - An indentation-driven parser with block quotes and `tag:value` sugar
//! - A canonical printer whose output always parses back to the same tree
//! - Source span tracking for error reporting
//!
//! # Example
//!
//! ```
//! use termpose_syntax::{parse, Term};
//!
//! let source = "hammer cost:5\n";
//!
//! let root = parse(source).unwrap();
//! let hammer = &root.children()[0];
//! assert_eq!(hammer.head(), "hammer");
//! assert_eq!(hammer.find_child("cost").unwrap().children()[0], Term::atom("5"));
//! assert_eq!(root.pretty_print(), source);
//! ```

pub mod format;
pub mod parser;
pub mod span;
pub mod term;

#[cfg(test)]
mod proptest_support;

pub use format::{escape, format, PrintConfig};
pub use parser::{parse, parse_single, ParseError, ParseErrorKind, ParseResult, Parser};
pub use span::Span;
pub use term::Term;
