//! Error types for checking and termifying.

use termpose_syntax::{escape, ParseError, Span, Term};
use thiserror::Error;

/// The ways a term can fail to match a checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckErrorKind {
    /// A form was given where a single atom was required.
    #[error("expected an atom, found a form with {children} children")]
    ExpectedAtom { children: usize },

    /// A fixed-head form had a different head.
    #[error("expected head `{expected}`, found `{found}`")]
    HeadMismatch { expected: String, found: String },

    /// No child carried the tag.
    #[error("missing required tag `{tag}`")]
    MissingTag { tag: String },

    /// The tag was present with nothing under it.
    #[error("tag `{tag}` has no value")]
    MissingTagValue { tag: String },

    /// Fewer items than a record has positional fields.
    #[error("expected at least {expected} items, found {found}")]
    WrongArity { expected: usize, found: usize },

    /// A pair without exactly two items.
    #[error("expected exactly {expected} items, found {found}")]
    WrongLength { expected: usize, found: usize },

    /// An item no field of the record claimed.
    #[error("unexpected extra item")]
    UnexpectedChild,

    /// Text that does not follow the literal grammar of the target type.
    #[error("`{text}` is not a valid {expected}")]
    InvalidLiteral { expected: &'static str, text: String },

    /// A well-formed number outside the target type's range.
    #[error("`{text}` does not fit in {expected}")]
    OutOfRange { expected: &'static str, text: String },
}

/// A term did not have the shape a checker expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {checker}: {kind}, found `{found}`{}", at_path(.path))]
pub struct CheckError {
    /// What went wrong; boxed to keep `Result<T, CheckError>` small.
    pub kind: Box<CheckErrorKind>,
    /// Description of the checker that rejected the term.
    pub checker: String,
    /// Short rendering of the offending term.
    pub found: String,
    /// Where the offending term came from.
    pub span: Span,
    /// Breadcrumbs from the outermost checker inward, e.g. `products[1]`, `cost`.
    pub path: Vec<String>,
}

impl CheckError {
    /// `checker` rejected `term`.
    pub fn new(kind: CheckErrorKind, checker: impl Into<String>, term: &Term) -> Self {
        let checker = checker.into();
        tracing::trace!(%checker, %kind, span = %term.span(), "check failed");
        Self {
            kind: Box::new(kind),
            checker,
            found: summarize(term),
            span: term.span(),
            path: Vec::new(),
        }
    }

    /// Record that the failure happened inside `segment`.
    #[must_use]
    pub fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Dotted breadcrumb path, e.g. `products[1].cost`.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

fn at_path(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {}", path.join("."))
    }
}

const SUMMARY_CHARS: usize = 40;

/// The term on one line, cut off after [`SUMMARY_CHARS`].
///
/// Children of the term itself are separated by spaces; deeper single-child
/// forms are written as `tag:value` chains.
fn summarize(term: &Term) -> String {
    let mut out = escape(term.head());
    let mut pending = vec![(term.children().iter(), ' ')];
    while out.chars().count() <= SUMMARY_CHARS {
        let Some((siblings, separator)) = pending.last_mut() else {
            return out;
        };
        let separator = *separator;
        let Some(next) = siblings.next() else {
            pending.pop();
            continue;
        };
        out.push(separator);
        out.push_str(&escape(next.head()));
        let inner = if next.children().len() == 1 { ':' } else { ' ' };
        pending.push((next.children().iter(), inner));
    }
    let mut short: String = out.chars().take(SUMMARY_CHARS).collect();
    short.push_str("...");
    short
}

/// A value could not be written back as a term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermifyError {
    #[error("{checker}: cannot write non-finite number `{value}`")]
    NonFinite { checker: String, value: String },
}

/// Any failure on the way between text and typed values.
#[derive(Debug, Error)]
pub enum TermposeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Termify(#[from] TermifyError),
}
