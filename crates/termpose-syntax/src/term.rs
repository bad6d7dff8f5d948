//! The termpose tree model.
//!
//! Every node is a [`Term`]: a head text plus an ordered list of child terms.
//! A term without children is an *atom*; a term with children is a *form*.
//! Terms own their children outright and are read-only once built. Source
//! spans ride along for diagnostics but never take part in equality.

use std::fmt;

use crate::span::Span;

/// A termpose tree node.
#[derive(Debug, Clone)]
pub struct Term {
    head: String,
    children: Vec<Term>,
    span: Span,
}

impl Term {
    /// Create an atom: a leaf holding only text.
    #[must_use]
    pub fn atom(text: impl Into<String>) -> Self {
        Self {
            head: text.into(),
            children: Vec::new(),
            span: Span::dummy(),
        }
    }

    /// Create a form from a head and its children.
    ///
    /// A form built with no children is indistinguishable from an atom.
    #[must_use]
    pub fn form(head: impl Into<String>, children: Vec<Term>) -> Self {
        Self {
            head: head.into(),
            children,
            span: Span::dummy(),
        }
    }

    /// Rebuild a term from its contents: a leading non-empty atom becomes the
    /// head, everything else becomes children under an empty head.
    ///
    /// This is the inverse of [`Term::contents`].
    #[must_use]
    pub fn from_contents(mut items: Vec<Term>) -> Self {
        let leading_head = items
            .first()
            .is_some_and(|first| first.is_atom() && !first.head.is_empty());
        if leading_head {
            let first = items.remove(0);
            Self {
                head: first.head,
                children: items,
                span: first.span,
            }
        } else {
            Self::form("", items)
        }
    }

    /// Attach a source span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The head text.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.head
    }

    /// The ordered children.
    #[must_use]
    pub fn children(&self) -> &[Term] {
        &self.children
    }

    /// Whether this term is an atom (has no children).
    #[must_use]
    pub fn is_atom(&self) -> bool {
        self.children.is_empty()
    }

    /// Where this term came from; dummy for synthesized terms.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// 1-based line and column of the term's start.
    #[must_use]
    pub const fn line_and_column(&self) -> (u32, u32) {
        (self.span.start_line + 1, self.span.start_col + 1)
    }

    /// The first child whose head equals `head`.
    #[must_use]
    pub fn find_child(&self, head: &str) -> Option<&Term> {
        self.children.iter().find(|c| c.head == head)
    }

    /// Number of positional items seen by [`Term::contents`].
    #[must_use]
    pub fn contents_len(&self) -> usize {
        self.children.len() + usize::from(!self.head.is_empty())
    }

    /// The positional view of this term: the head as a leading atom (when
    /// non-empty) followed by the children.
    pub fn contents(&self) -> impl Iterator<Item = Term> + '_ {
        let head = (!self.head.is_empty()).then(|| Term::atom(self.head.clone()).with_span(self.span));
        head.into_iter().chain(self.children.iter().cloned())
    }

    /// Canonical termpose text with the default [`crate::PrintConfig`].
    #[must_use]
    pub fn pretty_print(&self) -> String {
        crate::format::format(self, &crate::format::PrintConfig::default())
    }

    /// Split into head and children, dropping the span.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Term>) {
        (self.head, self.children)
    }

    pub(crate) fn push_child(&mut self, child: Term) {
        self.children.push(child);
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.children == other.children
    }
}

impl Eq for Term {}

impl From<&str> for Term {
    fn from(text: &str) -> Self {
        Self::atom(text)
    }
}

impl From<String> for Term {
    fn from(text: String) -> Self {
        Self::atom(text)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}
