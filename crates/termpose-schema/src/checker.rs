//! The [`Checker`] trait and the positional view shared by the combinators.

use termpose_syntax::Term;

use crate::error::{CheckError, CheckErrorKind, TermifyError};

/// A bidirectional converter between terms and values of type `T`.
///
/// `check` reads a term into a value, `termify` writes a value back as a term.
/// For every value `v` a checker accepts, `check(termify(v)) == v`.
pub trait Checker<T> {
    /// Read a value out of `term`.
    fn check(&self, term: &Term) -> Result<T, CheckError>;

    /// Write `value` as a term.
    fn termify(&self, value: &T) -> Result<Term, TermifyError>;

    /// Short description used in error messages.
    fn describe(&self) -> String;

    /// The tag this checker looks for when used as a record field.
    ///
    /// Checkers that return `None` consume positional items instead.
    fn tag(&self) -> Option<&str> {
        None
    }

    /// Check a field that a record has already matched by tag.
    fn check_tagged(&self, field: &Term) -> Result<T, CheckError> {
        self.check(field)
    }
}

/// Positional items of a term, with bookkeeping for which ones a record has
/// claimed.
pub(crate) struct RecordScan<'t> {
    term: &'t Term,
    head: Option<Term>,
    claimed: Vec<bool>,
    cursor: usize,
}

impl<'t> RecordScan<'t> {
    pub(crate) fn new(term: &'t Term) -> Self {
        let head = (!term.head().is_empty()).then(|| Term::atom(term.head()).with_span(term.span()));
        let len = term.children().len() + usize::from(head.is_some());
        Self {
            term,
            head,
            claimed: vec![false; len],
            cursor: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.claimed.len()
    }

    pub(crate) fn item(&self, index: usize) -> &Term {
        match &self.head {
            Some(head) if index == 0 => head,
            Some(_) => &self.term.children()[index - 1],
            None => &self.term.children()[index],
        }
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = &Term> + '_ {
        (0..self.len()).map(|i| self.item(i))
    }

    /// Fail unless there are at least `expected` items.
    pub(crate) fn require(&self, expected: usize, checker: &str) -> Result<(), CheckError> {
        if self.len() < expected {
            return Err(CheckError::new(
                CheckErrorKind::WrongArity {
                    expected,
                    found: self.len(),
                },
                checker,
                self.term,
            ));
        }
        Ok(())
    }

    /// Take the next positional item.
    pub(crate) fn next_positional(&mut self) -> usize {
        let at = self.cursor;
        self.cursor += 1;
        self.claimed[at] = true;
        at
    }

    /// Claim the first unclaimed item at or after `from` whose head is `tag`.
    pub(crate) fn claim(&mut self, tag: &str, from: usize) -> Option<usize> {
        let at = (from..self.len()).find(|&i| !self.claimed[i] && self.item(i).head() == tag)?;
        self.claimed[at] = true;
        Some(at)
    }

    pub(crate) fn missing_tag(&self, tag: &str, checker: &str) -> CheckError {
        CheckError::new(CheckErrorKind::MissingTag { tag: tag.to_string() }, checker, self.term)
    }

    /// Fail on the first item nobody claimed.
    pub(crate) fn finish(&self, checker: &str) -> Result<(), CheckError> {
        match self.claimed.iter().position(|claimed| !claimed) {
            Some(at) => Err(
                CheckError::new(CheckErrorKind::UnexpectedChild, checker, self.item(at)).within(format!("#{at}")),
            ),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termpose_syntax::parse_single;

    #[test]
    fn head_is_the_first_item() {
        let t = parse_single("hammer cost:5").unwrap();
        let scan = RecordScan::new(&t);
        assert_eq!(scan.len(), 2);
        assert_eq!(scan.item(0), &Term::atom("hammer"));
        assert_eq!(scan.item(1).head(), "cost");
    }

    #[test]
    fn empty_head_is_skipped() {
        let t = Term::form("", vec!["a".into(), "b".into()]);
        let scan = RecordScan::new(&t);
        let heads: Vec<_> = scan.items().map(Term::head).collect();
        assert_eq!(heads, ["a", "b"]);
    }

    #[test]
    fn claims_skip_the_positional_prefix() {
        let t = parse_single("cost cost:1 cost:2").unwrap();
        let mut scan = RecordScan::new(&t);
        assert_eq!(scan.next_positional(), 0);
        assert_eq!(scan.claim("cost", 1), Some(1));
        assert_eq!(scan.claim("cost", 1), Some(2));
        assert_eq!(scan.claim("cost", 1), None);
        assert!(scan.finish("record").is_ok());
    }

    #[test]
    fn leftovers_are_reported_with_position() {
        let t = parse_single("hammer extra").unwrap();
        let mut scan = RecordScan::new(&t);
        scan.next_positional();
        let err = scan.finish("record").unwrap_err();
        assert_eq!(*err.kind, CheckErrorKind::UnexpectedChild);
        assert_eq!(err.path, ["#1"]);
        assert_eq!(err.found, "extra");
    }
}
