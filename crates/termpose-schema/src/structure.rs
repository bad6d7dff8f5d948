//! Combinators for tagged fields, sequences, pairs and maps.

use std::borrow::Cow;
use std::hash::Hash;

use indexmap::IndexMap;
use termpose_syntax::Term;

use crate::checker::{Checker, RecordScan};
use crate::error::{CheckError, CheckErrorKind, TermifyError};

fn head_mismatch(expected: &str, checker: String, term: &Term) -> CheckError {
    CheckError::new(
        CheckErrorKind::HeadMismatch {
            expected: expected.to_string(),
            found: term.head().to_string(),
        },
        checker,
        term,
    )
}

/// A value stored under a named tag, as in `cost:5`.
#[derive(Debug, Clone)]
pub struct EnsureTag<C> {
    tag: String,
    inner: C,
}

/// Look up the child tagged `tag` and check its value with `inner`.
///
/// On its own, the checker takes the first child whose head is `tag`. Inside
/// [`combine_trans`](crate::combine_trans) it becomes a named field that may
/// appear anywhere after the positional items. A tag with several values
/// hands them to `inner` as one form with an empty head.
pub fn ensure_tag<C>(tag: impl Into<String>, inner: C) -> EnsureTag<C> {
    EnsureTag {
        tag: tag.into(),
        inner,
    }
}

impl<T, C: Checker<T>> Checker<T> for EnsureTag<C> {
    fn check(&self, term: &Term) -> Result<T, CheckError> {
        let field = term.find_child(&self.tag).ok_or_else(|| {
            CheckError::new(
                CheckErrorKind::MissingTag { tag: self.tag.clone() },
                self.describe(),
                term,
            )
        })?;
        self.check_tagged(field)
    }

    fn check_tagged(&self, field: &Term) -> Result<T, CheckError> {
        let value = match field.children() {
            [] => {
                return Err(CheckError::new(
                    CheckErrorKind::MissingTagValue { tag: self.tag.clone() },
                    self.describe(),
                    field,
                ));
            }
            [only] => Cow::Borrowed(only),
            many => {
                let span = many[0].span().merge(&many[many.len() - 1].span());
                Cow::Owned(Term::form("", many.to_vec()).with_span(span))
            }
        };
        self.inner.check(&value).map_err(|e| e.within(self.tag.as_str()))
    }

    fn termify(&self, value: &T) -> Result<Term, TermifyError> {
        let inner = self.inner.termify(value)?;
        let children = if inner.head().is_empty() && inner.children().len() >= 2 {
            inner.into_parts().1
        } else {
            vec![inner]
        };
        Ok(Term::form(self.tag.as_str(), children))
    }

    fn describe(&self) -> String {
        format!("ensure_tag({})", self.tag)
    }

    fn tag(&self) -> Option<&str> {
        Some(&self.tag)
    }
}

/// A form with a fixed head whose children are all checked by one checker.
#[derive(Debug, Clone)]
pub struct TaggedSequence<C> {
    name: String,
    inner: C,
}

/// Checker for a form headed `name`, running `inner` over each child.
pub fn tagged_sequence<C>(name: impl Into<String>, inner: C) -> TaggedSequence<C> {
    TaggedSequence {
        name: name.into(),
        inner,
    }
}

impl<T, C: Checker<T>> Checker<Vec<T>> for TaggedSequence<C> {
    fn check(&self, term: &Term) -> Result<Vec<T>, CheckError> {
        if term.head() != self.name {
            return Err(head_mismatch(&self.name, self.describe(), term));
        }
        term.children()
            .iter()
            .enumerate()
            .map(|(i, child)| {
                self.inner
                    .check(child)
                    .map_err(|e| e.within(format!("{}[{i}]", self.name)))
            })
            .collect()
    }

    fn termify(&self, values: &Vec<T>) -> Result<Term, TermifyError> {
        let children = values
            .iter()
            .map(|v| self.inner.termify(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Term::form(self.name.as_str(), children))
    }

    fn describe(&self) -> String {
        format!("tagged_sequence({}, {})", self.name, self.inner.describe())
    }
}

/// Every item of a term, head included, checked by one checker.
#[derive(Debug, Clone)]
pub struct Sequence<C> {
    inner: C,
}

/// Checker for a list of items, all read by `inner`.
pub const fn sequence<C>(inner: C) -> Sequence<C> {
    Sequence { inner }
}

impl<T, C: Checker<T>> Checker<Vec<T>> for Sequence<C> {
    fn check(&self, term: &Term) -> Result<Vec<T>, CheckError> {
        RecordScan::new(term)
            .items()
            .enumerate()
            .map(|(i, item)| self.inner.check(item).map_err(|e| e.within(format!("[{i}]"))))
            .collect()
    }

    fn termify(&self, values: &Vec<T>) -> Result<Term, TermifyError> {
        let items = values
            .iter()
            .map(|v| self.inner.termify(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Term::from_contents(items))
    }

    fn describe(&self) -> String {
        format!("sequence({})", self.inner.describe())
    }
}

/// Exactly two items, as in `key:value` or `key value`.
#[derive(Debug, Clone)]
pub struct Pair<K, V> {
    key: K,
    value: V,
}

/// Checker for a two-item term: a key then a value.
pub const fn pair<K, V>(key: K, value: V) -> Pair<K, V> {
    Pair { key, value }
}

impl<A, B, K: Checker<A>, V: Checker<B>> Checker<(A, B)> for Pair<K, V> {
    fn check(&self, term: &Term) -> Result<(A, B), CheckError> {
        let scan = RecordScan::new(term);
        if scan.len() != 2 {
            return Err(CheckError::new(
                CheckErrorKind::WrongLength {
                    expected: 2,
                    found: scan.len(),
                },
                self.describe(),
                term,
            ));
        }
        let key = self.key.check(scan.item(0)).map_err(|e| e.within("key"))?;
        let value = self.value.check(scan.item(1)).map_err(|e| e.within("value"))?;
        Ok((key, value))
    }

    fn termify(&self, (key, value): &(A, B)) -> Result<Term, TermifyError> {
        Ok(Term::from_contents(vec![self.key.termify(key)?, self.value.termify(value)?]))
    }

    fn describe(&self) -> String {
        format!("pair({}, {})", self.key.describe(), self.value.describe())
    }
}

fn check_entries<'t, K, V, KC, VC>(
    pairs: &Pair<KC, VC>,
    entries: impl Iterator<Item = &'t Term>,
) -> Result<IndexMap<K, V>, CheckError>
where
    K: Hash + Eq,
    KC: Checker<K>,
    VC: Checker<V>,
{
    let mut map = IndexMap::new();
    for (i, entry) in entries.enumerate() {
        let (key, value) = pairs.check(entry).map_err(|e| e.within(format!("[{i}]")))?;
        map.insert(key, value);
    }
    Ok(map)
}

fn termify_entries<K, V, KC, VC>(
    pairs: &Pair<KC, VC>,
    map: &IndexMap<K, V>,
) -> Result<Vec<Term>, TermifyError>
where
    KC: Checker<K>,
    VC: Checker<V>,
{
    map.iter()
        .map(|(k, v)| Ok(Term::from_contents(vec![pairs.key.termify(k)?, pairs.value.termify(v)?])))
        .collect()
}

/// Key/value pairs over every item of a term, in order.
///
/// A repeated key keeps its first position and its last value.
#[derive(Debug, Clone)]
pub struct Map<K, V> {
    pairs: Pair<K, V>,
}

/// Checker for a term whose items are each a key/value pair.
pub const fn map<K, V>(key: K, value: V) -> Map<K, V> {
    Map { pairs: pair(key, value) }
}

impl<K, V, KC, VC> Checker<IndexMap<K, V>> for Map<KC, VC>
where
    K: Hash + Eq,
    KC: Checker<K>,
    VC: Checker<V>,
{
    fn check(&self, term: &Term) -> Result<IndexMap<K, V>, CheckError> {
        let scan = RecordScan::new(term);
        check_entries(&self.pairs, scan.items())
    }

    fn termify(&self, map: &IndexMap<K, V>) -> Result<Term, TermifyError> {
        Ok(Term::from_contents(termify_entries(&self.pairs, map)?))
    }

    fn describe(&self) -> String {
        format!("map({}, {})", self.pairs.key.describe(), self.pairs.value.describe())
    }
}

/// Key/value pairs under a fixed head.
#[derive(Debug, Clone)]
pub struct TaggedMap<K, V> {
    name: String,
    pairs: Pair<K, V>,
}

/// Like [`map`], under a form headed `name`.
pub fn tagged_map<K, V>(name: impl Into<String>, key: K, value: V) -> TaggedMap<K, V> {
    TaggedMap {
        name: name.into(),
        pairs: pair(key, value),
    }
}

impl<K, V, KC, VC> Checker<IndexMap<K, V>> for TaggedMap<KC, VC>
where
    K: Hash + Eq,
    KC: Checker<K>,
    VC: Checker<V>,
{
    fn check(&self, term: &Term) -> Result<IndexMap<K, V>, CheckError> {
        if term.head() != self.name {
            return Err(head_mismatch(&self.name, self.describe(), term));
        }
        check_entries(&self.pairs, term.children().iter())
            .map_err(|e| e.within(self.name.as_str()))
    }

    fn termify(&self, map: &IndexMap<K, V>) -> Result<Term, TermifyError> {
        Ok(Term::form(self.name.as_str(), termify_entries(&self.pairs, map)?))
    }

    fn describe(&self) -> String {
        format!(
            "tagged_map({}, {}, {})",
            self.name,
            self.pairs.key.describe(),
            self.pairs.value.describe()
        )
    }
}
