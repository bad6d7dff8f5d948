//! Default checkers for common types, and text-level helpers built on them.

use std::hash::Hash;

use indexmap::IndexMap;
use termpose_syntax::{format, parse_single, PrintConfig, Term};

use crate::checker::Checker;
use crate::error::TermposeError;
use crate::primitive::{boolean, decimal, integer, text, Boolean, DecimalChecker, IntegerChecker, Text};
use crate::structure::{map, pair, sequence, Map, Pair, Sequence};

/// A type with a canonical checker.
pub trait Schema: Sized {
    /// The checker used by [`from_str`] and [`to_string`].
    type Checker: Checker<Self>;

    /// A fresh instance of [`Schema::Checker`].
    fn checker() -> Self::Checker;
}

impl Schema for String {
    type Checker = Text;

    fn checker() -> Text {
        text()
    }
}

impl Schema for bool {
    type Checker = Boolean;

    fn checker() -> Boolean {
        boolean()
    }
}

macro_rules! impl_schema {
    ($checker:ident, $make:ident: $($ty:ty),+) => {
        $(
            impl Schema for $ty {
                type Checker = $checker<$ty>;

                fn checker() -> Self::Checker {
                    $make()
                }
            }
        )+
    };
}

impl_schema!(IntegerChecker, integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_schema!(DecimalChecker, decimal: f32, f64);

impl<T: Schema> Schema for Vec<T> {
    type Checker = Sequence<T::Checker>;

    fn checker() -> Self::Checker {
        sequence(T::checker())
    }
}

impl<A: Schema, B: Schema> Schema for (A, B) {
    type Checker = Pair<A::Checker, B::Checker>;

    fn checker() -> Self::Checker {
        pair(A::checker(), B::checker())
    }
}

impl<K: Schema + Hash + Eq, V: Schema> Schema for IndexMap<K, V> {
    type Checker = Map<K::Checker, V::Checker>;

    fn checker() -> Self::Checker {
        map(K::checker(), V::checker())
    }
}

/// Parse a single termpose item and check it as a `T`.
///
/// ```
/// let ports: Vec<u16> = termpose_schema::from_str("80 443 8080").unwrap();
/// assert_eq!(ports, [80, 443, 8080]);
/// ```
pub fn from_str<T: Schema>(source: &str) -> Result<T, TermposeError> {
    let term = parse_single(source)?;
    Ok(T::checker().check(&term)?)
}

/// Write a value as a single termpose item.
pub fn to_string<T: Schema>(value: &T) -> Result<String, TermposeError> {
    to_string_with(value, &PrintConfig::default())
}

/// Like [`to_string`], with explicit printer settings.
pub fn to_string_with<T: Schema>(value: &T, config: &PrintConfig) -> Result<String, TermposeError> {
    let term = T::checker().termify(value)?;
    // Wrapped so that an empty-head form prints as one item, not as a document.
    Ok(format(&Term::form("", vec![term]), config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip_through_text() {
        assert_eq!(to_string(&true).unwrap(), "true\n");
        assert!(from_str::<bool>("yes").unwrap());
        assert_eq!(from_str::<i64>(&to_string(&-17i64).unwrap()).unwrap(), -17);
        assert_eq!(from_str::<String>("\"bee's knee\"").unwrap(), "bee's knee");
        assert_eq!(to_string(&String::new()).unwrap(), "\"\"\n");
    }

    #[test]
    fn nested_lists() {
        let value = vec![vec!["tricky".to_string(), "list".to_string()], vec!["parse".to_string()]];
        let text = to_string(&value).unwrap();
        assert_eq!(text, "\"\" tricky:list parse\n");
        assert_eq!(from_str::<Vec<Vec<String>>>(&text).unwrap(), value);
    }

    #[test]
    fn maps_keep_order() {
        let mut value = IndexMap::new();
        value.insert("zeta".to_string(), 1u32);
        value.insert("alpha".to_string(), 2);
        let text = to_string(&value).unwrap();
        assert_eq!(text, "\"\" zeta:1 alpha:2\n");
        assert_eq!(from_str::<IndexMap<String, u32>>(&text).unwrap(), value);
    }

    #[test]
    fn errors_are_wrapped() {
        assert!(matches!(from_str::<i32>(""), Err(TermposeError::Parse(_))));
        assert!(matches!(from_str::<i32>("x"), Err(TermposeError::Check(_))));
        assert!(matches!(to_string(&f64::NAN), Err(TermposeError::Termify(_))));
    }
}
