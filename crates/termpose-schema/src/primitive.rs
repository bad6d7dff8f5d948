//! Checkers for atoms: text, booleans, integers and decimals.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use termpose_syntax::Term;

use crate::checker::Checker;
use crate::error::{CheckError, CheckErrorKind, TermifyError};

fn expect_atom<'t>(term: &'t Term, checker: &str) -> Result<&'t str, CheckError> {
    if term.is_atom() {
        Ok(term.head())
    } else {
        Err(CheckError::new(
            CheckErrorKind::ExpectedAtom {
                children: term.children().len(),
            },
            checker,
            term,
        ))
    }
}

/// Any atom, as its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

/// Checker for plain text atoms.
#[must_use]
pub const fn text() -> Text {
    Text
}

impl Checker<String> for Text {
    fn check(&self, term: &Term) -> Result<String, CheckError> {
        expect_atom(term, "text").map(str::to_string)
    }

    fn termify(&self, value: &String) -> Result<Term, TermifyError> {
        Ok(Term::atom(value.as_str()))
    }

    fn describe(&self) -> String {
        "text".to_string()
    }
}

/// `true`, `yes` or `⊤` for true; `false`, `no` or `⟂` for false.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

/// Checker for boolean atoms; writes `true` or `false`.
#[must_use]
pub const fn boolean() -> Boolean {
    Boolean
}

impl Checker<bool> for Boolean {
    fn check(&self, term: &Term) -> Result<bool, CheckError> {
        match expect_atom(term, "boolean")? {
            "true" | "yes" | "⊤" => Ok(true),
            "false" | "no" | "⟂" => Ok(false),
            other => Err(CheckError::new(
                CheckErrorKind::InvalidLiteral {
                    expected: "boolean",
                    text: other.to_string(),
                },
                "boolean",
                term,
            )),
        }
    }

    fn termify(&self, value: &bool) -> Result<Term, TermifyError> {
        Ok(Term::atom(if *value { "true" } else { "false" }))
    }

    fn describe(&self) -> String {
        "boolean".to_string()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Primitive integer types readable by [`integer`].
pub trait Integer: Copy + Display + FromStr<Err = std::num::ParseIntError> + sealed::Sealed {
    /// Type name used in error messages.
    const NAME: &'static str;
}

macro_rules! impl_integer {
    ($($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Integer for $ty {
                const NAME: &'static str = stringify!($ty);
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Primitive float types readable by [`decimal`].
pub trait Decimal: Copy + Display + FromStr + sealed::Sealed {
    /// Type name used in error messages.
    const NAME: &'static str;
    /// Neither infinite nor NaN.
    fn is_finite(self) -> bool;
    /// Either zero, positive or negative.
    fn is_zero(self) -> bool;
}

macro_rules! impl_decimal {
    ($($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Decimal for $ty {
                const NAME: &'static str = stringify!($ty);
                fn is_finite(self) -> bool {
                    <$ty>::is_finite(self)
                }
                fn is_zero(self) -> bool {
                    self == 0.0
                }
            }
        )+
    };
}

impl_decimal!(f32, f64);

/// `-?(0|[1-9][0-9]*)`, without `-0`.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits.as_bytes() {
        [b'0'] => text.len() == 1,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?`
fn is_decimal_literal(text: &str) -> bool {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let whole_ok = match whole.strip_prefix('-').unwrap_or(whole).as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    };
    whole_ok && fraction.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// An integer atom in canonical decimal notation.
pub struct IntegerChecker<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for IntegerChecker<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IntegerChecker<T> {}

impl<T> std::fmt::Debug for IntegerChecker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IntegerChecker<{}>", std::any::type_name::<T>())
    }
}

/// Checker for any primitive integer type, e.g. `integer::<u16>()`.
#[must_use]
pub const fn integer<T: Integer>() -> IntegerChecker<T> {
    IntegerChecker { marker: PhantomData }
}

impl<T: Integer> Checker<T> for IntegerChecker<T> {
    fn check(&self, term: &Term) -> Result<T, CheckError> {
        let literal = expect_atom(term, T::NAME)?;
        let error = |kind| CheckError::new(kind, T::NAME, term);
        if !is_integer_literal(literal) {
            return Err(error(CheckErrorKind::InvalidLiteral {
                expected: "integer",
                text: literal.to_string(),
            }));
        }
        // A well-formed literal only fails on range: overflow, or a negative
        // number for an unsigned type.
        literal.parse().map_err(|_| {
            error(CheckErrorKind::OutOfRange {
                expected: T::NAME,
                text: literal.to_string(),
            })
        })
    }

    fn termify(&self, value: &T) -> Result<Term, TermifyError> {
        Ok(Term::atom(value.to_string()))
    }

    fn describe(&self) -> String {
        T::NAME.to_string()
    }
}

/// A decimal atom: optional minus, integer part, optional fraction.
///
/// Exponents, `inf` and `nan` are rejected. Values are written with `Display`,
/// which never produces an exponent, so they read back exactly.
pub struct DecimalChecker<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DecimalChecker<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DecimalChecker<T> {}

impl<T> std::fmt::Debug for DecimalChecker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DecimalChecker<{}>", std::any::type_name::<T>())
    }
}

/// Checker for `f32` or `f64`.
#[must_use]
pub const fn decimal<T: Decimal>() -> DecimalChecker<T> {
    DecimalChecker { marker: PhantomData }
}

/// Shorthand for `decimal::<f64>()`.
#[must_use]
pub const fn numeric() -> DecimalChecker<f64> {
    decimal()
}

impl<T: Decimal> Checker<T> for DecimalChecker<T> {
    fn check(&self, term: &Term) -> Result<T, CheckError> {
        let literal = expect_atom(term, T::NAME)?;
        let invalid = || {
            CheckError::new(
                CheckErrorKind::InvalidLiteral {
                    expected: "decimal",
                    text: literal.to_string(),
                },
                T::NAME,
                term,
            )
        };
        if !is_decimal_literal(literal) {
            return Err(invalid());
        }
        let value: T = literal.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(CheckError::new(
                CheckErrorKind::OutOfRange {
                    expected: T::NAME,
                    text: literal.to_string(),
                },
                T::NAME,
                term,
            ));
        }
        Ok(value)
    }

    fn termify(&self, value: &T) -> Result<Term, TermifyError> {
        if !value.is_finite() {
            return Err(TermifyError::NonFinite {
                checker: T::NAME.to_string(),
                value: value.to_string(),
            });
        }
        // -0.0 would print as "-0", which the grammar rejects.
        if value.is_zero() {
            return Ok(Term::atom("0"));
        }
        Ok(Term::atom(value.to_string()))
    }

    fn describe(&self) -> String {
        T::NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(text: &str) -> Term {
        Term::atom(text)
    }

    #[test]
    fn text_accepts_any_atom() {
        assert_eq!(text().check(&atom("bee's knee")).unwrap(), "bee's knee");
        assert_eq!(text().check(&atom("")).unwrap(), "");
        let err = text().check(&Term::form("a", vec![atom("b")])).unwrap_err();
        assert_eq!(*err.kind, CheckErrorKind::ExpectedAtom { children: 1 });
    }

    #[test]
    fn boolean_spellings() {
        for yes in ["true", "yes", "⊤"] {
            assert!(boolean().check(&atom(yes)).unwrap());
        }
        for no in ["false", "no", "⟂"] {
            assert!(!boolean().check(&atom(no)).unwrap());
        }
        assert!(boolean().check(&atom("True")).is_err());
        assert_eq!(boolean().termify(&true).unwrap(), atom("true"));
        assert_eq!(boolean().termify(&false).unwrap(), atom("false"));
    }

    #[test]
    fn integer_literals() {
        assert_eq!(integer::<i64>().check(&atom("0")).unwrap(), 0);
        assert_eq!(integer::<i64>().check(&atom("-42")).unwrap(), -42);
        assert_eq!(integer::<u8>().check(&atom("255")).unwrap(), 255);
        for bad in ["", "-", "-0", "007", "+5", "1.0", "1e3", " 1", "0x10"] {
            let err = integer::<i64>().check(&atom(bad)).unwrap_err();
            assert!(
                matches!(*err.kind, CheckErrorKind::InvalidLiteral { .. }),
                "{bad:?} gave {err}"
            );
        }
    }

    #[test]
    fn integer_range() {
        let err = integer::<u8>().check(&atom("256")).unwrap_err();
        assert_eq!(
            *err.kind,
            CheckErrorKind::OutOfRange {
                expected: "u8",
                text: "256".into()
            }
        );
        assert!(integer::<u32>().check(&atom("-1")).is_err());
        assert_eq!(integer::<i8>().check(&atom("-128")).unwrap(), -128);
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(numeric().check(&atom("9.50")).unwrap(), 9.5);
        assert_eq!(numeric().check(&atom("-0.25")).unwrap(), -0.25);
        assert_eq!(numeric().check(&atom("5")).unwrap(), 5.0);
        for bad in ["", ".5", "5.", "1e3", "inf", "NaN", "05", "--1", "1.2.3", "cheap"] {
            assert!(numeric().check(&atom(bad)).is_err(), "{bad:?} was accepted");
        }
    }

    #[test]
    fn decimal_overflow_is_out_of_range() {
        let huge = format!("1{}", "0".repeat(400));
        let err = numeric().check(&atom(&huge)).unwrap_err();
        assert!(matches!(*err.kind, CheckErrorKind::OutOfRange { .. }));
        assert!(decimal::<f32>().check(&atom("1000000000000000000000000000000000000000")).is_err());
    }

    #[test]
    fn decimal_termify() {
        assert_eq!(numeric().termify(&5.0).unwrap(), atom("5"));
        assert_eq!(numeric().termify(&9.5).unwrap(), atom("9.5"));
        assert_eq!(numeric().termify(&-0.0).unwrap(), atom("0"));
        assert_eq!(numeric().termify(&1e21).unwrap(), atom("1000000000000000000000"));
        assert!(matches!(
            numeric().termify(&f64::NAN),
            Err(TermifyError::NonFinite { .. })
        ));
        assert!(numeric().termify(&f64::INFINITY).is_err());
    }

    #[test]
    fn tiny_decimals_round_trip() {
        for value in [1e-7, 0.1 + 0.2, f64::MIN_POSITIVE, f64::MAX, -123.456] {
            let term = numeric().termify(&value).unwrap();
            assert_eq!(numeric().check(&term).unwrap(), value);
        }
    }
}
