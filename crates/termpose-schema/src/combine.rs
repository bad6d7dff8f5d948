//! Records: several checkers combined into one value.
//!
//! A record reads a term's items in two ways at once. Checkers without a tag
//! take the leading items in declared order; [`ensure_tag`](crate::ensure_tag)
//! checkers pick their field by name from whatever comes after. Every item must
//! be accounted for.
//!
//! When several things are wrong, the error reported is the first of: too few
//! items, a failing positional field, a failing or missing tagged field, an
//! unclaimed item.

use std::marker::PhantomData;

use termpose_syntax::Term;

use crate::checker::{Checker, RecordScan};
use crate::error::{CheckError, TermifyError};

const RECORD: &str = "combine_trans";

/// A tuple of checkers read together as one record.
///
/// Implemented for tuples of up to twelve checkers.
pub trait Fields<Args> {
    /// Read every field from the items of `term`.
    fn check_fields(&self, term: &Term) -> Result<Args, CheckError>;

    /// Field terms in output order: positional fields, then tagged ones.
    fn termify_fields(&self, args: &Args) -> Result<Vec<Term>, TermifyError>;

    /// Descriptions of the field checkers, in declared order.
    fn describe_fields(&self) -> Vec<String>;
}

macro_rules! impl_fields {
    ($($idx:tt => $C:ident $A:ident $res:ident),+) => {
        impl<$($A, $C: Checker<$A>),+> Fields<($($A,)+)> for ($($C,)+) {
            fn check_fields(&self, term: &Term) -> Result<($($A,)+), CheckError> {
                let mut scan = RecordScan::new(term);
                let positional = 0 $(+ usize::from(self.$idx.tag().is_none()))+;
                scan.require(positional, RECORD)?;
                $(
                    let $res = match self.$idx.tag() {
                        None => {
                            let at = scan.next_positional();
                            self.$idx.check(scan.item(at)).map_err(|e| e.within(format!("#{at}")))
                        }
                        Some(tag) => match scan.claim(tag, positional) {
                            Some(at) => self.$idx.check_tagged(scan.item(at)),
                            None => Err(scan.missing_tag(tag, &self.$idx.describe())),
                        },
                    };
                )+
                $(
                    if self.$idx.tag().is_none() {
                        if let Err(e) = &$res {
                            return Err(e.clone());
                        }
                    }
                )+
                $(
                    if let Err(e) = &$res {
                        return Err(e.clone());
                    }
                )+
                scan.finish(RECORD)?;
                Ok(($($res?,)+))
            }

            fn termify_fields(&self, args: &($($A,)+)) -> Result<Vec<Term>, TermifyError> {
                let mut positional = Vec::new();
                let mut tagged = Vec::new();
                $(
                    let term = self.$idx.termify(&args.$idx)?;
                    if self.$idx.tag().is_none() {
                        positional.push(term);
                    } else {
                        tagged.push(term);
                    }
                )+
                positional.append(&mut tagged);
                Ok(positional)
            }

            fn describe_fields(&self) -> Vec<String> {
                vec![$(self.$idx.describe()),+]
            }
        }
    };
}

impl_fields!(0 => C0 A0 r0);
impl_fields!(0 => C0 A0 r0, 1 => C1 A1 r1);
impl_fields!(0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2);
impl_fields!(0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3);
impl_fields!(0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4);
impl_fields!(0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6
);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6, 7 => C7 A7 r7
);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6, 7 => C7 A7 r7, 8 => C8 A8 r8
);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6, 7 => C7 A7 r7, 8 => C8 A8 r8, 9 => C9 A9 r9
);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6, 7 => C7 A7 r7, 8 => C8 A8 r8, 9 => C9 A9 r9, 10 => C10 A10 r10
);
impl_fields!(
    0 => C0 A0 r0, 1 => C1 A1 r1, 2 => C2 A2 r2, 3 => C3 A3 r3, 4 => C4 A4 r4, 5 => C5 A5 r5,
    6 => C6 A6 r6, 7 => C7 A7 r7, 8 => C8 A8 r8, 9 => C9 A9 r9, 10 => C10 A10 r10,
    11 => C11 A11 r11
);

/// A record checker built by [`combine_trans`].
pub struct CombineTrans<B, D, Cs, Args> {
    build: B,
    decompose: D,
    fields: Cs,
    args: PhantomData<fn() -> Args>,
}

impl<B: Clone, D: Clone, Cs: Clone, Args> Clone for CombineTrans<B, D, Cs, Args> {
    fn clone(&self) -> Self {
        Self {
            build: self.build.clone(),
            decompose: self.decompose.clone(),
            fields: self.fields.clone(),
            args: PhantomData,
        }
    }
}

/// Combine a tuple of field checkers into a checker for `T`.
///
/// `build` assembles a `T` from the checked fields; `decompose` takes it
/// apart again for writing.
///
/// ```
/// use termpose_schema::{combine_trans, ensure_tag, numeric, text, Checker};
/// use termpose_syntax::parse_single;
///
/// #[derive(Debug, PartialEq)]
/// struct Tool {
///     name: String,
///     cost: f64,
/// }
///
/// let tool = combine_trans(
///     |(name, cost): (String, f64)| Tool { name, cost },
///     |t: &Tool| (t.name.clone(), t.cost),
///     (text(), ensure_tag("cost", numeric())),
/// );
///
/// let hammer = tool.check(&parse_single("hammer cost:5").unwrap()).unwrap();
/// assert_eq!(hammer, Tool { name: "hammer".into(), cost: 5.0 });
/// assert_eq!(tool.termify(&hammer).unwrap().pretty_print(), "hammer cost:5\n");
/// ```
pub fn combine_trans<T, Args, B, D, Cs>(
    build: B,
    decompose: D,
    fields: Cs,
) -> CombineTrans<B, D, Cs, Args>
where
    B: Fn(Args) -> T,
    D: Fn(&T) -> Args,
    Cs: Fields<Args>,
{
    CombineTrans {
        build,
        decompose,
        fields,
        args: PhantomData,
    }
}

impl<T, Args, B, D, Cs> Checker<T> for CombineTrans<B, D, Cs, Args>
where
    B: Fn(Args) -> T,
    D: Fn(&T) -> Args,
    Cs: Fields<Args>,
{
    fn check(&self, term: &Term) -> Result<T, CheckError> {
        self.fields.check_fields(term).map(&self.build)
    }

    fn termify(&self, value: &T) -> Result<Term, TermifyError> {
        let args = (self.decompose)(value);
        Ok(Term::from_contents(self.fields.termify_fields(&args)?))
    }

    fn describe(&self) -> String {
        format!("{RECORD}({})", self.fields.describe_fields().join(", "))
    }
}
