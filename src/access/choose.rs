//! Narrowing converters.
//!
//! A choice narrows a value to a sub-variant: one case of an enum, values
//! matching a predicate, or the inside of a defined `Option`. Choices are
//! [`MaybeConverter`]s, so they compose into any optic and turn its risk
//! into `Maybe`.

use crate::optics::{MaybeConverter, Params};
use crate::{Data, Shareable};

/// Constructors for narrowing converters.
///
/// # Example
///
/// ```
/// use bifocal::access::{Choose, prop};
/// use bifocal::optics::Params;
/// use bifocal::record;
/// use bifocal::value::Value;
///
/// let age = prop("age").compose_maybe_converter(&Choose::new(Value::as_int, Value::from));
///
/// assert_eq!(age.get(&record! { "age" => 30 }, &Params::EMPTY), Some(30));
/// assert_eq!(age.get(&record! { "age" => "?" }, &Params::EMPTY), None);
/// assert_eq!(
///     age.modify(&record! { "age" => 30 }, &Params::EMPTY, |age| age + 1),
///     record! { "age" => 31 }
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Choose;

impl Choose {
    /// Narrows with `narrow` and widens back with `widen`.
    pub fn new<B, C, N, W>(narrow: N, widen: W) -> MaybeConverter<B, C>
    where
        B: Data,
        C: Data,
        N: Fn(&B) -> Option<C> + Shareable + 'static,
        W: Fn(C) -> B + Shareable + 'static,
    {
        MaybeConverter::new(
            move |value: &B, _: &Params| narrow(value),
            move |variant: &C, _: &Params| widen(variant.clone()),
        )
    }

    /// Keeps values for which `predicate` holds.
    pub fn when<B, P>(predicate: P) -> MaybeConverter<B, B>
    where
        B: Data,
        P: Fn(&B) -> bool + Shareable + 'static,
    {
        Self::new(
            move |value: &B| predicate(value).then(|| value.clone()),
            |value: B| value,
        )
    }
}

/// Narrows an `Option` to its contents.
///
/// Writing through the result stores `Some`.
///
/// # Example
///
/// ```
/// use bifocal::access::if_defined;
/// use bifocal::optics::Params;
///
/// let defined = if_defined::<i32>();
/// assert_eq!(defined.get(&Some(1), &Params::EMPTY), Some(1));
/// assert_eq!(defined.get(&None, &Params::EMPTY), None);
/// assert_eq!(defined.with_default_value(0).get(&None, &Params::EMPTY), 0);
/// ```
pub fn if_defined<T: Data>() -> MaybeConverter<Option<T>, T> {
    Choose::new(|value: &Option<T>| value.clone(), Some)
}
