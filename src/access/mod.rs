//! Ready-made accessors over [`Value`] trees.
//!
//! Everything here is built from the public optics API alone:
//!
//! - [`prop`] and [`path`]: record fields, as [`Selector`]s
//! - [`index_by`] and [`index_or`]: record entries keyed by a parameter
//! - [`first`]: the head of a list
//! - [`Choose`] and [`if_defined`]: narrowing converters
//! - [`Combine`]: several selectors viewed as one record
//! - [`Root`]: an entry point that attaches extensions to everything it builds
//! - [`selector!`](crate::selector): a field of a plain struct
//!
//! # Example
//!
//! ```
//! use bifocal::access::{index_by, prop};
//! use bifocal::{params, record};
//! use bifocal::value::Value;
//!
//! let user_name = prop("users")
//!     .compose_maybe_selector(&index_by("user_id"))
//!     .compose_selector(&prop("name"));
//!
//! let state = record! { "users" => record! { "u1" => record! { "name" => "alice" } } };
//! let u1 = params! { "user_id" => "u1" };
//! let u2 = params! { "user_id" => "u2" };
//!
//! assert_eq!(user_name.get(&state, &u1), Some(Value::from("alice")));
//! assert_eq!(user_name.get(&state, &u2), None);
//! assert_eq!(user_name.set(&state, &u2, Value::from("bob")), state);
//! ```

mod choose;
mod combine;

pub use choose::{Choose, if_defined};
pub use combine::Combine;

use crate::optics::{
    ExtensionRef, Extensions, MaybeConverter, MaybeSelector, Memoize, Params, Selector, Trace,
};
use crate::value::Value;

/// Focuses on the record field `name`.
///
/// A missing field, or a subject that is not a record, reads as
/// [`Value::Null`]. Writing inserts or replaces the field.
pub fn prop(name: &str) -> Selector<Value, Value> {
    let read_name = name.to_string();
    let write_name = name.to_string();
    Selector::new(
        move |subject: &Value, _: &Params| subject.field(&read_name).cloned().unwrap_or_default(),
        move |subject: &Value, _: &Params, focus: Value| subject.with_field(&write_name, focus),
    )
}

/// Focuses through nested record fields, outermost first.
///
/// An empty path focuses on the whole subject.
pub fn path<'a, I>(names: I) -> Selector<Value, Value>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = names.into_iter();
    let Some(head) = names.next() else {
        return Selector::identity();
    };
    names.fold(prop(head), |selector, name| {
        selector.compose_selector(&prop(name))
    })
}

/// Reads the record key bound to parameter `param`.
///
/// Text and integer parameters are accepted.
fn key_of(params: &Params, param: &str) -> Option<String> {
    match params.get(param)? {
        Value::Text(key) => Some(key.to_string()),
        Value::Int(key) => Some(key.to_string()),
        _ => None,
    }
}

/// Focuses on the record entry whose key is the value of parameter `param`.
///
/// The entry is absent when the key is missing from the record or the
/// parameter is unbound. Writing always inserts the entry; without the
/// parameter, writing leaves the subject unchanged.
pub fn index_by(param: &str) -> MaybeSelector<Value, Value> {
    let read_param = param.to_string();
    let write_param = param.to_string();
    MaybeSelector::new(
        move |subject: &Value, params: &Params| {
            key_of(params, &read_param).and_then(|key| subject.field(&key).cloned())
        },
        move |subject: &Value, params: &Params, focus: Value| match key_of(params, &write_param) {
            Some(key) => subject.with_field(&key, focus),
            None => subject.clone(),
        },
    )
    .require(param)
}

/// Like [`index_by`], but a missing entry reads as `default`.
pub fn index_or(param: &str, default: Value) -> Selector<Value, Value> {
    index_by(param).with_default_value(default)
}

/// Focuses on the first element of a list.
///
/// Absent for empty lists and non-lists. Writing into an empty list makes
/// the value its only element.
pub fn first() -> MaybeSelector<Value, Value> {
    MaybeSelector::new(
        |subject: &Value, _: &Params| subject.first().cloned(),
        |subject: &Value, _: &Params, focus: Value| subject.with_first(focus),
    )
}

/// Entry point that attaches a fixed set of extensions to every accessor it
/// builds.
///
/// # Example
///
/// ```
/// use bifocal::access::Root;
/// use bifocal::optics::Params;
/// use bifocal::record;
/// use bifocal::value::Value;
///
/// let root = Root::new().memoize();
/// let name = root.prop("name");
///
/// assert_eq!(name.get(&record! { "name" => "a" }, &Params::EMPTY), Value::from("a"));
/// assert_eq!(name.extensions().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Root {
    extensions: Extensions,
}

impl Root {
    /// A root without extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A root attaching `extensions`.
    #[must_use]
    pub const fn with_extensions(extensions: Extensions) -> Self {
        Self { extensions }
    }

    /// Adds an extension.
    #[must_use]
    pub fn extend(&self, extension: ExtensionRef) -> Self {
        Self::with_extensions(self.extensions.with(extension))
    }

    /// Adds [`Memoize`].
    #[must_use]
    pub fn memoize(&self) -> Self {
        self.extend(Memoize::extension())
    }

    /// Adds [`Trace`].
    #[must_use]
    pub fn trace(&self) -> Self {
        self.extend(Trace::extension())
    }

    /// Extensions attached to everything this root builds.
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// See [`prop`].
    pub fn prop(&self, name: &str) -> Selector<Value, Value> {
        prop(name).extend_with(&self.extensions)
    }

    /// See [`path`].
    ///
    /// Every step of the path carries this root's extensions, not only the
    /// composed node.
    pub fn path<'a, I>(&self, names: I) -> Selector<Value, Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names = names.into_iter();
        let Some(head) = names.next() else {
            return Selector::identity().extend_with(&self.extensions);
        };
        names.fold(self.prop(head), |selector, name| {
            selector.compose_selector(&self.prop(name))
        })
    }

    /// See [`index_by`].
    pub fn index_by(&self, param: &str) -> MaybeSelector<Value, Value> {
        index_by(param).extend_with(&self.extensions)
    }

    /// See [`first`].
    pub fn first(&self) -> MaybeSelector<Value, Value> {
        first().extend_with(&self.extensions)
    }

    /// See [`Choose::new`].
    pub fn choose<C, N, W>(&self, narrow: N, widen: W) -> MaybeConverter<Value, C>
    where
        C: crate::Data,
        N: Fn(&Value) -> Option<C> + crate::Shareable + 'static,
        W: Fn(C) -> Value + crate::Shareable + 'static,
    {
        Choose::new(narrow, widen).extend_with(&self.extensions)
    }
}

/// Creates a [`Selector`] for a field of a struct.
///
/// The struct must implement `Clone`, and so must the field.
///
/// # Example
///
/// ```
/// use bifocal::optics::Params;
/// use bifocal::selector;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let x = selector!(Point, x);
/// let point = Point { x: 1, y: 2 };
///
/// assert_eq!(x.get(&point, &Params::EMPTY), 1);
/// assert_eq!(x.set(&point, &Params::EMPTY, 5), Point { x: 5, y: 2 });
/// ```
#[macro_export]
macro_rules! selector {
    ($source:ty, $field:ident) => {
        $crate::optics::Selector::new(
            |source: &$source, _: &$crate::optics::Params| source.$field.clone(),
            |source: &$source, _: &$crate::optics::Params, value| {
                let mut updated = source.clone();
                updated.$field = value;
                updated
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::NodeKind;
    use crate::shared::ReferenceCounter;
    use crate::{params, record};
    use rstest::rstest;

    #[rstest]
    #[case(record! { "a" => 1 }, Value::from(1))]
    #[case(record! { "b" => 1 }, Value::Null)]
    #[case(Value::from(3), Value::Null)]
    fn test_prop_reads_field_or_null(#[case] subject: Value, #[case] expected: Value) {
        assert_eq!(prop("a").get(&subject, &Params::EMPTY), expected);
    }

    #[test]
    fn test_prop_write_keeps_siblings() {
        let subject = record! { "a" => 1, "b" => 2 };
        assert_eq!(
            prop("a").set(&subject, &Params::EMPTY, Value::from(9)),
            record! { "a" => 9, "b" => 2 }
        );
    }

    #[test]
    fn test_path_nests_props() {
        let subject = record! { "a" => record! { "b" => record! { "c" => 1 } } };
        let abc = path(["a", "b", "c"]);
        assert_eq!(abc.get(&subject, &Params::EMPTY), Value::from(1));
        assert_eq!(
            abc.set(&subject, &Params::EMPTY, Value::from(2)),
            record! { "a" => record! { "b" => record! { "c" => 2 } } }
        );
        assert_eq!(path(Vec::<&str>::new()).get(&subject, &Params::EMPTY), subject);
    }

    #[test]
    fn test_index_by_requires_its_parameter() {
        let by_id = index_by("id");
        assert!(by_id.required_params().contains("id"));
        assert!(by_id.check_params(&Params::EMPTY).is_err());
    }

    #[rstest]
    #[case(params! { "id" => "a" }, Some(Value::from(1)))]
    #[case(params! { "id" => "z" }, None)]
    #[case(params! { "id" => 7 }, Some(Value::from("seven")))]
    #[case(Params::EMPTY, None)]
    fn test_index_by_reads(#[case] params: Params, #[case] expected: Option<Value>) {
        let subject = record! { "a" => 1, "7" => "seven" };
        assert_eq!(index_by("id").get(&subject, &params), expected);
    }

    #[test]
    fn test_index_by_write_without_param_is_no_op() {
        let subject = record! { "a" => 1 };
        let written = index_by("id").set(&subject, &Params::EMPTY, Value::from(2));
        assert!(written.same_reference(&subject));
    }

    #[test]
    fn test_index_or_reads_default() {
        let by_id = index_or("id", Value::from(0));
        assert_eq!(by_id.get(&record! {}, &params! { "id" => "x" }), Value::from(0));
    }

    #[test]
    fn test_first_inserts_into_empty_list() {
        let empty = Value::list(Vec::<Value>::new());
        assert_eq!(first().get(&empty, &Params::EMPTY), None);
        assert_eq!(
            first().set(&empty, &Params::EMPTY, Value::from(1)),
            Value::list([1])
        );
        assert_eq!(
            first().set(&Value::list([1, 2]), &Params::EMPTY, Value::from(3)),
            Value::list([3, 2])
        );
    }

    #[test]
    fn test_root_extends_everything() {
        let root = Root::new().memoize().memoize();
        assert_eq!(root.extensions().len(), 1);
        assert_eq!(root.index_by("id").extensions().len(), 1);
        assert_eq!(root.first().getter().extensions().len(), 1);
        let choice = root.choose(|value: &Value| value.as_int(), Value::from);
        assert_eq!(choice.shape().kind(), NodeKind::MaybeConverter);
        assert_eq!(choice.extensions().len(), 1);
    }

    struct CountReads(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl crate::optics::extension::Interceptor for CountReads {
        fn intercept(
            &self,
            _call: &crate::optics::extension::Call<'_>,
            proceed: &mut dyn FnMut() -> crate::optics::extension::Outcome,
        ) -> crate::optics::extension::Outcome {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            proceed()
        }
    }

    #[test]
    fn test_root_path_extends_every_step() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let counting = crate::optics::extension::from_fn(move |node| {
            if node.kind() == NodeKind::Get {
                node.intercept(ReferenceCounter::new(CountReads(Arc::clone(&counter))));
            }
        });
        let city = Root::new().extend(counting).path(["address", "city"]);
        let subject = record! { "address" => record! { "city" => "Tokyo" } };

        assert_eq!(city.get(&subject, &Params::EMPTY), Value::from("Tokyo"));
        // the composed read and both field reads
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_root_empty_path_is_extended_identity() {
        let root = Root::new().memoize();
        let whole = root.path(Vec::<&str>::new());
        let subject = record! { "a" => 1 };
        assert!(whole.get(&subject, &Params::EMPTY).same_reference(&subject));
        assert_eq!(whole.extensions().len(), 1);
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_selector_macro() {
        let y = crate::selector!(Point, y);
        let point = Point { x: 1, y: 2 };
        assert_eq!(y.get(&point, &Params::EMPTY), 2);
        assert_eq!(y.modify(&point, &Params::EMPTY, |y| y * 10), Point { x: 1, y: 20 });
    }
}
