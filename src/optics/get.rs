//! Total read accessors.
//!
//! A [`Get`] reads a focus `B` out of a subject `A`, given the call's
//! [`Params`]. It is the read-only end of the capability lattice: composing
//! anything with a `Get` yields a read-only optic.
//!
//! # Examples
//!
//! ```
//! use bifocal::optics::{Get, Params};
//!
//! let length = Get::new(|text: &String, _: &Params| text.len());
//! let doubled = length.map(|length, _| length * 2);
//!
//! assert_eq!(doubled.get(&"abc".to_string(), &Params::EMPTY), 6);
//! ```

use std::fmt;

use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions};
use super::maybe_get::MaybeGet;
use super::memoize::Memoize;
use super::node::{ParamsFn, Primitive, Reader};
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A total, parameterized read.
///
/// # Type Parameters
///
/// - `A`: The subject type
/// - `B`: The focus type
pub struct Get<A, B> {
    core: Primitive<Reader<A, B>>,
}

impl<A, B> Clone for Get<A, B> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<A, B> fmt::Debug for Get<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Get")
            .field("id", &self.core.id())
            .field("required", self.core.required())
            .finish()
    }
}

impl<A: Data, B: Data> Get<A, B> {
    /// The kind of every `Get`.
    pub const KIND: NodeKind = NodeKind::Get;

    /// Creates a `Get` from a read function.
    ///
    /// # Arguments
    ///
    /// * `read` - Computes the focus from the subject and parameters
    pub fn new<F>(read: F) -> Self
    where
        F: Fn(&A, &Params) -> B + Shareable + 'static,
    {
        Self::from_reader(
            Reader::new(ReferenceCounter::new(read)),
            RequiredParams::new(),
            Extensions::none(),
        )
    }

    pub(crate) fn from_reader(
        reader: Reader<A, B>,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self {
        Self::from_core(Primitive::build(Self::KIND, reader, required, extensions))
    }

    const fn from_core(core: Primitive<Reader<A, B>>) -> Self {
        Self { core }
    }

    pub(crate) fn reader(&self) -> Reader<A, B> {
        self.core.underlying().clone()
    }

    /// Reads the focus.
    pub fn get(&self, subject: &A, params: &Params) -> B {
        self.core.underlying().call(subject, params)
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.core.id()
    }

    /// Tags of this optic.
    pub const fn shape(&self) -> Shape {
        Shape::new(Capability::Get, Risk::Single)
    }

    /// Parameter names this optic reads.
    pub const fn required_params(&self) -> &RequiredParams {
        self.core.required()
    }

    /// Extensions attached to this node.
    pub const fn extensions(&self) -> &Extensions {
        self.core.extensions()
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Composes with any optic, keeping only its read path.
    ///
    /// The result is a `Get` if `other` always focuses and a `MaybeGet`
    /// otherwise.
    pub fn compose<C: Data>(&self, other: impl Into<Optic<B, C>>) -> Optic<A, C> {
        match other.into() {
            Optic::Get(other) => self.compose_get(&other).into(),
            Optic::MaybeGet(other) => self.compose_maybe_get(&other).into(),
            Optic::Selector(other) => self.compose_get(other.getter()).into(),
            Optic::MaybeSelector(other) => self.compose_maybe_get(other.getter()).into(),
            Optic::Converter(other) => self.compose_get(other.forward()).into(),
            Optic::MaybeConverter(other) => self.compose_maybe_get(other.forward()).into(),
        }
    }

    /// Reads through `self`, then through `other`.
    pub fn compose_get<C: Data>(&self, other: &Get<B, C>) -> Get<A, C> {
        let outer = self.reader();
        let inner = other.reader();
        Get::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                inner.call(&outer.call(subject, params), params)
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Reads through `self`, then through a read that may find nothing.
    pub fn compose_maybe_get<C: Data>(&self, other: &MaybeGet<B, C>) -> MaybeGet<A, C> {
        let outer = self.reader();
        let inner = other.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                inner.call(&outer.call(subject, params), params)
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    // =========================================================================
    // Focus transformations
    // =========================================================================

    /// Post-transforms the focus.
    pub fn map<C, F>(&self, function: F) -> Get<A, C>
    where
        C: Data,
        F: Fn(B, &Params) -> C + Shareable + 'static,
    {
        let reader = self.reader();
        Get::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                function(reader.call(subject, params), params)
            })),
            self.required_params().clone(),
            self.extensions().clone(),
        )
    }

    /// Reads `self` and `other` from the same subject and pairs the results.
    pub fn combine<C: Data>(&self, other: &Get<A, C>) -> Get<A, (B, C)> {
        let left = self.reader();
        let right = other.reader();
        Get::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                (left.call(subject, params), right.call(subject, params))
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Reads every sibling from the same subject, in order.
    ///
    /// The result carries the first sibling's extensions.
    pub fn all<I>(gets: I) -> Get<A, Vec<B>>
    where
        I: IntoIterator<Item = Self>,
    {
        let gets: Vec<Self> = gets.into_iter().collect();
        let required = gets.iter().fold(RequiredParams::new(), |required, get| {
            required.union(get.required_params())
        });
        let extensions = gets
            .first()
            .map(|get| get.extensions().clone())
            .unwrap_or_default();
        let readers: Vec<Reader<A, B>> = gets.iter().map(Self::reader).collect();
        Get::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                readers
                    .iter()
                    .map(|reader| reader.call(subject, params))
                    .collect()
            })),
            required,
            extensions,
        )
    }

    /// Narrows the focus to a sub-variant; absent when `narrow` rejects it.
    pub fn choose<C, F>(&self, narrow: F) -> MaybeGet<A, C>
    where
        C: Data,
        F: Fn(&B) -> Option<C> + Shareable + 'static,
    {
        self.compose_maybe_get(&MaybeGet::new(move |focus: &B, _: &Params| narrow(focus)))
    }

    /// Narrows the focus, falling back to `default` when `narrow` rejects it.
    pub fn choose_or<C, F>(&self, narrow: F, default: C) -> Get<A, C>
    where
        C: Data,
        F: Fn(&B) -> Option<C> + Shareable + 'static,
    {
        self.map(move |focus, _| narrow(&focus).unwrap_or_else(|| default.clone()))
    }

    /// Narrows the focus, computing a fallback when `narrow` rejects it.
    pub fn choose_or_else<C, F, D>(&self, narrow: F, default: D) -> Get<A, C>
    where
        C: Data,
        F: Fn(&B) -> Option<C> + Shareable + 'static,
        D: Fn(&B, &Params) -> C + Shareable + 'static,
    {
        self.map(move |focus, params| narrow(&focus).unwrap_or_else(|| default(&focus, params)))
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Declares that this optic reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        Self::from_core(self.core.require(name))
    }

    /// Requires `required` instead, passing `transform(params)` to the read.
    #[must_use]
    pub fn map_params<F>(&self, required: RequiredParams, transform: F) -> Self
    where
        F: Fn(&Params) -> Params + Shareable + 'static,
    {
        let transform: ParamsFn = ReferenceCounter::new(transform);
        Self::from_core(self.core.map_params(required, transform))
    }

    /// Pre-supplies some required parameters.
    ///
    /// The result requires only the remaining names. Supplied values take
    /// precedence over anything the caller passes under the same name.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::UnknownParameter`] if `supplied` binds a name
    /// this optic does not require.
    pub fn with_params(&self, supplied: &Params) -> Result<Self, OpticError> {
        self.required_params().satisfy(supplied)?;
        Ok(self.supply(supplied))
    }

    pub(crate) fn map_params_fn(&self, required: RequiredParams, transform: ParamsFn) -> Self {
        Self::from_core(self.core.map_params(required, transform))
    }

    pub(crate) fn supply(&self, supplied: &Params) -> Self {
        Self::from_core(self.core.supply(supplied))
    }

    /// Checks that `params` binds every required name.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::MissingParameters`] listing the unbound names.
    pub fn check_params(&self, params: &Params) -> Result<(), OpticError> {
        self.required_params().check(params)
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Attaches an extension.
    #[must_use]
    pub fn extend(&self, extension: ExtensionRef) -> Self {
        self.extend_with(&Extensions::of(extension))
    }

    /// Attaches every extension not already attached.
    #[must_use]
    pub fn extend_with(&self, extensions: &Extensions) -> Self {
        Self::from_core(self.core.extend_with(extensions))
    }

    /// Caches the most recent result.
    #[must_use]
    pub fn memoize(&self) -> Self {
        self.extend(Memoize::extension())
    }

    /// Logs every call and result.
    #[must_use]
    pub fn trace(&self) -> Self {
        self.extend(Trace::extension())
    }
}

impl<A: Data> Get<A, A> {
    /// Returns the subject unchanged.
    pub fn identity() -> Self {
        Self::new(|subject: &A, _: &Params| subject.clone())
    }
}

impl<A: Data, C: Data> Get<A, Option<C>> {
    /// Treats `None` as an absent focus.
    pub fn if_defined(&self) -> MaybeGet<A, C> {
        MaybeGet::from_reader(
            self.reader(),
            self.required_params().clone(),
            self.extensions().clone(),
        )
    }

    /// Replaces `None` with `default`.
    pub fn if_defined_or(&self, default: C) -> Get<A, C> {
        self.map(move |focus, _| focus.unwrap_or_else(|| default.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use rstest::rstest;

    fn length() -> Get<String, usize> {
        Get::new(|text: &String, _: &Params| text.len())
    }

    #[test]
    fn test_get_reads_focus() {
        assert_eq!(length().get(&"abcd".to_string(), &Params::EMPTY), 4);
    }

    #[test]
    fn test_compose_get_chains_reads() {
        let is_even = Get::new(|length: &usize, _: &Params| length % 2 == 0);
        let composed = length().compose_get(&is_even);
        assert!(composed.get(&"ab".to_string(), &Params::EMPTY));
        assert!(!composed.get(&"abc".to_string(), &Params::EMPTY));
    }

    #[test]
    fn test_combine_pairs_results() {
        let upper = Get::new(|text: &String, _: &Params| text.to_uppercase());
        let both = length().combine(&upper);
        assert_eq!(
            both.get(&"ab".to_string(), &Params::EMPTY),
            (2, "AB".to_string())
        );
    }

    #[test]
    fn test_all_reads_every_sibling() {
        let first = Get::new(|pair: &(i32, i32), _: &Params| pair.0);
        let second = Get::new(|pair: &(i32, i32), _: &Params| pair.1);
        let sum = Get::new(|pair: &(i32, i32), _: &Params| pair.0 + pair.1);
        let all = Get::all([first, second, sum]);
        assert_eq!(all.get(&(2, 3), &Params::EMPTY), vec![2, 3, 5]);
    }

    #[rstest]
    #[case(4, Some(2))]
    #[case(3, None)]
    fn test_choose_narrows(#[case] input: i32, #[case] expected: Option<i32>) {
        let halved = Get::<i32, i32>::identity()
            .choose(|value: &i32| (value % 2 == 0).then_some(value / 2));
        assert_eq!(halved.get(&input, &Params::EMPTY), expected);
    }

    #[test]
    fn test_choose_or_falls_back() {
        let halved = Get::<i32, i32>::identity()
            .choose_or(|value: &i32| (value % 2 == 0).then_some(value / 2), -1);
        assert_eq!(halved.get(&3, &Params::EMPTY), -1);
        assert_eq!(halved.get(&8, &Params::EMPTY), 4);
    }

    #[test]
    fn test_choose_or_else_sees_focus() {
        let halved = Get::<i32, i32>::identity().choose_or_else(
            |value: &i32| (value % 2 == 0).then_some(value / 2),
            |value, _| -value,
        );
        assert_eq!(halved.get(&3, &Params::EMPTY), -3);
    }

    #[test]
    fn test_if_defined() {
        let optional = Get::new(|value: &Option<i32>, _: &Params| *value);
        assert_eq!(optional.if_defined().get(&Some(1), &Params::EMPTY), Some(1));
        assert_eq!(optional.if_defined().get(&None, &Params::EMPTY), None);
        assert_eq!(optional.if_defined_or(9).get(&None, &Params::EMPTY), 9);
    }

    #[test]
    fn test_with_params_supplies_and_overrides() {
        let greeting = Get::new(|name: &String, params: &Params| {
            format!("{}, {name}", params.text("greeting").unwrap_or("?"))
        })
        .require("greeting");

        let hello = greeting
            .with_params(&params! { "greeting" => "hello" })
            .unwrap();
        assert!(hello.required_params().is_empty());
        assert_eq!(
            hello.get(&"bob".to_string(), &params! { "greeting" => "bye" }),
            "hello, bob"
        );
    }

    #[test]
    fn test_with_params_rejects_unknown_names() {
        let result = length().with_params(&params! { "unused" => 1 });
        assert_eq!(
            result.unwrap_err(),
            OpticError::UnknownParameter {
                name: "unused".to_string()
            }
        );
    }

    #[test]
    fn test_map_params_renames() {
        let scaled = Get::new(|value: &i64, params: &Params| {
            value * params.get("factor").and_then(crate::value::Value::as_int).unwrap_or(1)
        })
        .require("factor")
        .map_params(RequiredParams::of(["scale"]), |params| {
            Params::new().with(
                "factor",
                params.get("scale").cloned().unwrap_or_default(),
            )
        });

        assert_eq!(scaled.required_params(), &RequiredParams::of(["scale"]));
        assert_eq!(scaled.get(&3, &params! { "scale" => 4 }), 12);
    }

    #[test]
    fn test_composition_unions_requirements() {
        let first = Get::<i32, i32>::identity().require("a");
        let second = Get::<i32, i32>::identity().require("b");
        let composed = first.compose_get(&second);
        assert_eq!(composed.required_params(), &RequiredParams::of(["a", "b"]));
        assert_eq!(
            composed.check_params(&params! { "a" => 1 }),
            Err(OpticError::MissingParameters {
                names: vec!["b".to_string()]
            })
        );
    }
}
