//! Reversible whole-value conversions.
//!
//! A [`Converter`] maps a subject to another representation and back. Writing
//! through a converter ignores the old subject: the new subject is the focus
//! converted backward. Converters are not checked for being true inverses.
//!
//! Composing a converter with a write-capable optic converts forward, writes
//! into the converted value, and converts the result back:
//!
//! ```text
//! set(a, c) = backward(other.set(forward(a), c))
//! ```

use std::fmt;

use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions, register_composite};
use super::get::Get;
use super::maybe_converter::MaybeConverter;
use super::maybe_selector::MaybeSelector;
use super::memoize::Memoize;
use super::merge::Merge;
use super::modify::Modify;
use super::node::{ParamsFn, Reader, Writer};
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::selector::Selector;
use super::set::Set;
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A reversible conversion between `A` and `B`.
///
/// # Examples
///
/// ```
/// use bifocal::optics::{Converter, Params};
///
/// let celsius = Converter::new(
///     |kelvin: &i64, _: &Params| kelvin - 273,
///     |celsius: &i64, _: &Params| celsius + 273,
/// );
///
/// assert_eq!(celsius.get(&300, &Params::EMPTY), 27);
/// assert_eq!(celsius.set(&300, &Params::EMPTY, 0), 273);
/// assert_eq!(celsius.modify(&300, &Params::EMPTY, |c| c + 1), 301);
/// ```
pub struct Converter<A, B> {
    id: NodeId,
    forward: Get<A, B>,
    backward: Get<B, A>,
    set: Set<A, B>,
    modify: Modify<A, B>,
    extensions: Extensions,
}

impl<A, B> Clone for Converter<A, B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            forward: self.forward.clone(),
            backward: self.backward.clone(),
            set: self.set.clone(),
            modify: self.modify.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

impl<A: Data, B: Data> fmt::Debug for Converter<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Converter")
            .field("id", &self.id)
            .field("forward", &self.forward)
            .field("backward", &self.backward)
            .finish_non_exhaustive()
    }
}

/// Reads through `inner`, then through `outer`, carrying `extensions`.
pub(crate) fn chain_backward<A: Data, B: Data, C: Data>(
    inner: &Get<C, B>,
    outer: &Get<B, A>,
    extensions: &Extensions,
) -> Get<C, A> {
    let first = inner.reader();
    let second = outer.reader();
    Get::from_reader(
        Reader::new(ReferenceCounter::new(move |focus: &C, params: &Params| {
            second.call(&first.call(focus, params), params)
        })),
        inner.required_params().union(outer.required_params()),
        extensions.clone(),
    )
}

impl<A: Data, B: Data> Converter<A, B> {
    /// The kind of every `Converter`.
    pub const KIND: NodeKind = NodeKind::Converter;

    /// Creates a converter from a pair of conversion functions.
    ///
    /// # Arguments
    ///
    /// * `forward` - Converts a subject into the focus
    /// * `backward` - Converts a focus back into a subject
    pub fn new<F, G>(forward: F, backward: G) -> Self
    where
        F: Fn(&A, &Params) -> B + Shareable + 'static,
        G: Fn(&B, &Params) -> A + Shareable + 'static,
    {
        Self::from_gets(Get::new(forward), Get::new(backward))
    }

    /// Pairs two existing reads.
    pub fn from_gets(forward: Get<A, B>, backward: Get<B, A>) -> Self {
        let extensions = forward.extensions().combine(backward.extensions());
        Self::assemble(forward, backward, extensions)
    }

    pub(crate) fn assemble(
        forward: Get<A, B>,
        backward: Get<B, A>,
        extensions: Extensions,
    ) -> Self {
        let forward = forward.extend_with(&extensions);
        let backward = backward.extend_with(&extensions);
        let reader = backward.reader();
        let set = Set::from_writer(
            Writer::new(ReferenceCounter::new(
                move |_: &A, params: &Params, focus: B| reader.call(&focus, params),
            )),
            backward.required_params().clone(),
            extensions.clone(),
        );
        let modify = Modify::from_get_set(&forward, &set);
        Self {
            id: register_composite(Self::KIND, &extensions),
            forward,
            backward,
            set,
            modify,
            extensions,
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Converts forward.
    pub fn get(&self, subject: &A, params: &Params) -> B {
        self.forward.get(subject, params)
    }

    /// Converts backward.
    pub fn reverse_get(&self, focus: &B, params: &Params) -> A {
        self.backward.get(focus, params)
    }

    /// Replaces the subject with `focus` converted backward.
    pub fn set(&self, subject: &A, params: &Params, focus: B) -> A {
        self.set.set(subject, params, focus)
    }

    /// Converts forward, applies `function`, and converts back.
    pub fn modify<F>(&self, subject: &A, params: &Params, function: F) -> A
    where
        F: Fn(B) -> B,
    {
        self.modify.modify(subject, params, function)
    }

    /// The forward conversion.
    pub const fn forward(&self) -> &Get<A, B> {
        &self.forward
    }

    /// The backward conversion.
    pub const fn backward(&self) -> &Get<B, A> {
        &self.backward
    }

    /// The derived write.
    pub const fn setter(&self) -> &Set<A, B> {
        &self.set
    }

    /// The derived update.
    pub const fn modifier(&self) -> &Modify<A, B> {
        &self.modify
    }

    /// Swaps the directions.
    pub fn reverse(&self) -> Converter<B, A> {
        Converter::assemble(
            self.backward.clone(),
            self.forward.clone(),
            self.extensions.clone(),
        )
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tags of this optic.
    pub const fn shape(&self) -> Shape {
        Shape::new(Capability::Convert, Risk::Single)
    }

    /// Parameter names this optic reads.
    pub fn required_params(&self) -> RequiredParams {
        self.forward
            .required_params()
            .union(self.backward.required_params())
    }

    /// Extensions attached to this node.
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Composes with any optic; the result keeps `other`'s capability.
    pub fn compose<C: Data>(&self, other: impl Into<Optic<B, C>>) -> Optic<A, C> {
        match other.into() {
            Optic::Get(other) => self.forward.compose_get(&other).into(),
            Optic::MaybeGet(other) => self.forward.compose_maybe_get(&other).into(),
            Optic::Selector(other) => self.compose_selector(&other).into(),
            Optic::MaybeSelector(other) => self.compose_maybe_selector(&other).into(),
            Optic::Converter(other) => self.compose_converter(&other).into(),
            Optic::MaybeConverter(other) => self.compose_maybe_converter(&other).into(),
        }
    }

    /// Focuses into the converted value.
    pub fn compose_selector<C: Data>(&self, other: &Selector<B, C>) -> Selector<A, C> {
        Selector::assemble(
            self.forward.compose_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Focuses into the converted value, where the focus may be absent.
    pub fn compose_maybe_selector<C: Data>(
        &self,
        other: &MaybeSelector<B, C>,
    ) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.forward.compose_maybe_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Converts twice.
    pub fn compose_converter<C: Data>(&self, other: &Converter<B, C>) -> Converter<A, C> {
        Converter::assemble(
            self.forward.compose_get(other.forward()),
            chain_backward(other.backward(), &self.backward, &self.extensions),
            self.extensions.clone(),
        )
    }

    /// Converts, then converts again where the second step may fail.
    pub fn compose_maybe_converter<C: Data>(
        &self,
        other: &MaybeConverter<B, C>,
    ) -> MaybeConverter<A, C> {
        MaybeConverter::assemble(
            self.forward.compose_maybe_get(other.forward()),
            chain_backward(other.backward(), &self.backward, &self.extensions),
            self.extensions.clone(),
        )
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Declares that this optic reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        Self::assemble(
            self.forward.require(name),
            self.backward.require(name),
            self.extensions.clone(),
        )
    }

    /// Requires `required` instead, passing `transform(params)` inside.
    #[must_use]
    pub fn map_params<F>(&self, required: RequiredParams, transform: F) -> Self
    where
        F: Fn(&Params) -> Params + Shareable + 'static,
    {
        let transform: ParamsFn = ReferenceCounter::new(transform);
        Self::assemble(
            self.forward.map_params_fn(required.clone(), transform.clone()),
            self.backward.map_params_fn(required, transform),
            self.extensions.clone(),
        )
    }

    /// Pre-supplies some required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::UnknownParameter`] if `supplied` binds a name
    /// this optic does not require.
    pub fn with_params(&self, supplied: &Params) -> Result<Self, OpticError> {
        self.required_params().satisfy(supplied)?;
        Ok(self.supply(supplied))
    }

    pub(crate) fn supply(&self, supplied: &Params) -> Self {
        Self::assemble(
            self.forward.supply(supplied),
            self.backward.supply(supplied),
            self.extensions.clone(),
        )
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

    /// Attaches an extension to this converter and both directions.
    #[must_use]
    pub fn extend(&self, extension: ExtensionRef) -> Self {
        self.extend_with(&Extensions::of(extension))
    }

    /// Attaches every extension not already attached.
    #[must_use]
    pub fn extend_with(&self, extensions: &Extensions) -> Self {
        if self.extensions.includes(extensions) {
            return self.clone();
        }
        Self::assemble(
            self.forward.clone(),
            self.backward.clone(),
            self.extensions.combine(extensions),
        )
    }

    /// Caches the most recent conversion in each direction.
    #[must_use]
    pub fn memoize(&self) -> Self {
        self.extend(Memoize::extension())
    }

    /// Logs every primitive call and result.
    #[must_use]
    pub fn trace(&self) -> Self {
        self.extend(Trace::extension())
    }
}

impl<A: Data> Converter<A, A> {
    /// Converts nothing.
    pub fn identity() -> Self {
        Self::new(
            |subject: &A, _: &Params| subject.clone(),
            |focus: &A, _: &Params| focus.clone(),
        )
    }
}

impl<A: Data, B: Data + Merge> Converter<A, B> {
    /// Shallow-overlays `patch` on the converted value.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.merge(subject, params, patch)
    }

    /// Recursively overlays `patch` on the converted value.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.deep_merge(subject, params, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text() -> Converter<i64, String> {
        Converter::new(
            |number: &i64, _: &Params| number.to_string(),
            |text: &String, _: &Params| text.parse().unwrap_or_default(),
        )
    }

    #[rstest]
    #[case(0, "0")]
    #[case(-12, "-12")]
    #[case(345, "345")]
    fn test_forward_and_backward(#[case] number: i64, #[case] expected: &str) {
        assert_eq!(text().get(&number, &Params::EMPTY), expected);
        assert_eq!(text().reverse_get(&expected.to_string(), &Params::EMPTY), number);
    }

    #[test]
    fn test_set_ignores_the_old_subject() {
        assert_eq!(text().set(&99, &Params::EMPTY, "7".to_string()), 7);
    }

    #[test]
    fn test_modify_round_trips() {
        let appended = text().modify(&12, &Params::EMPTY, |text| format!("{text}3"));
        assert_eq!(appended, 123);
    }

    #[test]
    fn test_compose_converter_chains_both_directions() {
        let doubled = Converter::new(
            |text: &String, _: &Params| format!("{text}{text}"),
            |text: &String, _: &Params| text[..text.len() / 2].to_string(),
        );
        let composed = text().compose_converter(&doubled);
        assert_eq!(composed.get(&4, &Params::EMPTY), "44");
        assert_eq!(composed.set(&0, &Params::EMPTY, "5151".to_string()), 51);
    }

    #[test]
    fn test_compose_selector_wraps_the_write() {
        let length = Selector::new(
            |text: &String, _: &Params| text.len(),
            |text: &String, _: &Params, length: usize| {
                "9".repeat(length)
                    .chars()
                    .chain(text.chars().skip(length))
                    .collect()
            },
        );
        let composed = text().compose_selector(&length);
        assert_eq!(composed.get(&1234, &Params::EMPTY), 4);
        assert_eq!(composed.set(&1234, &Params::EMPTY, 2), 9934);
    }

    #[test]
    fn test_reverse_swaps_directions() {
        let parse = text().reverse();
        assert_eq!(parse.get(&"8".to_string(), &Params::EMPTY), 8);
        assert_eq!(parse.reverse_get(&8, &Params::EMPTY), "8");
    }

    #[test]
    fn test_identity_keeps_subject() {
        let identity = Converter::<i64, i64>::identity();
        assert_eq!(identity.get(&5, &Params::EMPTY), 5);
        assert_eq!(identity.set(&5, &Params::EMPTY, 6), 6);
    }
}
