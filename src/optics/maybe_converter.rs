//! Conversions that may fail in the forward direction.
//!
//! A [`MaybeConverter`] narrows a subject to a representation that may not
//! apply, such as one variant of an enum. The backward direction always
//! succeeds. Writing is conditional: when the forward conversion finds
//! nothing, [`set`](MaybeConverter::set) and [`modify`](MaybeConverter::modify)
//! return the subject unchanged.

use std::fmt;

use super::converter::{Converter, chain_backward};
use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions, register_composite};
use super::get::Get;
use super::maybe_get::MaybeGet;
use super::maybe_selector::MaybeSelector;
use super::memoize::Memoize;
use super::merge::Merge;
use super::modify::Modify;
use super::node::{ParamsFn, Writer};
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::selector::Selector;
use super::set::Set;
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A conversion whose forward direction may find nothing.
///
/// # Examples
///
/// ```
/// use bifocal::optics::{MaybeConverter, Params};
///
/// let even = MaybeConverter::new(
///     |number: &i64, _: &Params| (number % 2 == 0).then_some(number / 2),
///     |half: &i64, _: &Params| half * 2,
/// );
///
/// assert_eq!(even.get(&8, &Params::EMPTY), Some(4));
/// assert_eq!(even.get(&7, &Params::EMPTY), None);
/// assert_eq!(even.set(&8, &Params::EMPTY, 5), 10);
/// assert_eq!(even.set(&7, &Params::EMPTY, 5), 7);
/// ```
pub struct MaybeConverter<A, B> {
    id: NodeId,
    forward: MaybeGet<A, B>,
    backward: Get<B, A>,
    set: Set<A, B>,
    modify: Modify<A, B>,
    extensions: Extensions,
}

impl<A, B> Clone for MaybeConverter<A, B> {
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

impl<A: Data, B: Data> fmt::Debug for MaybeConverter<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MaybeConverter")
            .field("id", &self.id)
            .field("forward", &self.forward)
            .field("backward", &self.backward)
            .finish_non_exhaustive()
    }
}

impl<A: Data, B: Data> MaybeConverter<A, B> {
    /// The kind of every `MaybeConverter`.
    pub const KIND: NodeKind = NodeKind::MaybeConverter;

    /// Creates a converter from a partial forward and a total backward function.
    pub fn new<F, G>(forward: F, backward: G) -> Self
    where
        F: Fn(&A, &Params) -> Option<B> + Shareable + 'static,
        G: Fn(&B, &Params) -> A + Shareable + 'static,
    {
        Self::from_gets(MaybeGet::new(forward), Get::new(backward))
    }

    /// Pairs an existing partial forward read with a backward read.
    pub fn from_gets(forward: MaybeGet<A, B>, backward: Get<B, A>) -> Self {
        let extensions = forward.extensions().combine(backward.extensions());
        Self::assemble(forward, backward, extensions)
    }

    pub(crate) fn assemble(
        forward: MaybeGet<A, B>,
        backward: Get<B, A>,
        extensions: Extensions,
    ) -> Self {
        let forward = forward.extend_with(&extensions);
        let backward = backward.extend_with(&extensions);
        let present = forward.reader();
        let reader = backward.reader();
        let set = Set::from_writer(
            Writer::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, focus: B| {
                    if present.call(subject, params).is_some() {
                        reader.call(&focus, params)
                    } else {
                        subject.clone()
                    }
                },
            )),
            forward.required_params().union(backward.required_params()),
            extensions.clone(),
        );
        let modify = Modify::from_maybe_get_set(&forward, &set);
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

    /// Converts forward, or `None` if the subject does not convert.
    pub fn get(&self, subject: &A, params: &Params) -> Option<B> {
        self.forward.get(subject, params)
    }

    /// Converts backward.
    pub fn reverse_get(&self, focus: &B, params: &Params) -> A {
        self.backward.get(focus, params)
    }

    /// Replaces a convertible subject with `focus` converted backward.
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
    pub const fn forward(&self) -> &MaybeGet<A, B> {
        &self.forward
    }

    /// The backward conversion.
    pub const fn backward(&self) -> &Get<B, A> {
        &self.backward
    }

    /// The derived conditional write.
    pub const fn setter(&self) -> &Set<A, B> {
        &self.set
    }

    /// The derived update.
    pub const fn modifier(&self) -> &Modify<A, B> {
        &self.modify
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tags of this optic.
    pub const fn shape(&self) -> Shape {
        Shape::new(Capability::Convert, Risk::Maybe)
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
    // Defaults
    // =========================================================================

    /// Converts to `default` when the forward conversion finds nothing.
    ///
    /// The backward direction is unchanged.
    pub fn with_default(&self, default: &Get<A, B>) -> Converter<A, B> {
        Converter::assemble(
            self.forward.with_default(default),
            self.backward.clone(),
            self.extensions.clone(),
        )
    }

    /// Converts to a fixed value when the forward conversion finds nothing.
    pub fn with_default_value(&self, default: B) -> Converter<A, B> {
        Converter::assemble(
            self.forward.with_default_value(default),
            self.backward.clone(),
            self.extensions.clone(),
        )
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Composes with any optic; the result always has `Maybe` risk.
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

    /// Focuses into the converted value, when there is one.
    pub fn compose_selector<C: Data>(&self, other: &Selector<B, C>) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.forward.compose_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Focuses into the converted value, where both steps may find nothing.
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
    pub fn compose_converter<C: Data>(&self, other: &Converter<B, C>) -> MaybeConverter<A, C> {
        MaybeConverter::assemble(
            self.forward.compose_get(other.forward()),
            chain_backward(other.backward(), &self.backward, &self.extensions),
            self.extensions.clone(),
        )
    }

    /// Converts twice, where either step may fail.
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

impl<A: Data, B: Data + Merge> MaybeConverter<A, B> {
    /// Shallow-overlays `patch` on the converted value, if there is one.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.merge(subject, params, patch)
    }

    /// Recursively overlays `patch` on the converted value, if there is one.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.deep_merge(subject, params, patch)
    }
}
