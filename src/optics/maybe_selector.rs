//! Read-write optics whose focus may be absent.
//!
//! A [`MaybeSelector`] reads with a [`MaybeGet`] and writes with a plain
//! [`Set`]. What a write does when the focus is absent is up to the write
//! function: key-indexed access inserts the key, for example. Updates through
//! [`modify`](MaybeSelector::modify) never run when the focus is absent.
//!
//! [`with_default`](MaybeSelector::with_default) and
//! [`with_default_value`](MaybeSelector::with_default_value) turn a
//! `MaybeSelector` into a [`Selector`] by substituting a default on the read
//! path only. Writing through the result is exactly the original write.

use std::fmt;

use super::converter::Converter;
use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions, register_composite};
use super::get::Get;
use super::maybe_converter::MaybeConverter;
use super::maybe_get::MaybeGet;
use super::memoize::Memoize;
use super::merge::Merge;
use super::modify::Modify;
use super::node::ParamsFn;
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::selector::Selector;
use super::set::Set;
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A read-write optic whose focus may be absent.
///
/// # Examples
///
/// ```
/// use bifocal::access::index_by;
/// use bifocal::{params, record};
/// use bifocal::value::Value;
///
/// let by_key = index_by("key");
/// let subject = record! { "a" => 1, "b" => 2 };
/// let key_c = params! { "key" => "c" };
///
/// assert_eq!(by_key.get(&subject, &key_c), None);
/// assert_eq!(
///     by_key.set(&subject, &key_c, Value::from(2)),
///     record! { "a" => 1, "b" => 2, "c" => 2 }
/// );
/// ```
pub struct MaybeSelector<A, B> {
    id: NodeId,
    get: MaybeGet<A, B>,
    set: Set<A, B>,
    modify: Modify<A, B>,
    extensions: Extensions,
}

impl<A, B> Clone for MaybeSelector<A, B> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            get: self.get.clone(),
            set: self.set.clone(),
            modify: self.modify.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

impl<A: Data, B: Data> fmt::Debug for MaybeSelector<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MaybeSelector")
            .field("id", &self.id)
            .field("get", &self.get)
            .field("set", &self.set)
            .finish_non_exhaustive()
    }
}

impl<A: Data, B: Data> MaybeSelector<A, B> {
    /// The kind of every `MaybeSelector`.
    pub const KIND: NodeKind = NodeKind::MaybeSelector;

    /// Creates a selector from a partial read and a write function.
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&A, &Params) -> Option<B> + Shareable + 'static,
        W: Fn(&A, &Params, B) -> A + Shareable + 'static,
    {
        Self::from_parts(MaybeGet::new(read), Set::new(write))
    }

    /// Pairs an existing partial read and write.
    pub fn from_parts(get: MaybeGet<A, B>, set: Set<A, B>) -> Self {
        let extensions = get.extensions().combine(set.extensions());
        Self::assemble(get, set, extensions)
    }

    pub(crate) fn assemble(get: MaybeGet<A, B>, set: Set<A, B>, extensions: Extensions) -> Self {
        let get = get.extend_with(&extensions);
        let set = set.extend_with(&extensions);
        let modify = Modify::from_maybe_get_set(&get, &set);
        Self {
            id: register_composite(Self::KIND, &extensions),
            get,
            set,
            modify,
            extensions,
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Reads the focus, or `None` if it is absent.
    pub fn get(&self, subject: &A, params: &Params) -> Option<B> {
        self.get.get(subject, params)
    }

    /// Writes the focus.
    pub fn set(&self, subject: &A, params: &Params, focus: B) -> A {
        self.set.set(subject, params, focus)
    }

    /// Updates a present focus; returns the subject unchanged otherwise.
    pub fn modify<F>(&self, subject: &A, params: &Params, function: F) -> A
    where
        F: Fn(B) -> B,
    {
        self.modify.modify(subject, params, function)
    }

    /// The read half.
    pub const fn getter(&self) -> &MaybeGet<A, B> {
        &self.get
    }

    /// The write half.
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
        Shape::new(Capability::Select, Risk::Maybe)
    }

    /// Parameter names this optic reads.
    pub fn required_params(&self) -> RequiredParams {
        self.get.required_params().union(self.set.required_params())
    }

    /// Extensions attached to this node.
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    /// Reads `default` when the focus is absent. Writes are unchanged.
    pub fn with_default(&self, default: &Get<A, B>) -> Selector<A, B> {
        Selector::assemble(
            self.get.with_default(default),
            self.set.clone(),
            self.extensions.clone(),
        )
    }

    /// Reads `default` when the focus is absent. Writes are unchanged.
    pub fn with_default_value(&self, default: B) -> Selector<A, B> {
        Selector::assemble(
            self.get.with_default_value(default),
            self.set.clone(),
            self.extensions.clone(),
        )
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Composes with any optic; the result always has `Maybe` risk.
    pub fn compose<C: Data>(&self, other: impl Into<Optic<B, C>>) -> Optic<A, C> {
        match other.into() {
            Optic::Get(other) => self.compose_get(&other).into(),
            Optic::MaybeGet(other) => self.compose_maybe_get(&other).into(),
            Optic::Selector(other) => self.compose_selector(&other).into(),
            Optic::MaybeSelector(other) => self.compose_maybe_selector(&other).into(),
            Optic::Converter(other) => self.compose_converter(&other).into(),
            Optic::MaybeConverter(other) => self.compose_maybe_converter(&other).into(),
        }
    }

    /// Drops the write path and reads through `other`.
    pub fn compose_get<C: Data>(&self, other: &Get<B, C>) -> MaybeGet<A, C> {
        self.get.compose_get(other)
    }

    /// Drops the write path and reads through `other`.
    pub fn compose_maybe_get<C: Data>(&self, other: &MaybeGet<B, C>) -> MaybeGet<A, C> {
        self.get.compose_maybe_get(other)
    }

    /// Focuses further into a present focus.
    ///
    /// Writing is a no-op when this selector's focus is absent.
    pub fn compose_selector<C: Data>(&self, other: &Selector<B, C>) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.get.compose_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Focuses further into a present focus.
    pub fn compose_maybe_selector<C: Data>(
        &self,
        other: &MaybeSelector<B, C>,
    ) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.get.compose_maybe_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Views the focus through a conversion.
    ///
    /// Writing converts backward and then writes, like [`set`](Self::set).
    pub fn compose_converter<C: Data>(&self, other: &Converter<B, C>) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.get.compose_get(other.forward()),
            self.set.compose(other.backward()),
            self.extensions.clone(),
        )
    }

    /// Views the focus through a conversion that may fail.
    pub fn compose_maybe_converter<C: Data>(
        &self,
        other: &MaybeConverter<B, C>,
    ) -> MaybeSelector<A, C> {
        MaybeSelector::assemble(
            self.get.compose_maybe_get(other.forward()),
            self.set.compose(other.backward()),
            self.extensions.clone(),
        )
    }

    /// Narrows a present focus to a sub-variant.
    pub fn choose<C, N, W>(&self, narrow: N, widen: W) -> MaybeSelector<A, C>
    where
        C: Data,
        N: Fn(&B) -> Option<C> + Shareable + 'static,
        W: Fn(C) -> B + Shareable + 'static,
    {
        self.compose_maybe_converter(&MaybeConverter::new(
            move |focus: &B, _: &Params| narrow(focus),
            move |variant: &C, _: &Params| widen(variant.clone()),
        ))
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Declares that this optic reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        Self::assemble(
            self.get.require(name),
            self.set.require(name),
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
            self.get.map_params_fn(required.clone(), transform.clone()),
            self.set.map_params_fn(required, transform),
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
            self.get.supply(supplied),
            self.set.supply(supplied),
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

    /// Attaches an extension to this selector and its constituents.
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
            self.get.clone(),
            self.set.clone(),
            self.extensions.combine(extensions),
        )
    }

    /// Caches the most recent read.
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

impl<A: Data, B: Data + Merge> MaybeSelector<A, B> {
    /// Shallow-overlays `patch` on a present focus.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.merge(subject, params, patch)
    }

    /// Recursively overlays `patch` on a present focus.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.deep_merge(subject, params, patch)
    }
}

impl<A: Data, C: Data> MaybeSelector<A, Option<C>> {
    /// Treats a present `None` as absent too; writing stores `Some`.
    pub fn if_defined(&self) -> MaybeSelector<A, C> {
        self.choose(|focus: &Option<C>| focus.clone(), Some)
    }
}
