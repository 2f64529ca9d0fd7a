//! Read accessors whose focus may be absent.
//!
//! A [`MaybeGet`] returns `None` when the focus is not there. Absence is an
//! ordinary outcome: every composition that starts from a `MaybeGet` stops at
//! the first absent stage without evaluating the rest.

use std::fmt;

use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions};
use super::get::Get;
use super::memoize::Memoize;
use super::node::{ParamsFn, Primitive, Reader};
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A parameterized read that may find nothing.
///
/// # Examples
///
/// ```
/// use bifocal::optics::{MaybeGet, Params};
///
/// let head = MaybeGet::new(|items: &Vec<i32>, _: &Params| items.first().copied());
///
/// assert_eq!(head.get(&vec![3, 4], &Params::EMPTY), Some(3));
/// assert_eq!(head.get(&vec![], &Params::EMPTY), None);
/// assert_eq!(head.with_default_value(0).get(&vec![], &Params::EMPTY), 0);
/// ```
pub struct MaybeGet<A, B> {
    core: Primitive<Reader<A, Option<B>>>,
}

impl<A, B> Clone for MaybeGet<A, B> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<A, B> fmt::Debug for MaybeGet<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MaybeGet")
            .field("id", &self.core.id())
            .field("required", self.core.required())
            .finish()
    }
}

impl<A: Data, B: Data> MaybeGet<A, B> {
    /// The kind of every `MaybeGet`.
    pub const KIND: NodeKind = NodeKind::MaybeGet;

    /// Creates a `MaybeGet` from a read function returning `None` on absence.
    pub fn new<F>(read: F) -> Self
    where
        F: Fn(&A, &Params) -> Option<B> + Shareable + 'static,
    {
        Self::from_reader(
            Reader::new(ReferenceCounter::new(read)),
            RequiredParams::new(),
            Extensions::none(),
        )
    }

    pub(crate) fn from_reader(
        reader: Reader<A, Option<B>>,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self {
        Self::from_core(Primitive::build(Self::KIND, reader, required, extensions))
    }

    const fn from_core(core: Primitive<Reader<A, Option<B>>>) -> Self {
        Self { core }
    }

    pub(crate) fn reader(&self) -> Reader<A, Option<B>> {
        self.core.underlying().clone()
    }

    /// Reads the focus, or `None` if it is absent.
    pub fn get(&self, subject: &A, params: &Params) -> Option<B> {
        self.core.underlying().call(subject, params)
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.core.id()
    }

    /// Tags of this optic.
    pub const fn shape(&self) -> Shape {
        Shape::new(Capability::Get, Risk::Maybe)
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
    /// The result is always a `MaybeGet`.
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

    /// Reads through `self`, then through `other` if a focus was found.
    pub fn compose_get<C: Data>(&self, other: &Get<B, C>) -> MaybeGet<A, C> {
        let outer = self.reader();
        let inner = other.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                outer
                    .call(subject, params)
                    .map(|focus| inner.call(&focus, params))
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Reads through `self`, then through `other` if a focus was found.
    pub fn compose_maybe_get<C: Data>(&self, other: &MaybeGet<B, C>) -> MaybeGet<A, C> {
        let outer = self.reader();
        let inner = other.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                outer
                    .call(subject, params)
                    .and_then(|focus| inner.call(&focus, params))
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    // =========================================================================
    // Focus transformations
    // =========================================================================

    /// Post-transforms a present focus.
    pub fn map<C, F>(&self, function: F) -> MaybeGet<A, C>
    where
        C: Data,
        F: Fn(B, &Params) -> C + Shareable + 'static,
    {
        let reader = self.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                reader
                    .call(subject, params)
                    .map(|focus| function(focus, params))
            })),
            self.required_params().clone(),
            self.extensions().clone(),
        )
    }

    /// Pairs both foci; absent if either side is absent.
    pub fn combine<C: Data>(&self, other: &MaybeGet<A, C>) -> MaybeGet<A, (B, C)> {
        let left = self.reader();
        let right = other.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                left.call(subject, params)
                    .zip(right.call(subject, params))
            })),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Narrows a present focus; absent when `narrow` rejects it.
    pub fn choose<C, F>(&self, narrow: F) -> MaybeGet<A, C>
    where
        C: Data,
        F: Fn(&B) -> Option<C> + Shareable + 'static,
    {
        self.compose_maybe_get(&MaybeGet::new(move |focus: &B, _: &Params| narrow(focus)))
    }

    /// Substitutes `default` when the focus is absent.
    pub fn with_default(&self, default: &Get<A, B>) -> Get<A, B> {
        let reader = self.reader();
        let fallback = default.reader();
        Get::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                reader
                    .call(subject, params)
                    .unwrap_or_else(|| fallback.call(subject, params))
            })),
            self.required_params().union(default.required_params()),
            self.extensions().clone(),
        )
    }

    /// Substitutes a fixed value when the focus is absent.
    pub fn with_default_value(&self, default: B) -> Get<A, B> {
        self.with_default(&Get::new(move |_: &A, _: &Params| default.clone()))
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

impl<A: Data> MaybeGet<A, A> {
    /// Always finds the subject itself.
    pub fn identity() -> Self {
        Self::new(|subject: &A, _: &Params| Some(subject.clone()))
    }
}

impl<A: Data, C: Data> MaybeGet<A, Option<C>> {
    /// Treats a present `None` as absent too.
    pub fn if_defined(&self) -> MaybeGet<A, C> {
        let reader = self.reader();
        MaybeGet::from_reader(
            Reader::new(ReferenceCounter::new(move |subject: &A, params: &Params| {
                reader.call(subject, params).flatten()
            })),
            self.required_params().clone(),
            self.extensions().clone(),
        )
    }
}
