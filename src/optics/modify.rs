//! Read-transform-write accessors.
//!
//! A [`Modify`] applies a function to the focus and writes the result back.
//! It is usually derived from a read and a write with
//! [`Modify::from_get_set`] or [`Modify::from_maybe_get_set`]; the latter does
//! nothing when the focus is absent.
//!
//! Composing two modifies nests the update functions, outer around inner.
//! Composing a modify with a [`Set`] yields a `Set` that feeds the focus the
//! outer modify would have updated into the inner write.

use std::fmt;

use super::discriminant::{NodeId, NodeKind};
use super::extension::{ExtensionRef, Extensions};
use super::get::Get;
use super::maybe_get::MaybeGet;
use super::merge::Merge;
use super::node::{ParamsFn, Primitive, Updater, Writer, preserve_identity};
use super::params::{Params, RequiredParams};
use super::set::Set;
use super::update::Update;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A parameterized update of a focus `B` within a subject `A`.
///
/// # Examples
///
/// ```
/// use bifocal::optics::{Get, Modify, Params, Set};
///
/// let first = Get::new(|pair: &(i32, i32), _: &Params| pair.0);
/// let set_first = Set::new(|pair: &(i32, i32), _: &Params, value: i32| (value, pair.1));
/// let modify_first = Modify::from_get_set(&first, &set_first);
///
/// assert_eq!(modify_first.modify(&(1, 2), &Params::EMPTY, |value| value + 10), (11, 2));
/// ```
pub struct Modify<A, B> {
    core: Primitive<Updater<A, B>>,
}

impl<A, B> Clone for Modify<A, B> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<A, B> fmt::Debug for Modify<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Modify")
            .field("id", &self.core.id())
            .field("required", self.core.required())
            .finish()
    }
}

impl<A: Data, B: Data> Modify<A, B> {
    /// The kind of every `Modify`.
    pub const KIND: NodeKind = NodeKind::Modify;

    /// Creates a `Modify` from an update function.
    ///
    /// # Arguments
    ///
    /// * `update` - Receives the subject, the parameters and the function to
    ///   apply to the focus, and returns the updated subject
    pub fn new<F>(update: F) -> Self
    where
        F: Fn(&A, &Params, &dyn Fn(B) -> B) -> A + Shareable + 'static,
    {
        Self::from_updater(
            Updater::new(ReferenceCounter::new(update)),
            RequiredParams::new(),
            Extensions::none(),
        )
    }

    pub(crate) fn from_updater(
        updater: Updater<A, B>,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self {
        Self::from_core(Primitive::build(Self::KIND, updater, required, extensions))
    }

    const fn from_core(core: Primitive<Updater<A, B>>) -> Self {
        Self { core }
    }

    pub(crate) fn updater(&self) -> Updater<A, B> {
        self.core.underlying().clone()
    }

    /// Reads the focus with `get`, updates it, and writes it back with `set`.
    ///
    /// The result carries the extensions of both constituents.
    pub fn from_get_set(get: &Get<A, B>, set: &Set<A, B>) -> Self {
        let reader = get.reader();
        let writer = set.writer();
        Self::from_updater(
            Updater::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, update: &dyn Fn(B) -> B| {
                    writer.call(subject, params, update(reader.call(subject, params)))
                },
            )),
            get.required_params().union(set.required_params()),
            get.extensions().combine(set.extensions()),
        )
    }

    /// Like [`from_get_set`](Self::from_get_set), but leaves the subject
    /// unchanged when the focus is absent.
    pub fn from_maybe_get_set(get: &MaybeGet<A, B>, set: &Set<A, B>) -> Self {
        let reader = get.reader();
        let writer = set.writer();
        Self::from_updater(
            Updater::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, update: &dyn Fn(B) -> B| match reader
                    .call(subject, params)
                {
                    Some(focus) => writer.call(subject, params, update(focus)),
                    None => subject.clone(),
                },
            )),
            get.required_params().union(set.required_params()),
            get.extensions().combine(set.extensions()),
        )
    }

    /// Applies `function` to the focus.
    pub fn modify<F>(&self, subject: &A, params: &Params, function: F) -> A
    where
        F: Fn(B) -> B,
    {
        preserve_identity(
            subject,
            self.core.underlying().call(subject, params, &function),
        )
    }

    /// Nests `other`'s update inside this one.
    pub fn compose_modify<C: Data>(&self, other: &Modify<B, C>) -> Modify<A, C> {
        let outer = self.updater();
        let inner = other.updater();
        Modify::from_updater(
            Updater::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, update: &dyn Fn(C) -> C| {
                    outer.call(subject, params, &|focus: B| {
                        inner.call(&focus, params, update)
                    })
                },
            )),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Writes through `other` into the focus this modify would update.
    pub fn compose_set<C: Data>(&self, other: &Set<B, C>) -> Set<A, C> {
        let outer = self.updater();
        let inner = other.writer();
        Set::from_writer(
            Writer::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, value: C| {
                    outer.call(subject, params, &|focus: B| {
                        inner.call(&focus, params, value.clone())
                    })
                },
            )),
            self.required_params().union(other.required_params()),
            self.extensions().clone(),
        )
    }

    /// Captures `function` as a reusable [`Update`] of the subject.
    pub fn to_update<F>(&self, function: F) -> Update<A>
    where
        F: Fn(B) -> B + Shareable + 'static,
    {
        let modify = self.clone();
        Update::with_required(
            move |subject: &A, params: &Params| modify.modify(subject, params, &function),
            self.required_params().clone(),
        )
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.core.id()
    }

    /// Parameter names this update reads.
    pub const fn required_params(&self) -> &RequiredParams {
        self.core.required()
    }

    /// Extensions attached to this node.
    pub const fn extensions(&self) -> &Extensions {
        self.core.extensions()
    }

    /// Declares that this update reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        Self::from_core(self.core.require(name))
    }

    /// Requires `required` instead, passing `transform(params)` to the update.
    #[must_use]
    pub fn map_params<F>(&self, required: RequiredParams, transform: F) -> Self
    where
        F: Fn(&Params) -> Params + Shareable + 'static,
    {
        let transform: ParamsFn = ReferenceCounter::new(transform);
        Self::from_core(self.core.map_params(required, transform))
    }

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
}

impl<A: Data, B: Data + Merge> Modify<A, B> {
    /// Shallow-overlays `patch` on the focus.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify(subject, params, |focus| focus.merge(patch))
    }

    /// Recursively overlays `patch` on the focus.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify(subject, params, |focus| focus.deep_merge(patch))
    }
}
