//! Write accessors.

use std::fmt;

use super::discriminant::{NodeId, NodeKind};
use super::extension::{ExtensionRef, Extensions};
use super::get::Get;
use super::node::{ParamsFn, Primitive, Writer, preserve_identity};
use super::params::{Params, RequiredParams};
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A parameterized write of a focus `B` into a subject `A`.
///
/// Writes never mutate the subject. When the written result equals the
/// subject, the subject itself is returned, so reference-counted subjects
/// keep their identity across no-op writes.
///
/// # Examples
///
/// ```
/// use bifocal::optics::{Params, Set};
///
/// let set_x = Set::new(|point: &(i32, i32), _: &Params, x: i32| (x, point.1));
/// assert_eq!(set_x.set(&(1, 2), &Params::EMPTY, 5), (5, 2));
/// ```
pub struct Set<A, B> {
    core: Primitive<Writer<A, B>>,
}

impl<A, B> Clone for Set<A, B> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<A, B> fmt::Debug for Set<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Set")
            .field("id", &self.core.id())
            .field("required", self.core.required())
            .finish()
    }
}

impl<A: Data, B: Data> Set<A, B> {
    /// The kind of every `Set`.
    pub const KIND: NodeKind = NodeKind::Set;

    /// Creates a `Set` from a write function.
    pub fn new<F>(write: F) -> Self
    where
        F: Fn(&A, &Params, B) -> A + Shareable + 'static,
    {
        Self::from_writer(
            Writer::new(ReferenceCounter::new(write)),
            RequiredParams::new(),
            Extensions::none(),
        )
    }

    pub(crate) fn from_writer(
        writer: Writer<A, B>,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self {
        Self::from_core(Primitive::build(Self::KIND, writer, required, extensions))
    }

    const fn from_core(core: Primitive<Writer<A, B>>) -> Self {
        Self { core }
    }

    pub(crate) fn writer(&self) -> Writer<A, B> {
        self.core.underlying().clone()
    }

    /// Writes `focus` into `subject`.
    pub fn set(&self, subject: &A, params: &Params, focus: B) -> A {
        preserve_identity(subject, self.core.underlying().call(subject, params, focus))
    }

    /// Accepts a `C` instead, converting it through `get` before writing.
    pub fn compose<C: Data>(&self, get: &Get<C, B>) -> Set<A, C> {
        let writer = self.writer();
        let reader = get.reader();
        Set::from_writer(
            Writer::new(ReferenceCounter::new(
                move |subject: &A, params: &Params, focus: C| {
                    writer.call(subject, params, reader.call(&focus, params))
                },
            )),
            self.required_params().union(get.required_params()),
            self.extensions().clone(),
        )
    }

    /// Identifier of this node.
    pub const fn id(&self) -> NodeId {
        self.core.id()
    }

    /// Parameter names this write reads.
    pub const fn required_params(&self) -> &RequiredParams {
        self.core.required()
    }

    /// Extensions attached to this node.
    pub const fn extensions(&self) -> &Extensions {
        self.core.extensions()
    }

    /// Declares that this write reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        Self::from_core(self.core.require(name))
    }

    /// Requires `required` instead, passing `transform(params)` to the write.
    #[must_use]
    pub fn map_params<F>(&self, required: RequiredParams, transform: F) -> Self
    where
        F: Fn(&Params) -> Params + Shareable + 'static,
    {
        let transform: ParamsFn = ReferenceCounter::new(transform);
        Self::from_core(self.core.map_params(required, transform))
    }

    pub(crate) fn map_params_fn(&self, required: RequiredParams, transform: ParamsFn) -> Self {
        Self::from_core(self.core.map_params(required, transform))
    }

    pub(crate) fn supply(&self, supplied: &Params) -> Self {
        Self::from_core(self.core.supply(supplied))
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
