//! Cross-cutting behavior attached to optic nodes.
//!
//! An [`Extension`] is called exactly once for every node created while it is
//! attached: when the node is built from raw functions, when it is the result
//! of a composition, and when `extend` rebuilds it. For primitive nodes
//! (`Get`, `MaybeGet`, `Set`, `Modify`) it may install an [`Interceptor`]
//! that wraps the node's underlying function. It can never change the node's
//! kind or tags.
//!
//! Extensions are tracked in an ordered, deduplicated [`Extensions`] set.
//! Every node keeps its raw function next to the set, so extending a node
//! again rebuilds it from the raw function with the union of extensions and
//! an extension reachable through several composition paths still wraps each
//! node once.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use bifocal::optics::{extension, Get, Params};
//!
//! let created = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&created);
//! let counting = extension::from_fn(move |_node| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let length = Get::new(|text: &String, _: &Params| text.len()).extend(counting);
//! assert_eq!(length.get(&"four".to_string(), &Params::EMPTY), 4);
//! assert_eq!(created.load(Ordering::SeqCst), 1);
//! ```

use std::any::Any;
use std::fmt;

use smallvec::SmallVec;

use super::discriminant::{NodeId, NodeKind, Shape};
use super::params::Params;
use crate::shared::{Data, ReferenceCounter, Shareable};

// =============================================================================
// Type-erased data
// =============================================================================

/// A type-erased subject, focus or result seen by an [`Interceptor`].
pub trait Datum: fmt::Debug + Shareable {
    /// The value as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts a boxed datum into a boxed `Any`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Clones into a new box.
    fn clone_datum(&self) -> Box<dyn Datum>;

    /// Value equality across the erased type; `false` if the types differ.
    fn equals(&self, other: &dyn Datum) -> bool;
}

impl<T: Data> Datum for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_datum(&self) -> Box<dyn Datum> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn Datum) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// The result of a primitive call, as seen by an [`Interceptor`].
///
/// An outcome can only be obtained from the `proceed` callback or by cloning
/// an earlier outcome, so interceptors cannot change the type of value that
/// flows out of a node.
pub struct Outcome(Box<dyn Datum>);

impl Outcome {
    pub(crate) fn new<T: Data>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The produced value.
    pub fn value(&self) -> &dyn Datum {
        self.0.as_ref()
    }

    /// Borrows the produced value as `T`, if that is its type.
    pub fn downcast_ref<T: Data>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    pub(crate) fn take<T: Data>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|value| *value)
    }
}

impl Clone for Outcome {
    fn clone(&self) -> Self {
        Self(self.0.clone_datum())
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Outcome").field(&self.0).finish()
    }
}

// =============================================================================
// Call
// =============================================================================

/// One invocation of a primitive node's underlying function.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    node: NodeId,
    kind: NodeKind,
    subject: &'a dyn Datum,
    params: &'a Params,
    focus: Option<&'a dyn Datum>,
}

impl<'a> Call<'a> {
    pub(crate) fn new(
        node: NodeId,
        kind: NodeKind,
        subject: &'a dyn Datum,
        params: &'a Params,
        focus: Option<&'a dyn Datum>,
    ) -> Self {
        Self {
            node,
            kind,
            subject,
            params,
            focus,
        }
    }

    /// The node being called.
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Kind of the node being called.
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The subject passed in.
    pub const fn subject(&self) -> &'a dyn Datum {
        self.subject
    }

    /// The parameters passed in.
    pub const fn params(&self) -> &'a Params {
        self.params
    }

    /// The focus being written, for `Set` nodes.
    pub const fn focus(&self) -> Option<&'a dyn Datum> {
        self.focus
    }
}

// =============================================================================
// Interceptor
// =============================================================================

/// Wraps the underlying function of a primitive node.
///
/// `proceed` runs the wrapped function (or the next interceptor). It may be
/// called any number of times, including zero.
pub trait Interceptor: Shareable {
    /// Handles one call.
    fn intercept(&self, call: &Call<'_>, proceed: &mut dyn FnMut() -> Outcome) -> Outcome;
}

/// Shared handle to an [`Interceptor`].
pub type InterceptorRef = ReferenceCounter<dyn Interceptor>;

// =============================================================================
// Node
// =============================================================================

pub(crate) trait Install {
    fn install(&mut self, interceptor: InterceptorRef);
}

/// A freshly created node, as presented to [`Extension::apply`].
pub struct Node<'a> {
    id: NodeId,
    kind: NodeKind,
    slot: Option<&'a mut dyn Install>,
}

impl<'a> Node<'a> {
    pub(crate) fn primitive(id: NodeId, kind: NodeKind, slot: &'a mut dyn Install) -> Self {
        Self {
            id,
            kind,
            slot: Some(slot),
        }
    }

    pub(crate) const fn composite(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            slot: None,
        }
    }

    /// Identifier of the node.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Kind of the node.
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Tags of the node; `None` for `Set` and `Modify`.
    pub const fn shape(&self) -> Option<Shape> {
        self.kind.shape()
    }

    /// Returns `true` if the node has an underlying function to intercept.
    pub const fn is_primitive(&self) -> bool {
        self.slot.is_some()
    }

    /// Wraps the node's underlying function with `interceptor`.
    ///
    /// Interceptors installed later wrap earlier ones. Returns `false`, and
    /// installs nothing, for composite nodes.
    pub fn intercept(&mut self, interceptor: InterceptorRef) -> bool {
        match self.slot.as_mut() {
            Some(slot) => {
                slot.install(interceptor);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("primitive", &self.is_primitive())
            .finish()
    }
}

// =============================================================================
// Extension
// =============================================================================

/// A callback run once per freshly created node.
pub trait Extension: Shareable {
    /// Inspects `node` and optionally intercepts it.
    fn apply(&self, node: &mut Node<'_>);
}

/// Shared handle to an [`Extension`]. Identity is the allocation.
pub type ExtensionRef = ReferenceCounter<dyn Extension>;

struct FunctionExtension<F>(F);

impl<F> Extension for FunctionExtension<F>
where
    F: Fn(&mut Node<'_>) + Shareable,
{
    fn apply(&self, node: &mut Node<'_>) {
        (self.0)(node);
    }
}

/// Creates an extension from a closure.
pub fn from_fn<F>(function: F) -> ExtensionRef
where
    F: Fn(&mut Node<'_>) + Shareable + 'static,
{
    ReferenceCounter::new(FunctionExtension(function))
}

// =============================================================================
// Extensions
// =============================================================================

/// An ordered set of extensions, deduplicated by identity.
#[derive(Clone, Default)]
pub struct Extensions {
    entries: SmallVec<[ExtensionRef; 2]>,
}

impl Extensions {
    /// The empty set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A set holding one extension.
    #[must_use]
    pub fn of(extension: ExtensionRef) -> Self {
        Self::none().with(extension)
    }

    /// Returns `true` if this exact extension is in the set.
    pub fn contains(&self, extension: &ExtensionRef) -> bool {
        self.entries.iter().any(|entry| same_extension(entry, extension))
    }

    /// Returns the set with `extension` appended, unless already present.
    #[must_use]
    pub fn with(&self, extension: ExtensionRef) -> Self {
        let mut combined = self.clone();
        if !combined.contains(&extension) {
            combined.entries.push(extension);
        }
        combined
    }

    /// Union of both sets, keeping `self`'s order first.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        other
            .entries
            .iter()
            .fold(self.clone(), |combined, extension| {
                combined.with(ReferenceCounter::clone(extension))
            })
    }

    /// Returns `true` if every extension in `other` is already here.
    pub fn includes(&self, other: &Self) -> bool {
        other.entries.iter().all(|extension| self.contains(extension))
    }

    /// Number of extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no extensions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in application order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionRef> {
        self.entries.iter()
    }

    /// Runs every extension against `node`, in order.
    pub fn apply(&self, node: &mut Node<'_>) {
        for extension in &self.entries {
            extension.apply(node);
        }
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Extensions")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl From<ExtensionRef> for Extensions {
    fn from(extension: ExtensionRef) -> Self {
        Self::of(extension)
    }
}

fn same_extension(left: &ExtensionRef, right: &ExtensionRef) -> bool {
    std::ptr::addr_eq(
        ReferenceCounter::as_ptr(left),
        ReferenceCounter::as_ptr(right),
    )
}

/// Assigns an id to a new composite node and runs `extensions` against it.
pub(crate) fn register_composite(kind: NodeKind, extensions: &Extensions) -> NodeId {
    let id = NodeId::fresh();
    if !extensions.is_empty() {
        extensions.apply(&mut Node::composite(id, kind));
        tracing::trace!(node = %id, %kind, extensions = extensions.len(), "created composite node");
    }
    id
}
