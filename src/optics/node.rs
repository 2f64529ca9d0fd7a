//! Function aliases and the shared core of primitive nodes.

use super::discriminant::{NodeId, NodeKind};
use super::extension::{Call, Datum, Extensions, Install, InterceptorRef, Node, Outcome};
use super::params::{Params, RequiredParams};
use crate::shared::{Data, ReferenceCounter};

// =============================================================================
// Function Aliases
// =============================================================================

/// Underlying function of a read node.
#[cfg(not(feature = "arc"))]
pub type ReadFn<A, B> = ReferenceCounter<dyn Fn(&A, &Params) -> B>;

/// Underlying function of a write node.
#[cfg(not(feature = "arc"))]
pub type WriteFn<A, B> = ReferenceCounter<dyn Fn(&A, &Params, B) -> A>;

/// Underlying function of an update node.
#[cfg(not(feature = "arc"))]
pub type UpdateFn<A, B> = ReferenceCounter<dyn Fn(&A, &Params, &dyn Fn(B) -> B) -> A>;

/// Parameter transformation used by `map_params`.
#[cfg(not(feature = "arc"))]
pub type ParamsFn = ReferenceCounter<dyn Fn(&Params) -> Params>;

/// Underlying function of a read node.
#[cfg(feature = "arc")]
pub type ReadFn<A, B> = ReferenceCounter<dyn Fn(&A, &Params) -> B + Send + Sync>;

/// Underlying function of a write node.
#[cfg(feature = "arc")]
pub type WriteFn<A, B> = ReferenceCounter<dyn Fn(&A, &Params, B) -> A + Send + Sync>;

/// Underlying function of an update node.
#[cfg(feature = "arc")]
pub type UpdateFn<A, B> =
    ReferenceCounter<dyn Fn(&A, &Params, &dyn Fn(B) -> B) -> A + Send + Sync>;

/// Parameter transformation used by `map_params`.
#[cfg(feature = "arc")]
pub type ParamsFn = ReferenceCounter<dyn Fn(&Params) -> Params + Send + Sync>;

/// Returns `subject` itself when `next` is equal to it.
///
/// Reference-counted subjects keep their allocation, so callers can detect a
/// no-op write by identity.
pub(crate) fn preserve_identity<A: Data>(subject: &A, next: A) -> A {
    if next == *subject {
        subject.clone()
    } else {
        next
    }
}

// =============================================================================
// Underlying
// =============================================================================

/// A function that can sit inside a primitive node.
pub(crate) trait Underlying: Clone + 'static {
    /// Wraps the function so every call goes through `interceptor`.
    fn intercepted(&self, id: NodeId, kind: NodeKind, interceptor: InterceptorRef) -> Self;

    /// Wraps the function so it receives `transform(params)`.
    fn with_params_fn(&self, transform: ParamsFn) -> Self;
}

/// Read function held by `Get` and `MaybeGet` nodes.
pub(crate) struct Reader<A, B>(ReadFn<A, B>);

/// Write function held by `Set` nodes.
pub(crate) struct Writer<A, B>(WriteFn<A, B>);

/// Update function held by `Modify` nodes.
pub(crate) struct Updater<A, B>(UpdateFn<A, B>);

impl<A, B> Clone for Reader<A, B> {
    fn clone(&self) -> Self {
        Self(ReferenceCounter::clone(&self.0))
    }
}

impl<A, B> Clone for Writer<A, B> {
    fn clone(&self) -> Self {
        Self(ReferenceCounter::clone(&self.0))
    }
}

impl<A, B> Clone for Updater<A, B> {
    fn clone(&self) -> Self {
        Self(ReferenceCounter::clone(&self.0))
    }
}

impl<A: Data, B: Data> Reader<A, B> {
    pub(crate) const fn new(function: ReadFn<A, B>) -> Self {
        Self(function)
    }

    pub(crate) fn call(&self, subject: &A, params: &Params) -> B {
        (self.0)(subject, params)
    }
}

impl<A: Data, B: Data> Writer<A, B> {
    pub(crate) const fn new(function: WriteFn<A, B>) -> Self {
        Self(function)
    }

    pub(crate) fn call(&self, subject: &A, params: &Params, focus: B) -> A {
        (self.0)(subject, params, focus)
    }
}

impl<A: Data, B: Data> Updater<A, B> {
    pub(crate) const fn new(function: UpdateFn<A, B>) -> Self {
        Self(function)
    }

    pub(crate) fn call(&self, subject: &A, params: &Params, update: &dyn Fn(B) -> B) -> A {
        (self.0)(subject, params, update)
    }
}

impl<A: Data, B: Data> Underlying for Reader<A, B> {
    fn intercepted(&self, id: NodeId, kind: NodeKind, interceptor: InterceptorRef) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(move |subject: &A, params: &Params| {
            let call = Call::new(id, kind, subject, params, None);
            interceptor
                .intercept(&call, &mut || Outcome::new(inner(subject, params)))
                .take::<B>()
                .unwrap_or_else(|| inner(subject, params))
        }))
    }

    fn with_params_fn(&self, transform: ParamsFn) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(move |subject: &A, params: &Params| {
            inner(subject, &transform(params))
        }))
    }
}

impl<A: Data, B: Data> Underlying for Writer<A, B> {
    fn intercepted(&self, id: NodeId, kind: NodeKind, interceptor: InterceptorRef) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(
            move |subject: &A, params: &Params, focus: B| {
                let outcome = {
                    let call = Call::new(id, kind, subject, params, Some(&focus as &dyn Datum));
                    interceptor.intercept(&call, &mut || {
                        Outcome::new(inner(subject, params, focus.clone()))
                    })
                };
                outcome
                    .take::<A>()
                    .unwrap_or_else(|| inner(subject, params, focus))
            },
        ))
    }

    fn with_params_fn(&self, transform: ParamsFn) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(
            move |subject: &A, params: &Params, focus: B| inner(subject, &transform(params), focus),
        ))
    }
}

impl<A: Data, B: Data> Underlying for Updater<A, B> {
    fn intercepted(&self, id: NodeId, kind: NodeKind, interceptor: InterceptorRef) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(
            move |subject: &A, params: &Params, update: &dyn Fn(B) -> B| {
                let call = Call::new(id, kind, subject, params, None);
                interceptor
                    .intercept(&call, &mut || Outcome::new(inner(subject, params, update)))
                    .take::<A>()
                    .unwrap_or_else(|| inner(subject, params, update))
            },
        ))
    }

    fn with_params_fn(&self, transform: ParamsFn) -> Self {
        let inner = self.0.clone();
        Self(ReferenceCounter::new(
            move |subject: &A, params: &Params, update: &dyn Fn(B) -> B| {
                inner(subject, &transform(params), update)
            },
        ))
    }
}

struct Slot<'a, F> {
    id: NodeId,
    kind: NodeKind,
    target: &'a mut F,
}

impl<F: Underlying> Install for Slot<'_, F> {
    fn install(&mut self, interceptor: InterceptorRef) {
        *self.target = self.target.intercepted(self.id, self.kind, interceptor);
    }
}

// =============================================================================
// Primitive
// =============================================================================

/// State shared by `Get`, `MaybeGet`, `Set` and `Modify`.
///
/// `raw` is the function as built; `underlying` is `raw` after every
/// extension had its chance to intercept it. Clones are the same node.
#[derive(Clone)]
pub(crate) struct Primitive<F> {
    id: NodeId,
    kind: NodeKind,
    raw: F,
    underlying: F,
    required: RequiredParams,
    extensions: Extensions,
}

impl<F> Primitive<F> {
    pub(crate) const fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) const fn underlying(&self) -> &F {
        &self.underlying
    }

    pub(crate) const fn required(&self) -> &RequiredParams {
        &self.required
    }

    pub(crate) const fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}

impl<F: Underlying> Primitive<F> {
    pub(crate) fn build(
        kind: NodeKind,
        raw: F,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self {
        let id = NodeId::fresh();
        let mut underlying = raw.clone();
        if !extensions.is_empty() {
            let mut slot = Slot {
                id,
                kind,
                target: &mut underlying,
            };
            extensions.apply(&mut Node::primitive(id, kind, &mut slot));
            tracing::trace!(node = %id, %kind, extensions = extensions.len(), "created primitive node");
        }
        Self {
            id,
            kind,
            raw,
            underlying,
            required,
            extensions,
        }
    }

    /// The same node with `extensions` added; `self` if nothing is new.
    pub(crate) fn extend_with(&self, extensions: &Extensions) -> Self {
        if self.extensions.includes(extensions) {
            return self.clone();
        }
        Self::build(
            self.kind,
            self.raw.clone(),
            self.required.clone(),
            self.extensions.combine(extensions),
        )
    }

    /// A new node that also requires `name`.
    pub(crate) fn require(&self, name: &str) -> Self {
        Self::build(
            self.kind,
            self.raw.clone(),
            self.required.clone().with(name),
            self.extensions.clone(),
        )
    }

    /// A new node requiring `required` whose function sees `transform(params)`.
    pub(crate) fn map_params(&self, required: RequiredParams, transform: ParamsFn) -> Self {
        Self::build(
            self.kind,
            self.raw.with_params_fn(transform),
            required,
            self.extensions.clone(),
        )
    }

    /// A new node with `supplied` bound on top of the caller's parameters.
    ///
    /// Unchecked; callers validate `supplied` against the composite's
    /// requirements first.
    pub(crate) fn supply(&self, supplied: &Params) -> Self {
        if supplied.is_empty() {
            return self.clone();
        }
        let required = self.required.without(supplied);
        let supplied = supplied.clone();
        self.map_params(
            required,
            ReferenceCounter::new(move |params: &Params| params.merged(&supplied)),
        )
    }
}
