//! Read-write optics with a focus that is always present.
//!
//! A [`Selector`] pairs a [`Get`] with a [`Set`] and derives a [`Modify`] from
//! them. Composition follows the capability lattice:
//!
//! | other          | result          |
//! |----------------|-----------------|
//! | Get            | Get             |
//! | MaybeGet       | MaybeGet        |
//! | Selector       | Selector        |
//! | MaybeSelector  | MaybeSelector   |
//! | Converter      | Selector        |
//! | MaybeConverter | MaybeSelector   |
//!
//! # Laws
//!
//! For a selector built from a plain field accessor:
//!
//! 1. **GetSet**: `set(s, get(s))` is `s` itself (no-op writes keep identity).
//! 2. **SetGet**: `get(set(s, v)) == v`.
//!
//! # Examples
//!
//! ```
//! use bifocal::access::prop;
//! use bifocal::optics::Params;
//! use bifocal::record;
//! use bifocal::value::Value;
//!
//! let bar_qux = prop("bar").compose_selector(&prop("qux"));
//! let subject = record! { "bar" => record! { "qux" => 1 } };
//!
//! assert_eq!(bar_qux.get(&subject, &Params::EMPTY), Value::from(1));
//! assert_eq!(
//!     bar_qux.modify(&subject, &Params::EMPTY, |qux| (qux.as_int().unwrap_or(0) + 1).into()),
//!     record! { "bar" => record! { "qux" => 2 } }
//! );
//! ```

use std::fmt;

use super::converter::Converter;
use super::discriminant::{Capability, NodeId, NodeKind, Risk, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions, register_composite};
use super::get::Get;
use super::maybe_converter::MaybeConverter;
use super::maybe_get::MaybeGet;
use super::maybe_selector::MaybeSelector;
use super::memoize::Memoize;
use super::merge::Merge;
use super::modify::Modify;
use super::node::{ParamsFn, Reader, Writer};
use super::optic::Optic;
use super::params::{Params, RequiredParams};
use super::set::Set;
use super::trace::Trace;
use crate::shared::{Data, ReferenceCounter, Shareable};

/// A read-write optic whose focus is always present.
pub struct Selector<A, B> {
    id: NodeId,
    get: Get<A, B>,
    set: Set<A, B>,
    modify: Modify<A, B>,
    extensions: Extensions,
}

impl<A, B> Clone for Selector<A, B> {
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

impl<A: Data, B: Data> fmt::Debug for Selector<A, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Selector")
            .field("id", &self.id)
            .field("get", &self.get)
            .field("set", &self.set)
            .finish_non_exhaustive()
    }
}

impl<A: Data, B: Data> Selector<A, B> {
    /// The kind of every `Selector`.
    pub const KIND: NodeKind = NodeKind::Selector;

    /// Creates a selector from a read and a write function.
    ///
    /// # Arguments
    ///
    /// * `read` - Reads the focus
    /// * `write` - Returns the subject with the focus replaced
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&A, &Params) -> B + Shareable + 'static,
        W: Fn(&A, &Params, B) -> A + Shareable + 'static,
    {
        Self::from_parts(Get::new(read), Set::new(write))
    }

    /// Pairs an existing read and write.
    ///
    /// The selector carries the extensions of both.
    pub fn from_parts(get: Get<A, B>, set: Set<A, B>) -> Self {
        let extensions = get.extensions().combine(set.extensions());
        Self::assemble(get, set, extensions)
    }

    /// Creates a selector that requires `required` and carries `extensions`
    /// from the outset.
    pub(crate) fn with_requirements<R, W>(
        read: R,
        write: W,
        required: RequiredParams,
        extensions: Extensions,
    ) -> Self
    where
        R: Fn(&A, &Params) -> B + Shareable + 'static,
        W: Fn(&A, &Params, B) -> A + Shareable + 'static,
    {
        Self::assemble(
            Get::from_reader(
                Reader::new(ReferenceCounter::new(read)),
                required.clone(),
                Extensions::none(),
            ),
            Set::from_writer(
                Writer::new(ReferenceCounter::new(write)),
                required,
                Extensions::none(),
            ),
            extensions,
        )
    }

    pub(crate) fn assemble(get: Get<A, B>, set: Set<A, B>, extensions: Extensions) -> Self {
        let get = get.extend_with(&extensions);
        let set = set.extend_with(&extensions);
        let modify = Modify::from_get_set(&get, &set);
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

    /// Reads the focus.
    pub fn get(&self, subject: &A, params: &Params) -> B {
        self.get.get(subject, params)
    }

    /// Writes the focus.
    pub fn set(&self, subject: &A, params: &Params, focus: B) -> A {
        self.set.set(subject, params, focus)
    }

    /// Updates the focus with `function`.
    pub fn modify<F>(&self, subject: &A, params: &Params, function: F) -> A
    where
        F: Fn(B) -> B,
    {
        self.modify.modify(subject, params, function)
    }

    /// The read half.
    pub const fn getter(&self) -> &Get<A, B> {
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
        Shape::new(Capability::Select, Risk::Single)
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
    // Composition
    // =========================================================================

    /// Composes with any optic, narrowing and widening per the lattice.
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
    pub fn compose_get<C: Data>(&self, other: &Get<B, C>) -> Get<A, C> {
        self.get.compose_get(other)
    }

    /// Drops the write path and reads through `other`.
    pub fn compose_maybe_get<C: Data>(&self, other: &MaybeGet<B, C>) -> MaybeGet<A, C> {
        self.get.compose_maybe_get(other)
    }

    /// Focuses further into the focus.
    pub fn compose_selector<C: Data>(&self, other: &Selector<B, C>) -> Selector<A, C> {
        Selector::assemble(
            self.get.compose_get(other.getter()),
            self.modify.compose_set(other.setter()),
            self.extensions.clone(),
        )
    }

    /// Focuses further into the focus, where the inner focus may be absent.
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
    pub fn compose_converter<C: Data>(&self, other: &Converter<B, C>) -> Selector<A, C> {
        Selector::assemble(
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

    /// Narrows the focus to a sub-variant.
    ///
    /// `narrow` picks the variant out of the focus and `widen` turns it back
    /// into a focus for writing.
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

impl<A: Data> Selector<A, A> {
    /// Focuses on the whole subject.
    pub fn identity() -> Self {
        Self::new(
            |subject: &A, _: &Params| subject.clone(),
            |_: &A, _: &Params, focus: A| focus,
        )
    }
}

impl<A: Data, B: Data + Merge> Selector<A, B> {
    /// Shallow-overlays `patch` on the focus.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.merge(subject, params, patch)
    }

    /// Recursively overlays `patch` on the focus.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> A {
        self.modify.deep_merge(subject, params, patch)
    }
}

impl<A: Data, C: Data> Selector<A, Option<C>> {
    /// Treats `None` as an absent focus; writing stores `Some`.
    pub fn if_defined(&self) -> MaybeSelector<A, C> {
        self.choose(|focus: &Option<C>| focus.clone(), Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::value::Value;

    #[derive(Clone, Debug, PartialEq)]
    struct Account {
        owner: String,
        balance: i64,
    }

    fn balance() -> Selector<Account, i64> {
        Selector::new(
            |account: &Account, _: &Params| account.balance,
            |account: &Account, _: &Params, balance: i64| Account {
                balance,
                ..account.clone()
            },
        )
    }

    fn account() -> Account {
        Account {
            owner: "alice".to_string(),
            balance: 10,
        }
    }

    #[test]
    fn test_get_set_modify() {
        let selector = balance();
        assert_eq!(selector.get(&account(), &Params::EMPTY), 10);
        assert_eq!(selector.set(&account(), &Params::EMPTY, 3).balance, 3);
        assert_eq!(
            selector.modify(&account(), &Params::EMPTY, |balance| balance * 2).balance,
            20
        );
    }

    #[test]
    fn test_compose_with_get_is_read_only() {
        let is_positive = Get::new(|balance: &i64, _: &Params| *balance > 0);
        let composed = balance().compose(is_positive);
        assert_eq!(composed.kind(), NodeKind::Get);
        assert_eq!(composed.get(&account(), &Params::EMPTY), Some(true));
        assert!(composed.set(&account(), &Params::EMPTY, false).is_err());
    }

    #[test]
    fn test_compose_with_converter_writes_backward() {
        let cents = Converter::new(
            |balance: &i64, _: &Params| balance * 100,
            |cents: &i64, _: &Params| cents / 100,
        );
        let in_cents = balance().compose_converter(&cents);
        assert_eq!(in_cents.get(&account(), &Params::EMPTY), 1000);
        assert_eq!(in_cents.set(&account(), &Params::EMPTY, 500).balance, 5);
    }

    #[test]
    fn test_choose_narrows_the_focus() {
        let even = balance().choose(
            |balance: &i64| (balance % 2 == 0).then_some(*balance),
            |balance| balance,
        );
        assert_eq!(even.get(&account(), &Params::EMPTY), Some(10));

        let odd = Account {
            balance: 7,
            ..account()
        };
        assert_eq!(even.get(&odd, &Params::EMPTY), None);
        assert_eq!(even.modify(&odd, &Params::EMPTY, |balance| balance + 1), odd);
    }

    #[test]
    fn test_if_defined() {
        let nickname: Selector<Option<String>, Option<String>> = Selector::identity();
        let defined = nickname.if_defined();
        assert_eq!(defined.get(&None, &Params::EMPTY), None);
        assert_eq!(
            defined.set(&None, &Params::EMPTY, "al".to_string()),
            Some("al".to_string())
        );
    }

    #[test]
    fn test_identity_selector() {
        let identity = Selector::<Value, Value>::identity();
        let subject = record! { "a" => 1 };
        assert_eq!(identity.get(&subject, &Params::EMPTY), subject);
        assert!(identity
            .set(&subject, &Params::EMPTY, record! { "a" => 1 })
            .same_reference(&subject));
    }

    #[test]
    fn test_require_and_with_params() {
        let selector = balance().require("currency");
        assert_eq!(selector.required_params(), RequiredParams::of(["currency"]));
        let bound = selector
            .with_params(&crate::params! { "currency" => "EUR" })
            .unwrap();
        assert!(bound.required_params().is_empty());
        assert!(selector.with_params(&crate::params! { "other" => 1 }).is_err());
    }
}
