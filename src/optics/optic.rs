//! Composition dispatch over every optic kind.
//!
//! [`Optic`] holds any of the six composite kinds. Composing two optics
//! narrows capability and widens risk:
//!
//! ```text
//! capability:  Convert  >  Select  >  Get
//! risk:        Single   <  Maybe
//! ```
//!
//! so `Selector ∘ MaybeConverter` is a `MaybeSelector`, `Converter ∘ Get` is a
//! `Get`, and so on. The result kind is derived from the operands alone.
//!
//! The uniform surface reports writes through a read-only optic as
//! [`OpticError::ReadOnly`]; the concrete kinds do not offer those writes at
//! all.
//!
//! # Examples
//!
//! ```
//! use bifocal::access::{index_by, prop};
//! use bifocal::optics::{NodeKind, Optic};
//! use bifocal::{params, record};
//! use bifocal::value::Value;
//!
//! let users: Optic<Value, Value> = prop("users").into();
//! let user = users.compose(index_by("id"));
//! assert_eq!(user.kind(), NodeKind::MaybeSelector);
//!
//! let subject = record! { "users" => record! { "u1" => "alice" } };
//! let by_id = params! { "id" => "u1" };
//! assert_eq!(user.get(&subject, &by_id), Some(Value::from("alice")));
//! ```

use super::converter::Converter;
use super::discriminant::{NodeId, NodeKind, Shape};
use super::error::OpticError;
use super::extension::{ExtensionRef, Extensions};
use super::get::Get;
use super::maybe_converter::MaybeConverter;
use super::maybe_get::MaybeGet;
use super::maybe_selector::MaybeSelector;
use super::memoize::Memoize;
use super::merge::Merge;
use super::params::{Params, RequiredParams};
use super::selector::Selector;
use super::trace::Trace;
use crate::shared::{Data, Shareable};

/// Any optic from `A` to `B`.
#[derive(Clone, Debug)]
pub enum Optic<A: Data, B: Data> {
    /// A total read.
    Get(Get<A, B>),
    /// A partial read.
    MaybeGet(MaybeGet<A, B>),
    /// A total read-write.
    Selector(Selector<A, B>),
    /// A partial read-write.
    MaybeSelector(MaybeSelector<A, B>),
    /// A total conversion.
    Converter(Converter<A, B>),
    /// A partial conversion.
    MaybeConverter(MaybeConverter<A, B>),
}

macro_rules! optic_conversions {
    ($($variant:ident),* $(,)?) => {
        $(
            impl<A: Data, B: Data> From<$variant<A, B>> for Optic<A, B> {
                fn from(optic: $variant<A, B>) -> Self {
                    Self::$variant(optic)
                }
            }

            impl<A: Data, B: Data> TryFrom<Optic<A, B>> for $variant<A, B> {
                type Error = OpticError;

                fn try_from(optic: Optic<A, B>) -> Result<Self, Self::Error> {
                    match optic {
                        Optic::$variant(inner) => Ok(inner),
                        other => Err(OpticError::KindMismatch {
                            expected: NodeKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

optic_conversions!(Get, MaybeGet, Selector, MaybeSelector, Converter, MaybeConverter);

/// Applies the same expression to whichever kind `$optic` holds.
macro_rules! dispatch {
    ($optic:expr, $inner:ident => $body:expr) => {
        match $optic {
            Optic::Get($inner) => $body,
            Optic::MaybeGet($inner) => $body,
            Optic::Selector($inner) => $body,
            Optic::MaybeSelector($inner) => $body,
            Optic::Converter($inner) => $body,
            Optic::MaybeConverter($inner) => $body,
        }
    };
}

/// Like `dispatch!`, but rewraps the result in the same variant.
macro_rules! rebuild {
    ($optic:expr, $inner:ident => $body:expr) => {
        match $optic {
            Optic::Get($inner) => Optic::Get($body),
            Optic::MaybeGet($inner) => Optic::MaybeGet($body),
            Optic::Selector($inner) => Optic::Selector($body),
            Optic::MaybeSelector($inner) => Optic::MaybeSelector($body),
            Optic::Converter($inner) => Optic::Converter($body),
            Optic::MaybeConverter($inner) => Optic::MaybeConverter($body),
        }
    };
}

impl<A: Data, B: Data> Optic<A, B> {
    /// Composes with another optic, deriving the result kind.
    pub fn compose<C: Data>(&self, other: impl Into<Optic<B, C>>) -> Optic<A, C> {
        let other = other.into();
        let expected = self.shape().compose(other.shape());
        let composed = dispatch!(self, inner => inner.compose(other));
        debug_assert_eq!(composed.shape(), expected);
        composed
    }

    /// Capability and risk of the held optic.
    pub const fn shape(&self) -> Shape {
        dispatch!(self, inner => inner.shape())
    }

    /// Kind of the held optic.
    pub const fn kind(&self) -> NodeKind {
        self.shape().kind()
    }

    /// Identifier of the held optic's node.
    pub const fn id(&self) -> NodeId {
        dispatch!(self, inner => inner.id())
    }

    /// Whether the held optic can write.
    pub const fn is_writable(&self) -> bool {
        self.shape().capability.is_writable()
    }

    /// Parameter names the held optic reads.
    pub fn required_params(&self) -> RequiredParams {
        match self {
            Self::Get(get) => get.required_params().clone(),
            Self::MaybeGet(get) => get.required_params().clone(),
            Self::Selector(selector) => selector.required_params(),
            Self::MaybeSelector(selector) => selector.required_params(),
            Self::Converter(converter) => converter.required_params(),
            Self::MaybeConverter(converter) => converter.required_params(),
        }
    }

    /// Extensions attached to the held optic.
    pub const fn extensions(&self) -> &Extensions {
        dispatch!(self, inner => inner.extensions())
    }

    /// Checks that `params` binds every required name.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::MissingParameters`] listing the unbound names.
    pub fn check_params(&self, params: &Params) -> Result<(), OpticError> {
        self.required_params().check(params)
    }

    /// Reads the focus; `None` when it is absent.
    pub fn get(&self, subject: &A, params: &Params) -> Option<B> {
        match self {
            Self::Get(get) => Some(get.get(subject, params)),
            Self::MaybeGet(get) => get.get(subject, params),
            Self::Selector(selector) => Some(selector.get(subject, params)),
            Self::MaybeSelector(selector) => selector.get(subject, params),
            Self::Converter(converter) => Some(converter.get(subject, params)),
            Self::MaybeConverter(converter) => converter.get(subject, params),
        }
    }

    /// Writes the focus.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::ReadOnly`] if the held optic cannot write.
    pub fn set(&self, subject: &A, params: &Params, focus: B) -> Result<A, OpticError> {
        match self {
            Self::Get(_) | Self::MaybeGet(_) => Err(self.read_only()),
            Self::Selector(selector) => Ok(selector.set(subject, params, focus)),
            Self::MaybeSelector(selector) => Ok(selector.set(subject, params, focus)),
            Self::Converter(converter) => Ok(converter.set(subject, params, focus)),
            Self::MaybeConverter(converter) => Ok(converter.set(subject, params, focus)),
        }
    }

    /// Updates the focus with `function`.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::ReadOnly`] if the held optic cannot write.
    pub fn modify<F>(&self, subject: &A, params: &Params, function: F) -> Result<A, OpticError>
    where
        F: Fn(B) -> B,
    {
        match self {
            Self::Get(_) | Self::MaybeGet(_) => Err(self.read_only()),
            Self::Selector(selector) => Ok(selector.modify(subject, params, function)),
            Self::MaybeSelector(selector) => Ok(selector.modify(subject, params, function)),
            Self::Converter(converter) => Ok(converter.modify(subject, params, function)),
            Self::MaybeConverter(converter) => Ok(converter.modify(subject, params, function)),
        }
    }

    const fn read_only(&self) -> OpticError {
        OpticError::ReadOnly { kind: self.kind() }
    }

    /// Declares that the held optic reads parameter `name`.
    #[must_use]
    pub fn require(&self, name: &str) -> Self {
        rebuild!(self, inner => inner.require(name))
    }

    /// Requires `required` instead, passing `transform(params)` inside.
    #[must_use]
    pub fn map_params<F>(&self, required: RequiredParams, transform: F) -> Self
    where
        F: Fn(&Params) -> Params + Shareable + 'static,
    {
        rebuild!(self, inner => inner.map_params(required, transform))
    }

    /// Pre-supplies some required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::UnknownParameter`] if `supplied` binds a name
    /// the held optic does not require.
    pub fn with_params(&self, supplied: &Params) -> Result<Self, OpticError> {
        Ok(rebuild!(self, inner => inner.with_params(supplied)?))
    }

    /// Attaches an extension.
    #[must_use]
    pub fn extend(&self, extension: ExtensionRef) -> Self {
        rebuild!(self, inner => inner.extend(extension))
    }

    /// Attaches every extension not already attached.
    #[must_use]
    pub fn extend_with(&self, extensions: &Extensions) -> Self {
        rebuild!(self, inner => inner.extend_with(extensions))
    }

    /// Caches the most recent read of every primitive node.
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

impl<A: Data, B: Data + Merge> Optic<A, B> {
    /// Shallow-overlays `patch` on the focus.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::ReadOnly`] if the held optic cannot write.
    pub fn merge(&self, subject: &A, params: &Params, patch: &B) -> Result<A, OpticError> {
        match self {
            Self::Get(_) | Self::MaybeGet(_) => Err(self.read_only()),
            Self::Selector(selector) => Ok(selector.merge(subject, params, patch)),
            Self::MaybeSelector(selector) => Ok(selector.merge(subject, params, patch)),
            Self::Converter(converter) => Ok(converter.merge(subject, params, patch)),
            Self::MaybeConverter(converter) => Ok(converter.merge(subject, params, patch)),
        }
    }

    /// Recursively overlays `patch` on the focus.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::ReadOnly`] if the held optic cannot write.
    pub fn deep_merge(&self, subject: &A, params: &Params, patch: &B) -> Result<A, OpticError> {
        match self {
            Self::Get(_) | Self::MaybeGet(_) => Err(self.read_only()),
            Self::Selector(selector) => Ok(selector.deep_merge(subject, params, patch)),
            Self::MaybeSelector(selector) => Ok(selector.deep_merge(subject, params, patch)),
            Self::Converter(converter) => Ok(converter.deep_merge(subject, params, patch)),
            Self::MaybeConverter(converter) => Ok(converter.deep_merge(subject, params, patch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn get() -> Optic<i64, i64> {
        Get::new(|value: &i64, _: &Params| value + 1).into()
    }

    fn maybe_get() -> Optic<i64, i64> {
        MaybeGet::new(|value: &i64, _: &Params| (*value > 0).then_some(value - 1)).into()
    }

    fn selector() -> Optic<i64, i64> {
        Selector::new(
            |value: &i64, _: &Params| *value,
            |_: &i64, _: &Params, value: i64| value,
        )
        .into()
    }

    fn maybe_selector() -> Optic<i64, i64> {
        MaybeSelector::new(
            |value: &i64, _: &Params| (*value != 0).then_some(*value),
            |_: &i64, _: &Params, value: i64| value,
        )
        .into()
    }

    fn converter() -> Optic<i64, i64> {
        Converter::new(
            |value: &i64, _: &Params| value * 10,
            |value: &i64, _: &Params| value / 10,
        )
        .into()
    }

    fn maybe_converter() -> Optic<i64, i64> {
        MaybeConverter::new(
            |value: &i64, _: &Params| (value % 2 == 0).then_some(value / 2),
            |value: &i64, _: &Params| value * 2,
        )
        .into()
    }

    fn every_kind() -> Vec<Optic<i64, i64>> {
        vec![
            get(),
            maybe_get(),
            selector(),
            maybe_selector(),
            converter(),
            maybe_converter(),
        ]
    }

    #[test]
    fn test_compose_follows_the_lattice() {
        for left in every_kind() {
            for right in every_kind() {
                let expected = left.shape().compose(right.shape());
                assert_eq!(left.compose(right.clone()).shape(), expected);
            }
        }
    }

    #[rstest]
    #[case(get(), NodeKind::Get)]
    #[case(maybe_get(), NodeKind::MaybeGet)]
    fn test_read_only_kinds_reject_writes(#[case] optic: Optic<i64, i64>, #[case] kind: NodeKind) {
        assert_eq!(
            optic.set(&1, &Params::EMPTY, 2),
            Err(OpticError::ReadOnly { kind })
        );
        assert_eq!(
            optic.modify(&1, &Params::EMPTY, |value| value),
            Err(OpticError::ReadOnly { kind })
        );
    }

    #[test]
    fn test_try_from_reports_mismatch() {
        let result = Selector::<i64, i64>::try_from(get());
        assert_eq!(
            result.err(),
            Some(OpticError::KindMismatch {
                expected: NodeKind::Selector,
                found: NodeKind::Get,
            })
        );
        assert!(Get::<i64, i64>::try_from(get()).is_ok());
    }

    #[test]
    fn test_get_widens_total_reads() {
        assert_eq!(get().get(&1, &Params::EMPTY), Some(2));
        assert_eq!(maybe_get().get(&0, &Params::EMPTY), None);
        assert_eq!(converter().get(&3, &Params::EMPTY), Some(30));
    }

    #[test]
    fn test_with_params_rejects_unknown_names() {
        let error = selector()
            .with_params(&crate::params! { "page" => 1 })
            .err();
        assert_eq!(
            error,
            Some(OpticError::UnknownParameter {
                name: "page".to_string()
            })
        );
        assert!(selector().require("page").with_params(&crate::params! { "page" => 1 }).is_ok());
    }

    #[test]
    fn test_merge_is_rejected_by_read_only_kinds() {
        use crate::record;
        use crate::value::Value;

        let subject = record! { "a" => record! { "x" => 1, "y" => record! { "z" => 2 } } };
        let patch = record! { "y" => record! { "w" => 3 } };

        let field: Optic<Value, Value> = crate::access::prop("a").into();
        assert_eq!(
            field.merge(&subject, &Params::EMPTY, &patch),
            Ok(record! { "a" => record! { "x" => 1, "y" => record! { "w" => 3 } } })
        );
        assert_eq!(
            field.deep_merge(&subject, &Params::EMPTY, &patch),
            Ok(record! { "a" => record! { "x" => 1, "y" => record! { "z" => 2, "w" => 3 } } })
        );

        let read: Optic<Value, Value> =
            Get::new(|value: &Value, _: &Params| value.clone()).into();
        assert_eq!(
            read.merge(&subject, &Params::EMPTY, &patch),
            Err(OpticError::ReadOnly {
                kind: NodeKind::Get
            })
        );
        let maybe_read: Optic<Value, Value> =
            MaybeGet::new(|value: &Value, _: &Params| value.field("a").cloned()).into();
        assert_eq!(
            maybe_read.deep_merge(&subject, &Params::EMPTY, &patch),
            Err(OpticError::ReadOnly {
                kind: NodeKind::MaybeGet
            })
        );
    }
}
