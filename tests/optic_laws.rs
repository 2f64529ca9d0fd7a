//! Property-based tests for the composition laws.
//!
//! - **Identity**: composing with an identity optic changes nothing.
//! - **Associativity**: `(a ∘ b) ∘ c` and `a ∘ (b ∘ c)` read and write alike.
//! - **Read composition**: a composed read is the left read followed by the
//!   right read, absent as soon as either stage is.
//! - **Risk propagation**: a `Maybe` operand makes the result `Maybe`.
//! - **Narrowing**: composing with a read-only optic is read-only.
//! - **Default is read-only**: `with_default_value` never changes writes.
//!
//! Every operand below is lawful on its own (writing back what was read
//! returns the subject), which is what associativity of writes relies on.

use bifocal::optics::{
    Converter, Get, MaybeConverter, MaybeGet, MaybeSelector, Optic, Params, Risk, Selector,
};
use proptest::prelude::*;

// =============================================================================
// Operands
// =============================================================================

fn get() -> Optic<i64, i64> {
    Get::new(|value: &i64, _: &Params| value + 1).into()
}

fn maybe_get() -> Optic<i64, i64> {
    MaybeGet::new(|value: &i64, _: &Params| (value % 3 != 0).then_some(*value)).into()
}

/// Focuses on everything but the last decimal digit.
fn tens() -> Selector<i64, i64> {
    Selector::new(
        |value: &i64, _: &Params| value.div_euclid(10),
        |value: &i64, _: &Params, tens: i64| value.rem_euclid(10) + tens * 10,
    )
}

fn even() -> MaybeSelector<i64, i64> {
    MaybeSelector::new(
        |value: &i64, _: &Params| (value % 2 == 0).then_some(*value),
        |_: &i64, _: &Params, focus: i64| focus,
    )
}

fn shifted() -> Converter<i64, i64> {
    Converter::new(
        |value: &i64, _: &Params| value - 7,
        |value: &i64, _: &Params| value + 7,
    )
}

fn halved() -> MaybeConverter<i64, i64> {
    MaybeConverter::new(
        |value: &i64, _: &Params| (value % 2 == 0).then_some(value / 2),
        |value: &i64, _: &Params| value * 2,
    )
}

fn operand(index: usize) -> Optic<i64, i64> {
    match index {
        0 => get(),
        1 => maybe_get(),
        2 => tens().into(),
        3 => even().into(),
        4 => shifted().into(),
        _ => halved().into(),
    }
}

fn writable_operand(index: usize) -> Optic<i64, i64> {
    operand(2 + index % 4)
}

/// Reads, writes and modifications of `optic` at one point.
fn observe(
    optic: &Optic<i64, i64>,
    subject: i64,
    focus: i64,
) -> (Option<i64>, Option<i64>, Option<i64>) {
    (
        optic.get(&subject, &Params::EMPTY),
        optic.set(&subject, &Params::EMPTY, focus).ok(),
        optic.modify(&subject, &Params::EMPTY, |value| value + 1).ok(),
    )
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    /// Composing with the identity converter on either side changes nothing.
    #[test]
    fn prop_converter_identity(index in 0usize..6, subject in -10_000i64..10_000, focus in -1_000i64..1_000) {
        let optic = operand(index);
        let identity: Optic<i64, i64> = Converter::identity().into();

        let left = identity.compose(optic.clone());
        let right = optic.compose(identity);

        prop_assert_eq!(left.kind(), optic.kind());
        prop_assert_eq!(right.kind(), optic.kind());
        prop_assert_eq!(observe(&left, subject, focus), observe(&optic, subject, focus));
        prop_assert_eq!(observe(&right, subject, focus), observe(&optic, subject, focus));
    }

    /// Composing with the identity read keeps every read.
    #[test]
    fn prop_get_identity(index in 0usize..6, subject in -10_000i64..10_000) {
        let optic = operand(index);
        let composed = optic.compose(Get::identity());
        prop_assert_eq!(
            composed.get(&subject, &Params::EMPTY),
            optic.get(&subject, &Params::EMPTY)
        );
        prop_assert_eq!(composed.shape().risk, optic.shape().risk);
    }

    /// Reads associate for every combination of kinds.
    #[test]
    fn prop_read_associativity(
        a in 0usize..6,
        b in 0usize..6,
        c in 0usize..6,
        subject in -10_000i64..10_000,
    ) {
        let (a, b, c) = (operand(a), operand(b), operand(c));
        let left = a.compose(b.clone()).compose(c.clone());
        let right = a.compose(b.compose(c));

        prop_assert_eq!(left.kind(), right.kind());
        prop_assert_eq!(
            left.get(&subject, &Params::EMPTY),
            right.get(&subject, &Params::EMPTY)
        );
    }

    /// Writes associate for every combination of writable kinds.
    #[test]
    fn prop_write_associativity(
        a in 0usize..4,
        b in 0usize..4,
        c in 0usize..4,
        subject in -10_000i64..10_000,
        focus in -1_000i64..1_000,
    ) {
        let (a, b, c) = (writable_operand(a), writable_operand(b), writable_operand(c));
        let left = a.compose(b.clone()).compose(c.clone());
        let right = a.compose(b.compose(c));

        prop_assert_eq!(observe(&left, subject, focus), observe(&right, subject, focus));
    }

    /// A composed read is the left read followed by the right read.
    #[test]
    fn prop_read_composition(a in 0usize..6, b in 0usize..6, subject in -10_000i64..10_000) {
        let (a, b) = (operand(a), operand(b));
        let expected = a
            .get(&subject, &Params::EMPTY)
            .and_then(|focus| b.get(&focus, &Params::EMPTY));
        prop_assert_eq!(a.compose(b).get(&subject, &Params::EMPTY), expected);
    }

    /// The result is `Maybe` exactly when an operand is.
    #[test]
    fn prop_risk_propagation(a in 0usize..6, b in 0usize..6) {
        let (a, b) = (operand(a), operand(b));
        let either_maybe = a.shape().risk == Risk::Maybe || b.shape().risk == Risk::Maybe;
        let composed = a.compose(b);
        prop_assert_eq!(composed.shape().risk == Risk::Maybe, either_maybe);
    }

    /// Composing with a read-only optic, on either side, is read-only.
    #[test]
    fn prop_narrowing(index in 0usize..6, read_only in 0usize..2, subject in -100i64..100) {
        let optic = operand(index);
        let reader = operand(read_only);
        for composed in [optic.compose(reader.clone()), reader.compose(optic.clone())] {
            prop_assert!(!composed.is_writable());
            prop_assert!(composed.set(&subject, &Params::EMPTY, 0).is_err());
        }
    }

    /// Writing through a defaulted selector is writing through the original.
    #[test]
    fn prop_default_is_read_only(
        default in -100i64..100,
        subject in -10_000i64..10_000,
        focus in -1_000i64..1_000,
    ) {
        let defaulted = even().with_default_value(default);
        prop_assert_eq!(
            defaulted.set(&subject, &Params::EMPTY, focus),
            even().set(&subject, &Params::EMPTY, focus)
        );
        prop_assert_eq!(
            defaulted.get(&subject, &Params::EMPTY),
            even().get(&subject, &Params::EMPTY).unwrap_or(default)
        );
    }

    /// Writing back what was read returns an equal subject.
    #[test]
    fn prop_selector_get_set(subject in -10_000i64..10_000) {
        let focus = tens().get(&subject, &Params::EMPTY);
        prop_assert_eq!(tens().set(&subject, &Params::EMPTY, focus), subject);
    }
}
