//! Reusable, parameterized endomorphisms.

use std::fmt;

use super::error::OpticError;
use super::params::{Params, RequiredParams};
use crate::shared::{Data, ReferenceCounter, Shareable};

#[cfg(not(feature = "arc"))]
type EndoFn<A> = ReferenceCounter<dyn Fn(&A, &Params) -> A>;

#[cfg(feature = "arc")]
type EndoFn<A> = ReferenceCounter<dyn Fn(&A, &Params) -> A + Send + Sync>;

/// A parameterized function from a subject to a new subject.
///
/// Updates are usually obtained from [`Modify::to_update`](super::Modify::to_update)
/// and sequenced with [`and_then`](Self::and_then).
///
/// # Examples
///
/// ```
/// use bifocal::optics::{Params, Update};
///
/// let increment = Update::new(|value: &i32, _: &Params| value + 1);
/// let double = Update::new(|value: &i32, _: &Params| value * 2);
///
/// assert_eq!(increment.and_then(&double).apply(&3, &Params::EMPTY), 8);
/// ```
pub struct Update<A> {
    function: EndoFn<A>,
    required: RequiredParams,
}

impl<A> Clone for Update<A> {
    fn clone(&self) -> Self {
        Self {
            function: ReferenceCounter::clone(&self.function),
            required: self.required.clone(),
        }
    }
}

impl<A> fmt::Debug for Update<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Update")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl<A: Data> Update<A> {
    /// Creates an update from a function.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&A, &Params) -> A + Shareable + 'static,
    {
        Self::with_required(function, RequiredParams::new())
    }

    pub(crate) fn with_required<F>(function: F, required: RequiredParams) -> Self
    where
        F: Fn(&A, &Params) -> A + Shareable + 'static,
    {
        Self {
            function: ReferenceCounter::new(function),
            required,
        }
    }

    /// Leaves the subject unchanged.
    pub fn identity() -> Self {
        Self::new(|subject: &A, _: &Params| subject.clone())
    }

    /// Applies the update.
    pub fn apply(&self, subject: &A, params: &Params) -> A {
        (self.function)(subject, params)
    }

    /// Runs `self`, then `next`, with the same parameters.
    #[must_use]
    pub fn and_then(&self, next: &Self) -> Self {
        let first = ReferenceCounter::clone(&self.function);
        let second = ReferenceCounter::clone(&next.function);
        Self::with_required(
            move |subject: &A, params: &Params| second(&first(subject, params), params),
            self.required.union(&next.required),
        )
    }

    /// Pre-supplies some required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::UnknownParameter`] if `supplied` binds a name
    /// this update does not require.
    pub fn with_params(&self, supplied: &Params) -> Result<Self, OpticError> {
        let required = self.required.satisfy(supplied)?;
        let function = ReferenceCounter::clone(&self.function);
        let supplied = supplied.clone();
        Ok(Self::with_required(
            move |subject: &A, params: &Params| function(subject, &params.merged(&supplied)),
            required,
        ))
    }

    /// Parameter names this update reads.
    pub const fn required_params(&self) -> &RequiredParams {
        &self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::value::Value;

    fn add_param() -> Update<i64> {
        Update::with_required(
            |value: &i64, params: &Params| {
                value + params.get("step").and_then(Value::as_int).unwrap_or(0)
            },
            RequiredParams::of(["step"]),
        )
    }

    #[test]
    fn test_and_then_sequences_left_to_right() {
        let append_a = Update::new(|text: &String, _: &Params| format!("{text}a"));
        let append_b = Update::new(|text: &String, _: &Params| format!("{text}b"));
        assert_eq!(
            append_a.and_then(&append_b).apply(&String::new(), &Params::EMPTY),
            "ab"
        );
    }

    #[test]
    fn test_and_then_unions_requirements() {
        let other = Update::with_required(|value: &i64, _: &Params| *value, RequiredParams::of(["x"]));
        let chained = add_param().and_then(&other);
        assert_eq!(chained.required_params(), &RequiredParams::of(["step", "x"]));
    }

    #[test]
    fn test_with_params() {
        let step = add_param().with_params(&params! { "step" => 5 }).unwrap();
        assert!(step.required_params().is_empty());
        assert_eq!(step.apply(&1, &Params::EMPTY), 6);
    }

    #[test]
    fn test_identity() {
        assert_eq!(Update::<i64>::identity().apply(&4, &Params::EMPTY), 4);
    }
}
