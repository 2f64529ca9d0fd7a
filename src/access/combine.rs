//! Several selectors viewed as one record.

use std::fmt;

use crate::Data;
use crate::optics::{Extensions, OpticError, Params, RequiredParams, Selector};
use crate::value::Value;

/// Builds a [`Selector`] whose focus is a record with one field per added
/// selector.
///
/// Reading collects every field. Writing routes each field of the written
/// record back through its own selector, in the order the fields were added;
/// a field missing from the written record leaves its source untouched.
///
/// # Example
///
/// ```
/// use bifocal::access::{Combine, path, prop};
/// use bifocal::optics::Params;
/// use bifocal::record;
/// use bifocal::value::Value;
///
/// let summary = Combine::new()
///     .add("name", prop("name"))?
///     .add("city", path(["address", "city"]))?
///     .build();
///
/// let user = record! {
///     "name" => "alice",
///     "address" => record! { "city" => "Tokyo", "zip" => "100" },
/// };
/// assert_eq!(
///     summary.get(&user, &Params::EMPTY),
///     record! { "name" => "alice", "city" => "Tokyo" }
/// );
///
/// let moved = summary.set(&user, &Params::EMPTY, record! { "city" => "Osaka" });
/// assert_eq!(
///     moved,
///     record! {
///         "name" => "alice",
///         "address" => record! { "city" => "Osaka", "zip" => "100" },
///     }
/// );
/// # Ok::<(), bifocal::optics::OpticError>(())
/// ```
pub struct Combine<A> {
    fields: Vec<(String, Selector<A, Value>)>,
}

impl<A> Clone for Combine<A> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<A: Data> fmt::Debug for Combine<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_list()
            .entries(self.fields.iter().map(|(name, _)| name))
            .finish()
    }
}

impl<A> Default for Combine<A> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<A: Data> Combine<A> {
    /// An empty combination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::DuplicateField`] if `name` was already added.
    pub fn add(mut self, name: &str, selector: Selector<A, Value>) -> Result<Self, OpticError> {
        if self.fields.iter().any(|(existing, _)| existing == name) {
            return Err(OpticError::DuplicateField {
                name: name.to_string(),
            });
        }
        self.fields.push((name.to_string(), selector));
        Ok(self)
    }

    /// Field names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Builds the combined selector.
    ///
    /// It requires every parameter any field requires and carries every
    /// field's extensions.
    pub fn build(&self) -> Selector<A, Value> {
        let required = self
            .fields
            .iter()
            .fold(RequiredParams::new(), |required, (_, selector)| {
                required.union(&selector.required_params())
            });
        let extensions = self
            .fields
            .iter()
            .fold(Extensions::none(), |extensions, (_, selector)| {
                extensions.combine(selector.extensions())
            });

        let readers = self.fields.clone();
        let writers = self.fields.clone();
        Selector::with_requirements(
            move |subject: &A, params: &Params| {
                Value::record(
                    readers
                        .iter()
                        .map(|(name, selector)| (name.clone(), selector.get(subject, params))),
                )
            },
            move |subject: &A, params: &Params, focus: Value| {
                writers
                    .iter()
                    .fold(subject.clone(), |updated, (name, selector)| {
                        match focus.field(name) {
                            Some(value) => selector.set(&updated, params, value.clone()),
                            None => updated,
                        }
                    })
            },
            required,
            extensions,
        )
    }
}
