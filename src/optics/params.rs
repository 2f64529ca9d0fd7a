//! The parameter object threaded through every optic call.
//!
//! [`Params`] is an open, ordered map from names to [`Value`]s. Every read and
//! write receives one; optics that need auxiliary inputs (a dictionary key, a
//! locale, ...) look them up by name.
//!
//! [`RequiredParams`] is the set of names an optic declares it reads.
//! Composition unions the requirements of both sides, and partially supplying
//! parameters with `with_params` removes the supplied names. Requirements are
//! never enforced implicitly: call `check_params` on an optic to validate a
//! parameter object up front.

use std::collections::{BTreeMap, BTreeSet};

use super::error::OpticError;
use crate::value::Value;

// =============================================================================
// Params
// =============================================================================

/// Named auxiliary inputs passed to every optic call.
///
/// # Examples
///
/// ```
/// use bifocal::optics::Params;
/// use bifocal::params;
///
/// let params = params! { "id" => "u1", "limit" => 10 };
/// assert_eq!(params.text("id"), Some("u1"));
/// assert!(Params::EMPTY.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: BTreeMap<String, Value>,
}

impl Params {
    /// The empty parameter object.
    pub const EMPTY: Self = Self {
        entries: BTreeMap::new(),
    };

    /// Creates an empty parameter object.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Returns a copy with `name` bound to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Looks up a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Looks up a text parameter.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bound names, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `self` with every entry of `overrides` applied on top.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        if overrides.is_empty() {
            return self.clone();
        }
        let mut entries = self.entries.clone();
        entries.extend(
            overrides
                .entries
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Creates a [`Params`] object.
///
/// # Example
///
/// ```
/// use bifocal::params;
///
/// let params = params! { "id" => "a" };
/// assert_eq!(params.text("id"), Some("a"));
/// assert!(params!{}.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::optics::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::optics::Params::new()$(.with($name, $value))+
    };
}

// =============================================================================
// RequiredParams
// =============================================================================

/// The set of parameter names an optic reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredParams {
    names: BTreeSet<String>,
}

impl RequiredParams {
    /// No requirements.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Requirements for the given names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a copy that also requires `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Names required by either side.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        Self {
            names: self.names.union(&other.names).cloned().collect(),
        }
    }

    /// Names that remain once `params` is supplied.
    #[must_use]
    pub fn without(&self, params: &Params) -> Self {
        Self {
            names: self
                .names
                .iter()
                .filter(|name| !params.contains(name))
                .cloned()
                .collect(),
        }
    }

    /// Checks that every supplied name is required, returning the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::UnknownParameter`] for the first supplied name
    /// that is not required.
    pub fn satisfy(&self, params: &Params) -> Result<Self, OpticError> {
        if let Some(name) = params.keys().find(|name| !self.contains(name)) {
            return Err(OpticError::UnknownParameter {
                name: name.to_string(),
            });
        }
        Ok(self.without(params))
    }

    /// Required names not bound in `params`, in order.
    pub fn missing_from(&self, params: &Params) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| !params.contains(name))
            .cloned()
            .collect()
    }

    /// Checks that `params` binds every required name.
    ///
    /// # Errors
    ///
    /// Returns [`OpticError::MissingParameters`] listing the unbound names.
    pub fn check(&self, params: &Params) -> Result<(), OpticError> {
        let names = self.missing_from(params);
        if names.is_empty() {
            Ok(())
        } else {
            Err(OpticError::MissingParameters { names })
        }
    }

    /// Returns `true` if `name` is required.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Required names, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of required names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
