//! Immutable, tree-shaped values.
//!
//! [`Value`] is the dynamic subject type used by the property, key and
//! position accessors in [`access`](crate::access), and the value type of
//! [`Params`](crate::optics::Params) entries.
//!
//! Compound variants (`Text`, `List`, `Record`) live behind a
//! [`ReferenceCounter`], so cloning a value is cheap and two clones share the
//! same allocation. Equality short-circuits on shared allocations before
//! falling back to a structural comparison, which keeps the no-op checks done
//! by every write cheap when nothing changed.
//!
//! # Examples
//!
//! ```
//! use bifocal::record;
//! use bifocal::value::Value;
//!
//! let user = record! { "name" => "alice", "age" => 30 };
//! assert_eq!(user.field("age"), Some(&Value::Int(30)));
//!
//! let renamed = user.with_field("name", Value::from("bob"));
//! assert_eq!(renamed.field("name").and_then(Value::as_text), Some("bob"));
//! assert_eq!(user.field("name").and_then(Value::as_text), Some("alice"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::shared::ReferenceCounter;

/// An immutable, tree-shaped value.
///
/// `Null` is an ordinary domain value. It is distinct from an absent focus,
/// which optics report as `None`.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The null value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(ReferenceCounter<str>),
    /// An ordered sequence of values.
    List(ReferenceCounter<Vec<Value>>),
    /// A mapping from field names to values, ordered by name.
    Record(ReferenceCounter<BTreeMap<String, Value>>),
}

impl Value {
    /// Creates a record from `(name, value)` pairs.
    ///
    /// Later entries replace earlier ones with the same name.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Record(ReferenceCounter::new(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        ))
    }

    /// Creates a list from anything convertible into values.
    pub fn list<T, I>(items: I) -> Self
    where
        T: Into<Self>,
        I: IntoIterator<Item = T>,
    {
        Self::List(ReferenceCounter::new(
            items.into_iter().map(Into::into).collect(),
        ))
    }

    /// Returns the field `name` if this is a record containing it.
    pub fn field(&self, name: &str) -> Option<&Self> {
        self.as_record().and_then(|entries| entries.get(name))
    }

    /// Returns a record with `name` set to `value`.
    ///
    /// Any other value is treated as an empty record.
    #[must_use]
    pub fn with_field(&self, name: &str, value: Self) -> Self {
        let mut entries = self.as_record().cloned().unwrap_or_default();
        entries.insert(name.to_string(), value);
        Self::Record(ReferenceCounter::new(entries))
    }

    /// Returns the first element if this is a non-empty list.
    pub fn first(&self) -> Option<&Self> {
        self.as_list().and_then(|items| items.first())
    }

    /// Returns a list whose first element is `value`.
    ///
    /// An empty list gains `value` as its only element, and any non-list
    /// value is replaced by a single-element list.
    #[must_use]
    pub fn with_first(&self, value: Self) -> Self {
        let mut items = self.as_list().map(<[Self]>::to_vec).unwrap_or_default();
        match items.first_mut() {
            Some(head) => *head = value,
            None => items.push(value),
        }
        Self::List(ReferenceCounter::new(items))
    }

    /// Returns `true` for [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number as a float, converting integers.
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the record entries, if this is a record.
    pub fn as_record(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of characters, elements or entries. Scalars have length zero.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(value) => value.chars().count(),
            Self::List(items) => items.len(),
            Self::Record(entries) => entries.len(),
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) => 0,
        }
    }

    /// Returns `true` if [`len`](Self::len) is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reference identity.
    ///
    /// Compound values are identical when they share an allocation; scalars
    /// have no identity beyond their value and compare by equality.
    pub fn same_reference(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => ReferenceCounter::ptr_eq(left, right),
            (Self::List(left), Self::List(right)) => ReferenceCounter::ptr_eq(left, right),
            (Self::Record(left), Self::Record(right)) => ReferenceCounter::ptr_eq(left, right),
            (Self::Text(_) | Self::List(_) | Self::Record(_), _)
            | (_, Self::Text(_) | Self::List(_) | Self::Record(_)) => false,
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Float(left), Self::Float(right)) => left == right,
            (Self::Text(left), Self::Text(right)) => {
                ReferenceCounter::ptr_eq(left, right) || left == right
            }
            (Self::List(left), Self::List(right)) => {
                ReferenceCounter::ptr_eq(left, right) || left == right
            }
            (Self::Record(left), Self::Record(right)) => {
                ReferenceCounter::ptr_eq(left, right) || left == right
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("null"),
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
            Self::Text(value) => write!(formatter, "{value:?}"),
            Self::List(items) => {
                formatter.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{item}")?;
                }
                formatter.write_str("]")
            }
            Self::Record(entries) => {
                formatter.write_str("{")?;
                for (index, (name, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{name}: {value}")?;
                }
                formatter.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(ReferenceCounter::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(ReferenceCounter::from(value))
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(ReferenceCounter::new(items))
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(entries: BTreeMap<String, Self>) -> Self {
        Self::Record(ReferenceCounter::new(entries))
    }
}

static_assertions::assert_impl_all!(Value: crate::Data, Default);

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(Value: Send, Sync);

/// Creates a record [`Value`].
///
/// # Syntax
///
/// ```text
/// record! { "name" => value, ... }
/// ```
///
/// Each value goes through `Value::from`, so scalars, strings and nested
/// records can be mixed freely.
///
/// # Example
///
/// ```
/// use bifocal::record;
/// use bifocal::value::Value;
///
/// let nested = record! { "a" => 1, "b" => record! { "c" => "x" } };
/// assert_eq!(
///     nested.field("b").and_then(|b| b.field("c")),
///     Some(&Value::from("x"))
/// );
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::value::Value::record(
            ::std::iter::empty::<(::std::string::String, $crate::value::Value)>(),
        )
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::value::Value::record([$(($name, $crate::value::Value::from($value))),+])
    };
}
