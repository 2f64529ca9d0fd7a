//! Error type for optic construction and dispatch.
//!
//! An absent focus is never an error: reads report it as `None`, and writes
//! through an absent focus return the subject unchanged. [`OpticError`] only
//! covers misuse that can be detected by the library itself.

use super::discriminant::NodeKind;

/// Errors raised while building or dispatching optics.
///
/// # Examples
///
/// ```rust
/// use bifocal::optics::{NodeKind, OpticError};
///
/// let error = OpticError::ReadOnly { kind: NodeKind::MaybeGet };
/// assert_eq!(format!("{error}"), "maybe_get optic is read-only");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpticError {
    /// A parameter was supplied that the optic does not require.
    UnknownParameter {
        /// The supplied parameter name.
        name: String,
    },
    /// Required parameters were not supplied.
    MissingParameters {
        /// The names that are missing, in order.
        names: Vec<String>,
    },
    /// A write was attempted through a read-only optic.
    ReadOnly {
        /// The kind of the optic.
        kind: NodeKind,
    },
    /// An [`Optic`](super::Optic) held a different kind than requested.
    KindMismatch {
        /// The requested kind.
        expected: NodeKind,
        /// The kind actually held.
        found: NodeKind,
    },
    /// Two fields of a combined selector share a name.
    DuplicateField {
        /// The repeated field name.
        name: String,
    },
}

impl std::fmt::Display for OpticError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownParameter { name } => {
                write!(formatter, "parameter `{name}` is not required by this optic")
            }
            Self::MissingParameters { names } => {
                write!(formatter, "missing required parameters: {}", names.join(", "))
            }
            Self::ReadOnly { kind } => write!(formatter, "{kind} optic is read-only"),
            Self::KindMismatch { expected, found } => {
                write!(formatter, "expected a {expected} optic, found {found}")
            }
            Self::DuplicateField { name } => {
                write!(formatter, "field `{name}` is already defined")
            }
        }
    }
}

impl std::error::Error for OpticError {}
