//! Capability and risk tags, and the rules that combine them.
//!
//! Every composable optic carries a [`Shape`]: a [`Capability`] saying what it
//! can do with its focus and a [`Risk`] saying whether the focus is always
//! there. Composition never inspects the functions inside an optic to decide
//! the result kind; it only combines the two shapes:
//!
//! - [`Risk::widen`]: `Maybe` dominates `Single`.
//! - [`Capability::narrow`]: anything composed with a read-only optic becomes
//!   read-only; `Select` composed with `Convert` (in either order) stays
//!   `Select`; only `Convert` with `Convert` stays `Convert`.
//!
//! # Examples
//!
//! ```
//! use bifocal::optics::{Capability, NodeKind, Risk, Shape};
//!
//! let selector = Shape::new(Capability::Select, Risk::Single);
//! let maybe_converter = Shape::new(Capability::Convert, Risk::Maybe);
//!
//! let composed = selector.compose(maybe_converter);
//! assert_eq!(composed.kind(), NodeKind::MaybeSelector);
//! assert_eq!(maybe_converter.compose(selector).kind(), NodeKind::MaybeSelector);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Risk
// =============================================================================

/// Whether an optic always finds its focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Risk {
    /// The focus is always present.
    Single,
    /// The focus may be absent.
    Maybe,
}

impl Risk {
    /// Risk of a composition: `Maybe` if either side is `Maybe`.
    #[must_use]
    pub const fn widen(self, other: Self) -> Self {
        match (self, other) {
            (Self::Single, Self::Single) => Self::Single,
            (Self::Single | Self::Maybe, Self::Maybe) | (Self::Maybe, Self::Single) => Self::Maybe,
        }
    }
}

// =============================================================================
// Capability
// =============================================================================

/// What an optic can do with its focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read only.
    Get,
    /// Read and write the focus back in place.
    Select,
    /// Read and rebuild the whole subject through a reverse function.
    Convert,
}

impl Capability {
    /// Capability of a composition.
    ///
    /// | self \ other | Get | Select | Convert |
    /// |--------------|-----|--------|---------|
    /// | Get          | Get | Get    | Get     |
    /// | Select       | Get | Select | Select  |
    /// | Convert      | Get | Select | Convert |
    #[must_use]
    pub const fn narrow(self, other: Self) -> Self {
        match (self, other) {
            (Self::Get, _) | (_, Self::Get) => Self::Get,
            (Self::Select, Self::Select | Self::Convert) | (Self::Convert, Self::Select) => {
                Self::Select
            }
            (Self::Convert, Self::Convert) => Self::Convert,
        }
    }

    /// Returns `true` if optics of this capability can write.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Get)
    }
}

// =============================================================================
// Shape
// =============================================================================

/// The pair of tags carried by every composable optic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// What the optic can do.
    pub capability: Capability,
    /// Whether the focus may be absent.
    pub risk: Risk,
}

impl Shape {
    /// Creates a shape.
    #[must_use]
    pub const fn new(capability: Capability, risk: Risk) -> Self {
        Self { capability, risk }
    }

    /// Shape of `self` composed with `other`.
    ///
    /// Symmetric: `a.compose(b) == b.compose(a)`.
    #[must_use]
    pub const fn compose(self, other: Self) -> Self {
        Self {
            capability: self.capability.narrow(other.capability),
            risk: self.risk.widen(other.risk),
        }
    }

    /// The composable node kind with this shape.
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        match (self.capability, self.risk) {
            (Capability::Get, Risk::Single) => NodeKind::Get,
            (Capability::Get, Risk::Maybe) => NodeKind::MaybeGet,
            (Capability::Select, Risk::Single) => NodeKind::Selector,
            (Capability::Select, Risk::Maybe) => NodeKind::MaybeSelector,
            (Capability::Convert, Risk::Single) => NodeKind::Converter,
            (Capability::Convert, Risk::Maybe) => NodeKind::MaybeConverter,
        }
    }

    /// All six composable shapes.
    pub const ALL: [Self; 6] = [
        Self::new(Capability::Get, Risk::Single),
        Self::new(Capability::Get, Risk::Maybe),
        Self::new(Capability::Select, Risk::Single),
        Self::new(Capability::Select, Risk::Maybe),
        Self::new(Capability::Convert, Risk::Single),
        Self::new(Capability::Convert, Risk::Maybe),
    ];
}

// =============================================================================
// NodeKind
// =============================================================================

/// The kind of an optic node.
///
/// `Get`, `MaybeGet`, `Set` and `Modify` are primitives: they wrap a single
/// underlying function that extensions may intercept. The other four are
/// composites built from primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Total read.
    Get,
    /// Read that may find nothing.
    MaybeGet,
    /// Write.
    Set,
    /// Read-transform-write.
    Modify,
    /// Total read plus write.
    Selector,
    /// Partial read plus write.
    MaybeSelector,
    /// Total forward and backward conversion.
    Converter,
    /// Partial forward and total backward conversion.
    MaybeConverter,
}

impl NodeKind {
    /// Tags of a composable kind; `None` for `Set` and `Modify`.
    #[must_use]
    pub const fn shape(self) -> Option<Shape> {
        let shape = match self {
            Self::Get => Shape::new(Capability::Get, Risk::Single),
            Self::MaybeGet => Shape::new(Capability::Get, Risk::Maybe),
            Self::Selector => Shape::new(Capability::Select, Risk::Single),
            Self::MaybeSelector => Shape::new(Capability::Select, Risk::Maybe),
            Self::Converter => Shape::new(Capability::Convert, Risk::Single),
            Self::MaybeConverter => Shape::new(Capability::Convert, Risk::Maybe),
            Self::Set | Self::Modify => return None,
        };
        Some(shape)
    }

    /// Returns `true` for kinds that wrap a single underlying function.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Get | Self::MaybeGet | Self::Set | Self::Modify)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::MaybeGet => "maybe_get",
            Self::Set => "set",
            Self::Modify => "modify",
            Self::Selector => "selector",
            Self::MaybeSelector => "maybe_selector",
            Self::Converter => "converter",
            Self::MaybeConverter => "maybe_converter",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

// =============================================================================
// NodeId
// =============================================================================

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier assigned to every node at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}
