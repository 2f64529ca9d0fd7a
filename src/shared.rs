//! Pointer types and trait bounds shared by values and optics.
//!
//! The `arc` feature switches every reference-counted allocation in the crate
//! from `Rc` to `Arc` and adds `Send + Sync` to the [`Shareable`] bound, which
//! makes optics and [`Value`](crate::value::Value)s usable across threads.

use std::fmt::Debug;

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub type ReferenceCounter<T> = std::sync::Arc<T>;

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(not(feature = "arc"))]
pub type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Shareable
// =============================================================================

/// Marker for anything stored inside an optic node.
///
/// With the `arc` feature this requires `Send + Sync`; otherwise it is
/// implemented for every type.
#[cfg(feature = "arc")]
pub trait Shareable: Send + Sync {}

#[cfg(feature = "arc")]
impl<T: Send + Sync + ?Sized> Shareable for T {}

/// Marker for anything stored inside an optic node.
///
/// With the `arc` feature this requires `Send + Sync`; otherwise it is
/// implemented for every type.
#[cfg(not(feature = "arc"))]
pub trait Shareable {}

#[cfg(not(feature = "arc"))]
impl<T: ?Sized> Shareable for T {}

// =============================================================================
// Data
// =============================================================================

/// Bound for subjects and foci flowing through optics.
///
/// - `Clone`: writes return owned subjects, and an unchanged subject is
///   returned as a clone of the input.
/// - `PartialEq`: no-op write detection and memoization.
/// - `Debug`: call tracing.
///
/// Implemented automatically for every qualifying type.
pub trait Data: Clone + PartialEq + Debug + Shareable + 'static {}

impl<T> Data for T where T: Clone + PartialEq + Debug + Shareable + 'static {}

// =============================================================================
// MemoCell
// =============================================================================

/// Interior-mutable slot used by per-node caches.
///
/// A `RefCell` by default. Concurrent callers racing on population only cause
/// redundant recomputation, never a wrong result, as long as the cached
/// functions are pure.
#[cfg(not(feature = "arc"))]
pub(crate) struct MemoCell<T>(std::cell::RefCell<T>);

#[cfg(not(feature = "arc"))]
impl<T> MemoCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(std::cell::RefCell::new(value))
    }

    /// Runs `function` with exclusive access to the slot.
    ///
    /// The borrow is released before returning, so `function` must not
    /// call back into the same cell.
    pub(crate) fn with<R>(&self, function: impl FnOnce(&mut T) -> R) -> R {
        function(&mut self.0.borrow_mut())
    }
}

/// Interior-mutable slot used by per-node caches.
///
/// Guarded by a `parking_lot::Mutex` under the `arc` feature.
#[cfg(feature = "arc")]
pub(crate) struct MemoCell<T>(parking_lot::Mutex<T>);

#[cfg(feature = "arc")]
impl<T> MemoCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(parking_lot::Mutex::new(value))
    }

    /// Runs `function` with exclusive access to the slot.
    ///
    /// The lock is released before returning, so `function` must not
    /// call back into the same cell.
    pub(crate) fn with<R>(&self, function: impl FnOnce(&mut T) -> R) -> R {
        function(&mut self.0.lock())
    }
}
