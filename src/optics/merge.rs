//! Overlaying partial values.
//!
//! [`Merge`] backs the `merge` and `deep_merge` operations of write-capable
//! optics. Both are ordinary modifications whose update function overlays a
//! patch on the current focus.

use std::collections::BTreeMap;

use crate::shared::ReferenceCounter;
use crate::value::Value;

/// Values that can be overlaid with a partial patch of the same type.
pub trait Merge: Sized {
    /// Shallow overlay: top-level entries of `patch` replace those of `self`.
    #[must_use]
    fn merge(&self, patch: &Self) -> Self;

    /// Recursive overlay: nested structures are merged entry by entry and
    /// anything else in `patch` replaces the original outright.
    #[must_use]
    fn deep_merge(&self, patch: &Self) -> Self;
}

impl Merge for Value {
    fn merge(&self, patch: &Self) -> Self {
        match (self, patch) {
            (Self::Record(base), Self::Record(overlay)) => {
                let mut entries = BTreeMap::clone(base);
                entries.extend(
                    overlay
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone())),
                );
                Self::Record(ReferenceCounter::new(entries))
            }
            _ => patch.clone(),
        }
    }

    fn deep_merge(&self, patch: &Self) -> Self {
        match (self, patch) {
            (Self::Record(base), Self::Record(overlay)) => {
                let mut entries = BTreeMap::clone(base);
                for (name, value) in overlay.iter() {
                    let merged = match entries.get(name) {
                        Some(existing) => existing.deep_merge(value),
                        None => value.clone(),
                    };
                    entries.insert(name.clone(), merged);
                }
                Self::Record(ReferenceCounter::new(entries))
            }
            _ => patch.clone(),
        }
    }
}
