//! Per-node caching of reads.
//!
//! The [`Memoize`] extension gives every `Get` and `MaybeGet` node it is
//! attached to a single cache slot holding the last subject, parameters and
//! result. A call hits when both the subject and the parameters equal the
//! cached ones; [`Value`](crate::value::Value) equality checks pointer
//! identity first, so re-reading the same tree is cheap.
//!
//! Writes are never cached. Cached functions are assumed to be pure.

use super::discriminant::NodeKind;
use super::extension::{Call, Datum, Extension, ExtensionRef, Interceptor, Node, Outcome};
use super::params::Params;
use crate::shared::{MemoCell, ReferenceCounter};

/// Caches the most recent result of every read node.
#[derive(Debug, Default)]
pub struct Memoize;

#[cfg(feature = "arc")]
static MEMOIZE: std::sync::LazyLock<ExtensionRef> =
    std::sync::LazyLock::new(|| ReferenceCounter::new(Memoize));

#[cfg(not(feature = "arc"))]
thread_local! {
    static MEMOIZE: ExtensionRef = ReferenceCounter::new(Memoize);
}

impl Memoize {
    /// The shared memoizing extension.
    ///
    /// With `arc` there is one handle per process, otherwise one per thread.
    /// Either way every node that can reach the handle sees the same one, so
    /// attaching it twice is a no-op.
    #[must_use]
    pub fn extension() -> ExtensionRef {
        #[cfg(feature = "arc")]
        {
            ReferenceCounter::clone(&MEMOIZE)
        }
        #[cfg(not(feature = "arc"))]
        {
            MEMOIZE.with(ReferenceCounter::clone)
        }
    }
}

impl Extension for Memoize {
    fn apply(&self, node: &mut Node<'_>) {
        if matches!(node.kind(), NodeKind::Get | NodeKind::MaybeGet) {
            node.intercept(ReferenceCounter::new(MemoSlot::default()));
        }
    }
}

struct MemoEntry {
    subject: Box<dyn Datum>,
    params: Params,
    outcome: Outcome,
}

impl MemoEntry {
    fn matches(&self, call: &Call<'_>) -> bool {
        self.subject.equals(call.subject()) && self.params == *call.params()
    }
}

struct MemoSlot {
    entry: MemoCell<Option<MemoEntry>>,
}

impl Default for MemoSlot {
    fn default() -> Self {
        Self {
            entry: MemoCell::new(None),
        }
    }
}

impl Interceptor for MemoSlot {
    fn intercept(&self, call: &Call<'_>, proceed: &mut dyn FnMut() -> Outcome) -> Outcome {
        let cached = self.entry.with(|entry| {
            entry
                .as_ref()
                .filter(|entry| entry.matches(call))
                .map(|entry| entry.outcome.clone())
        });
        if let Some(outcome) = cached {
            tracing::trace!(node = %call.node(), "memo hit");
            return outcome;
        }

        let outcome = proceed();
        let entry = MemoEntry {
            subject: call.subject().clone_datum(),
            params: call.params().clone(),
            outcome: outcome.clone(),
        };
        self.entry.with(|slot| *slot = Some(entry));
        outcome
    }
}
