//! Call tracing.
//!
//! The [`Trace`] extension logs every call to a primitive node, and its
//! result, as `tracing` events at `DEBUG` level under the `bifocal::trace`
//! target. Nested calls are indented with one `">> "` per level, so a composed
//! read shows the calls it is made of underneath it.
//!
//! ```text
//! DEBUG bifocal::trace: get #12 <- Record({"a": Int(1)})
//! DEBUG bifocal::trace: >> get #10 <- Record({"a": Int(1)})
//! DEBUG bifocal::trace: >> get #10 -> Int(1)
//! DEBUG bifocal::trace: get #12 -> Int(1)
//! ```

use std::cell::Cell;

use super::extension::{Call, Extension, ExtensionRef, Interceptor, Node, Outcome};
use crate::shared::ReferenceCounter;

/// Logs every primitive call and its result.
#[derive(Debug, Default)]
pub struct Trace;

#[cfg(feature = "arc")]
static TRACE: std::sync::LazyLock<ExtensionRef> =
    std::sync::LazyLock::new(|| ReferenceCounter::new(Trace));

#[cfg(not(feature = "arc"))]
thread_local! {
    static TRACE: ExtensionRef = ReferenceCounter::new(Trace);
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

impl Trace {
    /// The shared tracing extension.
    ///
    /// With `arc` there is one handle per process, otherwise one per thread.
    /// Attaching it twice is a no-op.
    #[must_use]
    pub fn extension() -> ExtensionRef {
        #[cfg(feature = "arc")]
        {
            ReferenceCounter::clone(&TRACE)
        }
        #[cfg(not(feature = "arc"))]
        {
            TRACE.with(ReferenceCounter::clone)
        }
    }
}

impl Extension for Trace {
    fn apply(&self, node: &mut Node<'_>) {
        node.intercept(ReferenceCounter::new(TraceCalls));
    }
}

struct TraceCalls;

/// Restores the calling thread's nesting depth when a traced call returns or
/// unwinds.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> (Self, usize) {
        let level = DEPTH.with(|depth| {
            let level = depth.get();
            depth.set(level + 1);
            level
        });
        (Self, level)
    }

    #[cfg(test)]
    fn current() -> usize {
        DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

impl Interceptor for TraceCalls {
    fn intercept(&self, call: &Call<'_>, proceed: &mut dyn FnMut() -> Outcome) -> Outcome {
        let (_guard, level) = DepthGuard::enter();
        let indent = ">> ".repeat(level);
        let kind = call.kind();
        let node = call.node();

        match call.focus() {
            Some(focus) => tracing::debug!(
                target: "bifocal::trace",
                params = ?call.params(),
                "{indent}{kind} {node} <- {:?} := {focus:?}",
                call.subject(),
            ),
            None => tracing::debug!(
                target: "bifocal::trace",
                params = ?call.params(),
                "{indent}{kind} {node} <- {:?}",
                call.subject(),
            ),
        }

        let outcome = proceed();
        tracing::debug!(target: "bifocal::trace", "{indent}{kind} {node} -> {:?}", outcome.value());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::{Get, Params};

    #[test]
    fn test_depth_returns_to_zero() {
        {
            let (_outer, outer_level) = DepthGuard::enter();
            let (_inner, inner_level) = DepthGuard::enter();
            assert_eq!((outer_level, inner_level), (0, 1));
        }
        assert_eq!(DepthGuard::current(), 0);
    }

    #[test]
    fn test_depth_is_per_thread() {
        let (_outer, outer_level) = DepthGuard::enter();
        let other_level = std::thread::spawn(|| DepthGuard::enter().1)
            .join()
            .expect("tracing thread panicked");
        assert_eq!((outer_level, other_level), (0, 0));
        assert_eq!(DepthGuard::current(), 1);
    }

    #[test]
    fn test_tracing_does_not_change_results() {
        let length = Get::new(|text: &String, _: &Params| text.len());
        let traced = length.trace();
        assert_eq!(traced.get(&"abcd".to_string(), &Params::EMPTY), 4);
        assert_ne!(traced.id(), length.id());
    }

    #[test]
    fn test_extension_is_shared() {
        let first = Trace::extension();
        let second = Trace::extension();
        assert!(ReferenceCounter::ptr_eq(&first, &second));
    }

    #[cfg(feature = "arc")]
    #[test]
    fn test_extension_is_shared_across_threads() {
        let here = Trace::extension();
        let there = std::thread::spawn(Trace::extension)
            .join()
            .expect("tracing thread panicked");
        assert!(ReferenceCounter::ptr_eq(&here, &there));
    }
}
