//! Tests for the extension mechanism and the built-in [`Memoize`] and
//! [`Trace`] extensions.

use std::collections::BTreeSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bifocal::access::{Root, index_by, prop};
use bifocal::optics::extension::{self, Call, Interceptor, Node, Outcome};
use bifocal::optics::{
    ExtensionRef, Extensions, Get, Memoize, NodeId, NodeKind, Params, Selector, Trace,
};
use bifocal::value::Value;
use bifocal::{Data, ReferenceCounter, params, record};

// =============================================================================
// Helpers
// =============================================================================

fn counted<A: Data, B: Data>(calls: &Arc<AtomicUsize>, read: fn(&A) -> B) -> Get<A, B> {
    let counter = Arc::clone(calls);
    Get::new(move |subject: &A, _: &Params| {
        counter.fetch_add(1, Ordering::SeqCst);
        read(subject)
    })
}

type Seen = Arc<Mutex<Vec<(NodeId, NodeKind)>>>;

/// Records every node the extension is applied to.
fn recording() -> (ExtensionRef, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let extension = extension::from_fn(move |node: &mut Node<'_>| {
        sink.lock().unwrap().push((node.id(), node.kind()));
    });
    (extension, seen)
}

/// Counts the calls of every primitive it is attached to.
struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl Interceptor for CallCounter {
    fn intercept(&self, _: &Call<'_>, proceed: &mut dyn FnMut() -> Outcome) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        proceed()
    }
}

fn counting_calls() -> (ExtensionRef, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let shared = Arc::clone(&calls);
    let extension = extension::from_fn(move |node: &mut Node<'_>| {
        node.intercept(ReferenceCounter::new(CallCounter {
            calls: Arc::clone(&shared),
        }));
    });
    (extension, calls)
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs<T>(function: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();
    let result = tracing::subscriber::with_default(subscriber, function);
    let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, text)
}

// =============================================================================
// Memoize
// =============================================================================

#[test]
fn test_memoized_get_runs_once_for_same_subject_and_params() {
    let calls = Arc::new(AtomicUsize::new(0));
    let length = counted(&calls, |text: &String| text.len()).memoize();
    let subject = "optics".to_string();

    assert_eq!(length.get(&subject, &params! { "page" => 1 }), 6);
    assert_eq!(length.get(&subject, &params! { "page" => 1 }), 6);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_memoized_composition_caches_every_read_node() {
    let calls = Arc::new(AtomicUsize::new(0));
    let total = counted(&calls, Value::len).memoize();
    let users = prop("users").memoize().compose_get(&total);
    let state = record! { "users" => record! { "a" => 1, "b" => 2 } };

    assert_eq!(users.get(&state, &Params::EMPTY), 2);
    assert_eq!(users.get(&state, &Params::EMPTY), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let shrunk = prop("users").set(&state, &Params::EMPTY, record! { "a" => 1 });
    assert_eq!(users.get(&shrunk, &Params::EMPTY), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_memoize_attaches_once() {
    let selector = prop("a").memoize();
    assert_eq!(selector.extensions().len(), 1);
    assert_eq!(selector.memoize().id(), selector.id());
    assert!(selector.extensions().contains(&Memoize::extension()));
}

// =============================================================================
// Trace
// =============================================================================

#[test]
fn test_trace_logs_calls_and_results() {
    let traced = prop("a").trace();
    let (value, logs) = capture_logs(|| traced.get(&record! { "a" => 1 }, &Params::EMPTY));

    assert_eq!(value, Value::from(1));
    assert!(logs.contains("bifocal::trace"), "{logs}");
    assert!(logs.contains(&format!("get {} <-", traced.getter().id())), "{logs}");
    assert!(logs.contains("-> Int(1)"), "{logs}");
}

#[test]
fn test_trace_indents_nested_calls() {
    let root = Root::new().trace();
    let nested = root.prop("a").compose_selector(&root.prop("b"));
    let (value, logs) = capture_logs(|| {
        nested.get(&record! { "a" => record! { "b" => 2 } }, &Params::EMPTY)
    });

    assert_eq!(value, Value::from(2));
    assert!(logs.contains(">> get #"), "{logs}");
    assert!(
        logs.contains(&format!("get {} -> Int(2)", nested.getter().id())),
        "{logs}"
    );
}

#[test]
fn test_trace_shows_written_focus() {
    let traced = prop("a").trace();
    let (written, logs) = capture_logs(|| {
        traced.set(&record! { "a" => 1 }, &Params::EMPTY, Value::from(5))
    });

    assert_eq!(written, record! { "a" => 5 });
    assert!(logs.contains(":= Int(5)"), "{logs}");
}

#[test]
fn test_trace_without_subscriber_is_silent() {
    let traced = prop("a").trace();
    assert_eq!(
        traced.get(&record! { "a" => 3 }, &Params::EMPTY),
        Value::from(3)
    );
    assert!(traced.extensions().contains(&Trace::extension()));
}

// =============================================================================
// Extension Application
// =============================================================================

#[test]
fn test_extension_runs_once_per_node() {
    let (extension, seen) = recording();
    let name = prop("name").extend(extension.clone());
    let user = index_by("id").extend(extension.clone());
    let user_name = user.compose_selector(&name);
    let again = user_name.extend(extension);

    let seen = seen.lock().unwrap();
    let ids: BTreeSet<NodeId> = seen.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids.len(), seen.len(), "a node was visited twice: {seen:?}");
    assert!(seen.iter().any(|(id, _)| *id == user_name.id()));
    assert!(seen.iter().any(|(id, _)| *id == name.id()));
    assert_eq!(again.id(), user_name.id());
}

#[test]
fn test_composite_visits_cover_every_kind_built() {
    let (extension, seen) = recording();
    let selector = Selector::new(
        |value: &i64, _: &Params| *value,
        |_: &i64, _: &Params, value: i64| value,
    )
    .extend(extension);

    let kinds: BTreeSet<String> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|(_, kind)| kind.to_string())
        .collect();
    assert_eq!(
        kinds,
        ["get", "modify", "selector", "set"]
            .into_iter()
            .map(String::from)
            .collect()
    );
    assert_eq!(selector.extensions().len(), 1);
}

#[test]
fn test_interceptor_sees_every_primitive_call() {
    let (extension, calls) = counting_calls();
    let name = prop("name").extend(extension);

    name.get(&record! { "name" => "a" }, &Params::EMPTY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    name.set(&record! { "name" => "a" }, &Params::EMPTY, Value::from("b"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // modify goes through its own node, which calls the read and write nodes
    name.modify(&record! { "name" => "a" }, &Params::EMPTY, |value| value);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[test]
fn test_composition_inherits_left_extensions() {
    let (extension, _) = recording();
    let extended = prop("a").extend(extension.clone());
    let plain = prop("b");

    let left = extended.compose_selector(&plain);
    let right = plain.compose_selector(&extended);

    assert!(left.extensions().contains(&extension));
    assert!(right.extensions().is_empty());
}

#[test]
fn test_extensions_deduplicate_by_identity() {
    let (first, _) = recording();
    let (second, _) = recording();
    let extensions = Extensions::of(first.clone())
        .with(second.clone())
        .with(first);
    assert_eq!(extensions.len(), 2);
    assert_eq!(
        Extensions::of(Memoize::extension())
            .with(Memoize::extension())
            .len(),
        1
    );
}
