use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use warden::{Container, ContainerError};

// --- Test Fixtures ---

#[derive(Debug)]
struct Node {
  label: &'static str,
}

fn cycle_of(err: ContainerError) -> Vec<String> {
  match err {
    ContainerError::CircularDependency { cycle } => cycle,
    other => panic!("expected CircularDependency, got: {other}"),
  }
}

// --- Cycle Tests ---

#[test]
fn test_a_service_resolving_itself_is_a_cycle() {
  // Arrange
  let container = Container::new();
  container
    .register_singleton("a", |c: &Container| {
      let _self_again = c.resolve::<Node>("a")?;
      Ok(Node { label: "a" })
    })
    .unwrap();

  // Act
  let err = container.resolve::<Node>("a").unwrap_err();

  // Assert
  let cycle = cycle_of(err);
  assert_eq!(cycle, vec!["a".to_string(), "a".to_string()]);
}

#[test]
fn test_a_three_node_cycle_reports_the_full_path() {
  // Arrange: a circular dependency a -> b -> c -> a.
  let container = Container::new();
  container
    .register_singleton("a", |c: &Container| {
      let _b = c.resolve::<Node>("b")?;
      Ok(Node { label: "a" })
    })
    .unwrap();
  container
    .register_singleton("b", |c: &Container| {
      let _c = c.resolve::<Node>("c")?;
      Ok(Node { label: "b" })
    })
    .unwrap();
  container
    .register_singleton("c", |c: &Container| {
      let _a = c.resolve::<Node>("a")?;
      Ok(Node { label: "c" })
    })
    .unwrap();

  // Act
  let err = container.resolve::<Node>("a").unwrap_err();

  // Assert: the error renders the ordered path for diagnostics.
  assert_eq!(err.to_string(), "circular dependency detected: a -> b -> c -> a");
  let cycle = cycle_of(err);
  assert_eq!(cycle, vec!["a", "b", "c", "a"]);
}

#[test]
fn test_an_acyclic_chain_resolves_with_each_factory_running_once() {
  // Arrange
  let container = Container::new();
  let calls = Arc::new(AtomicUsize::new(0));

  let counter = calls.clone();
  container
    .register_singleton("c", move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Node { label: "c" })
    })
    .unwrap();
  let counter = calls.clone();
  container
    .register_singleton("b", move |c: &Container| {
      counter.fetch_add(1, Ordering::SeqCst);
      let _c = c.resolve::<Node>("c")?;
      Ok(Node { label: "b" })
    })
    .unwrap();
  let counter = calls.clone();
  container
    .register_singleton("a", move |c: &Container| {
      counter.fetch_add(1, Ordering::SeqCst);
      let _b = c.resolve::<Node>("b")?;
      Ok(Node { label: "a" })
    })
    .unwrap();

  // Act
  let a = container.resolve::<Node>("a").unwrap();

  // Assert
  assert_eq!(a.label, "a");
  assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_sibling_subtrees_may_share_a_dependency() {
  // Arrange: cycle detection is path-sensitive. "shared" appears under both
  // "left" and "right" on the same chain without ever nesting inside itself.
  let container = Container::new();

  container
    .register_transient("shared", |_| Ok(Node { label: "shared" }))
    .unwrap();
  container
    .register_transient("left", |c: &Container| {
      let _shared = c.resolve::<Node>("shared")?;
      Ok(Node { label: "left" })
    })
    .unwrap();
  container
    .register_transient("right", |c: &Container| {
      let _shared = c.resolve::<Node>("shared")?;
      Ok(Node { label: "right" })
    })
    .unwrap();
  container
    .register_transient("root", |c: &Container| {
      let _left = c.resolve::<Node>("left")?;
      let _right = c.resolve::<Node>("right")?;
      Ok(Node { label: "root" })
    })
    .unwrap();

  // Act & Assert
  let root = container.resolve::<Node>("root").unwrap();
  assert_eq!(root.label, "root");
}

#[test]
fn test_the_stack_is_clean_after_a_cycle_error() {
  // Arrange
  let container = Container::new();
  container
    .register_transient("a", |c: &Container| {
      let _b = c.resolve::<Node>("b")?;
      Ok(Node { label: "a" })
    })
    .unwrap();
  container
    .register_transient("b", |c: &Container| {
      let _a = c.resolve::<Node>("a")?;
      Ok(Node { label: "b" })
    })
    .unwrap();
  container
    .register_transient("standalone", |_| Ok(Node { label: "standalone" }))
    .unwrap();

  // Act: two failing resolutions in a row. Stale stack entries would change
  // the reported cycle the second time.
  let first = cycle_of(container.resolve::<Node>("a").unwrap_err());
  let second = cycle_of(container.resolve::<Node>("a").unwrap_err());

  // Assert
  assert_eq!(first, second);

  // An unrelated resolution on the same thread is unaffected.
  let standalone = container.resolve::<Node>("standalone").unwrap();
  assert_eq!(standalone.label, "standalone");
}

#[test]
fn test_an_already_constructed_singleton_cannot_join_a_cycle() {
  // Arrange: once "base" is cached, a later chain that passes through it
  // terminates there instead of re-entering its factory.
  let container = Container::new();

  container
    .register_singleton("base", |_| Ok(Node { label: "base" }))
    .unwrap();
  container
    .register_singleton("consumer", |c: &Container| {
      let _base = c.resolve::<Node>("base")?;
      Ok(Node { label: "consumer" })
    })
    .unwrap();

  // Act: construct "base" on its own chain first.
  let _base = container.resolve::<Node>("base").unwrap();
  let consumer = container.resolve::<Node>("consumer").unwrap();

  // Assert
  assert_eq!(consumer.label, "consumer");
}
