//! Core, non-public data structures: the registration record and the
//! thread-local resolution stack used to detect circular dependencies.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::error::{BoxError, ContainerError};
use crate::lifetime::Lifetime;

/// A type-erased, shared service instance.
pub(crate) type AnyInstance = Arc<dyn Any + Send + Sync>;

/// A type-erased factory. It receives the container so it can resolve its
/// own dependencies while it runs.
pub(crate) type FactoryFn =
  Arc<dyn Fn(&Container) -> Result<AnyInstance, BoxError> + Send + Sync>;

/// A type-erased teardown hook, bound to the concrete service type at
/// registration time.
pub(crate) type DisposerFn =
  Arc<dyn Fn(&AnyInstance) -> Result<(), BoxError> + Send + Sync>;

/// One registered service.
///
/// Every field is either `Copy` or an `Arc`, so the registry hands out
/// clones and no map reference is held while a factory runs.
#[derive(Clone)]
pub(crate) struct ServiceRegistration {
  pub(crate) lifetime: Lifetime,
  pub(crate) factory: FactoryFn,
  /// The singleton cache. Populated only for `Singleton` registrations,
  /// and only on a successful construction.
  pub(crate) cell: Arc<OnceCell<AnyInstance>>,
  pub(crate) disposer: Option<DisposerFn>,
}

impl ServiceRegistration {
  pub(crate) fn new(
    lifetime: Lifetime,
    factory: FactoryFn,
    disposer: Option<DisposerFn>,
  ) -> Self {
    Self {
      lifetime,
      factory,
      cell: Arc::new(OnceCell::new()),
      disposer,
    }
  }

  /// A singleton registration around an already-built instance.
  pub(crate) fn with_instance(instance: AnyInstance) -> Self {
    Self {
      lifetime: Lifetime::Singleton,
      factory: Arc::new(|_: &Container| {
        panic!("pre-initialized singleton factory should not be called")
      }),
      cell: Arc::new(OnceCell::with_value(instance)),
      disposer: None,
    }
  }
}

// --- Cycle detection ---

thread_local! {
  // The services currently under construction on this thread, in call
  // order. A Vec rather than a set: a detected cycle reports its full path.
  static RESOLVING_STACK: RefCell<Vec<ResolveFrame>> = RefCell::new(Vec::new());
}

// Frames carry the container's id so that independent containers resolving
// the same service name on one thread cannot shadow each other.
struct ResolveFrame {
  container: u64,
  name: String,
}

/// An RAII guard marking a service as under construction on the current
/// thread.
///
/// `enter` fails when the service is already on the stack, carrying the
/// ordered cycle path. Dropping the guard removes the frame on every exit
/// path (success, factory error, or a propagated cycle error), so the stack
/// never leaks stale entries across independent resolutions.
pub(crate) struct ResolutionGuard {
  container: u64,
  name: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(container: u64, name: &str) -> Result<Self, ContainerError> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(first) = stack
        .iter()
        .position(|frame| frame.container == container && frame.name == name)
      {
        let mut cycle: Vec<String> =
          stack[first..].iter().map(|frame| frame.name.clone()).collect();
        cycle.push(name.to_owned());
        return Err(ContainerError::CircularDependency { cycle });
      }
      stack.push(ResolveFrame {
        container,
        name: name.to_owned(),
      });
      Ok(())
    })?;
    Ok(Self {
      container,
      name: name.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(last) = stack
        .iter()
        .rposition(|frame| frame.container == self.container && frame.name == self.name)
      {
        stack.remove(last);
      }
    });
  }
}
