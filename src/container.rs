//! The main `Container` struct and its associated methods.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::core::{AnyInstance, DisposerFn, FactoryFn, ResolutionGuard, ServiceRegistration};
use crate::dispose::{run_disposer, Dispose};
use crate::error::{BoxError, ContainerError};
use crate::lifetime::Lifetime;
use crate::registry::ServiceRegistry;

// Distinguishes containers on the shared thread-local resolution stack.
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(0);

/// A dynamic service container.
///
/// The container maps logical service names to factories, builds instances
/// on demand under a [`Lifetime`] policy, detects circular resolution
/// chains, and tears down owned instances on [`clear_scope`](Self::clear_scope)
/// and [`dispose`](Self::dispose).
///
/// It is thread-safe and is itself the unit of shared mutable state: callers
/// construct and own one container per application or test. There is no
/// process-wide instance.
pub struct Container {
  id: u64,
  registry: ServiceRegistry,
  scoped: Mutex<HashMap<String, AnyInstance>>,
  disposed: AtomicBool,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      registry: ServiceRegistry::new(),
      scoped: Mutex::new(HashMap::new()),
      disposed: AtomicBool::new(false),
    }
  }

  // --- Registration ---

  /// Registers `factory` under `name` with the default `Transient`
  /// lifetime.
  pub fn register<T, F>(&self, name: &str, factory: F) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_with_lifetime(name, Lifetime::Transient, factory)
  }

  /// Registers `factory` under `name` with an explicit lifetime.
  ///
  /// The name must be non-empty and not already registered; registration
  /// never overwrites an existing service.
  pub fn register_with_lifetime<T, F>(
    &self,
    name: &str,
    lifetime: Lifetime,
    factory: F,
  ) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_internal(name, ServiceRegistration::new(lifetime, erase(factory), None))
  }

  /// Registers a `Singleton` service: one instance for the life of the
  /// container, created on first resolution.
  pub fn register_singleton<T, F>(&self, name: &str, factory: F) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_with_lifetime(name, Lifetime::Singleton, factory)
  }

  /// Registers a `Scoped` service: one instance per scope, released by
  /// [`clear_scope`](Self::clear_scope).
  pub fn register_scoped<T, F>(&self, name: &str, factory: F) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_with_lifetime(name, Lifetime::Scoped, factory)
  }

  /// Registers a `Transient` service: a fresh instance on every resolution.
  pub fn register_transient<T, F>(&self, name: &str, factory: F) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_with_lifetime(name, Lifetime::Transient, factory)
  }

  /// Registers an already-built value as a singleton.
  pub fn register_instance<T>(&self, name: &str, instance: T) -> Result<(), ContainerError>
  where
    T: Any + Send + Sync,
  {
    let instance: AnyInstance = Arc::new(instance);
    self.register_internal(name, ServiceRegistration::with_instance(instance))
  }

  /// Registers a service whose instances are torn down through their
  /// [`Dispose`] implementation at `clear_scope` or `dispose`.
  pub fn register_disposable<T, F>(
    &self,
    name: &str,
    lifetime: Lifetime,
    factory: F,
  ) -> Result<(), ContainerError>
  where
    T: Dispose + Any,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.register_internal(
      name,
      ServiceRegistration::new(lifetime, erase(factory), Some(disposer_for::<T>())),
    )
  }

  fn register_internal(
    &self,
    name: &str,
    registration: ServiceRegistration,
  ) -> Result<(), ContainerError> {
    self.ensure_active()?;
    if name.is_empty() {
      return Err(ContainerError::EmptyServiceName);
    }
    let lifetime = registration.lifetime;
    self.registry.insert(name, registration)?;
    trace!(service = name, lifetime = ?lifetime, "registered");
    Ok(())
  }

  // --- Resolution ---

  /// Resolves the service registered under `name` as a `T`.
  ///
  /// Fails with [`ContainerError::ServiceNotFound`] for an unregistered
  /// name, [`ContainerError::CircularDependency`] when the chain re-enters
  /// a service already under construction, and
  /// [`ContainerError::ServiceConstruction`] when a factory fails. A failed
  /// construction caches nothing, for any lifetime, so the service may be
  /// resolved again later.
  pub fn resolve<T>(&self, name: &str) -> Result<Arc<T>, ContainerError>
  where
    T: Any + Send + Sync,
  {
    self.ensure_active()?;
    let registration = self
      .registry
      .get(name)
      .ok_or_else(|| ContainerError::ServiceNotFound(name.to_owned()))?;

    let instance = match registration.lifetime {
      Lifetime::Singleton => self.resolve_singleton(name, &registration)?,
      Lifetime::Scoped => self.resolve_scoped(name, &registration)?,
      Lifetime::Transient => self.construct(name, &registration)?,
    };

    instance
      .downcast::<T>()
      .map_err(|_| ContainerError::MismatchedType {
        name: name.to_owned(),
        expected: type_name::<T>(),
      })
  }

  /// Returns whether `name` is currently registered.
  pub fn is_registered(&self, name: &str) -> bool {
    self.registry.contains(name)
  }

  /// The names of all currently registered services, in no particular
  /// order.
  pub fn registered_names(&self) -> Vec<String> {
    self.registry.names()
  }

  // --- Lifetime policies ---

  fn resolve_singleton(
    &self,
    name: &str,
    registration: &ServiceRegistration,
  ) -> Result<AnyInstance, ContainerError> {
    // Fast path: an already-constructed singleton bypasses the cycle
    // tracker; it cannot participate in a new cycle.
    if let Some(existing) = registration.cell.get() {
      return Ok(existing.clone());
    }
    // Enter before touching the cell, so a re-entrant chain surfaces as a
    // cycle instead of deadlocking the cell's initialization lock.
    let _guard = ResolutionGuard::enter(self.id, name)?;
    registration
      .cell
      .get_or_try_init(|| self.invoke_factory(name, registration))
      .map(|instance| instance.clone())
  }

  fn resolve_scoped(
    &self,
    name: &str,
    registration: &ServiceRegistration,
  ) -> Result<AnyInstance, ContainerError> {
    {
      let scoped = self.scoped.lock();
      if let Some(existing) = scoped.get(name) {
        return Ok(existing.clone());
      }
    }
    // The lock is never held while the factory runs; factories resolve
    // their own dependencies through this same cache.
    let instance = self.construct(name, registration)?;
    let mut scoped = self.scoped.lock();
    // First insert wins if two chains raced on the same name.
    Ok(scoped.entry(name.to_owned()).or_insert(instance).clone())
  }

  fn construct(
    &self,
    name: &str,
    registration: &ServiceRegistration,
  ) -> Result<AnyInstance, ContainerError> {
    let _guard = ResolutionGuard::enter(self.id, name)?;
    self.invoke_factory(name, registration)
  }

  fn invoke_factory(
    &self,
    name: &str,
    registration: &ServiceRegistration,
  ) -> Result<AnyInstance, ContainerError> {
    trace!(service = name, "invoking factory");
    (registration.factory)(self).map_err(|error| match error.downcast::<ContainerError>() {
      // A nested container error (a cycle, or a deeper service's failure)
      // propagates unchanged so the outermost caller sees the root cause.
      Ok(inner) => *inner,
      Err(other) => ContainerError::ServiceConstruction {
        name: name.to_owned(),
        source: other,
      },
    })
  }

  // --- Scope management & teardown ---

  /// Disposes and empties the scoped cache. Registrations and singleton
  /// instances are unaffected; the next scoped resolution re-runs the
  /// factory.
  pub fn clear_scope(&self) {
    let drained = mem::take(&mut *self.scoped.lock());
    if drained.is_empty() {
      return;
    }
    debug!(instances = drained.len(), "clearing scope");
    for (name, instance) in &drained {
      self.dispose_instance(name, instance);
    }
  }

  /// Disposes every owned instance (scoped and singleton), then removes
  /// all registrations.
  ///
  /// Idempotent: repeated calls are no-ops. After disposal the container
  /// is unusable; registration and resolution fail with
  /// [`ContainerError::Disposed`].
  pub fn dispose(&self) {
    if self.disposed.swap(true, Ordering::SeqCst) {
      return;
    }
    debug!("disposing container");
    let scoped = mem::take(&mut *self.scoped.lock());
    for (name, instance) in &scoped {
      self.dispose_instance(name, instance);
    }
    for (name, registration) in self.registry.drain() {
      if let (Some(instance), Some(disposer)) = (registration.cell.get(), &registration.disposer)
      {
        run_disposer(&name, instance, disposer);
      }
    }
  }

  fn dispose_instance(&self, name: &str, instance: &AnyInstance) {
    // The hook, if any, lives on the registration.
    if let Some(registration) = self.registry.get(name) {
      if let Some(disposer) = &registration.disposer {
        run_disposer(name, instance, disposer);
      }
    }
  }

  fn ensure_active(&self) -> Result<(), ContainerError> {
    if self.disposed.load(Ordering::SeqCst) {
      return Err(ContainerError::Disposed);
    }
    Ok(())
  }
}

// --- Type erasure helpers ---

fn erase<T, F>(factory: F) -> FactoryFn
where
  T: Any + Send + Sync,
  F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
{
  Arc::new(move |container: &Container| {
    factory(container).map(|instance| Arc::new(instance) as AnyInstance)
  })
}

fn disposer_for<T: Dispose + Any>() -> DisposerFn {
  Arc::new(|instance: &AnyInstance| match instance.downcast_ref::<T>() {
    Some(service) => service.dispose(),
    None => Ok(()),
  })
}
