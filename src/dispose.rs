//! Teardown of container-owned instances.

use tracing::warn;

use crate::core::{AnyInstance, DisposerFn};
use crate::error::BoxError;

/// A teardown hook for services that hold releasable resources, such as
/// connection pools or file handles.
///
/// Register implementing services through
/// [`Container::register_disposable`](crate::Container::register_disposable).
/// The container invokes the hook once per owned instance: at `clear_scope`
/// for scoped instances, and at `dispose` for scoped and singleton
/// instances. Transient instances are never tracked, so their hooks are the
/// caller's responsibility.
///
/// Hook failures are logged and never propagate. Teardown is best-effort:
/// one failing instance must not keep the rest from being released.
pub trait Dispose: Send + Sync {
  fn dispose(&self) -> Result<(), BoxError>;
}

/// Runs one hook under isolated error handling.
pub(crate) fn run_disposer(name: &str, instance: &AnyInstance, disposer: &DisposerFn) {
  if let Err(error) = disposer(instance) {
    warn!(service = name, %error, "disposal hook failed");
  }
}
