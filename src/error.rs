//! Error types for registration, resolution, and teardown.

use thiserror::Error;

/// A boxed, dynamically typed error.
///
/// This is the error type user code hands across the container boundary:
/// factory failures and [`Dispose`](crate::Dispose) hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by container operations.
///
/// Registration and resolution errors always propagate synchronously to the
/// caller; the container never swallows them. Only disposal hook failures
/// are swallowed and logged, because teardown is best-effort.
#[derive(Debug, Error)]
pub enum ContainerError {
  /// A service with this name is already registered. Registration never
  /// overwrites; the original registration remains in effect.
  #[error("service '{0}' is already registered")]
  DuplicateService(String),

  /// Registration names must be non-empty.
  #[error("service name must not be empty")]
  EmptyServiceName,

  /// No service is registered under this name.
  #[error("service '{0}' is not registered")]
  ServiceNotFound(String),

  /// A resolution chain re-entered a service that is already under
  /// construction on the same chain. The payload is the ordered call path
  /// from the first occurrence of the re-entered service through the
  /// re-entry.
  #[error("circular dependency detected: {}", .cycle.join(" -> "))]
  CircularDependency {
    /// The names on the cycle, e.g. `["a", "b", "a"]`.
    cycle: Vec<String>,
  },

  /// The service's factory returned an error. Nothing is cached on
  /// failure, for any lifetime, so a later resolution attempts
  /// construction again.
  #[error("failed to construct service '{name}'")]
  ServiceConstruction {
    /// The service whose factory failed.
    name: String,
    #[source]
    source: BoxError,
  },

  /// The instance registered under this name is not of the requested type.
  #[error("service '{name}' is not of the requested type {expected}")]
  MismatchedType {
    name: String,
    expected: &'static str,
  },

  /// The container has been disposed; no further registrations or
  /// resolutions are possible.
  #[error("container has been disposed")]
  Disposed,
}
