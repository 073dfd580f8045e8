//! The closed set of lifetime policies a service can be registered under.

/// Governs how long a constructed service instance is reused.
///
/// The resolution algorithm switches on this tag; lifetimes are data, not
/// behavior, so the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
  /// One instance for the life of the container, created on first
  /// resolution and released at `dispose`.
  Singleton,
  /// One instance per scope, created on first resolution within the scope
  /// and released at `clear_scope` or `dispose`.
  Scoped,
  /// A fresh instance on every resolution. The container keeps no
  /// reference; ownership transfers entirely to the caller.
  #[default]
  Transient,
}
