//! # Warden
//!
//! A dynamic, thread-safe service container for Rust.
//!
//! Warden maps logical service names to factory functions, builds instances
//! on demand under one of three lifetime policies, detects circular
//! resolution chains before they can recurse, and coordinates deterministic
//! teardown of the instances it owns.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry and orchestrator. Containers are plain
//!   values; construct and own one per application or test.
//! - **Lifetime**: `Singleton` (one instance per container), `Scoped` (one
//!   instance per unit of work, released by `clear_scope`), or `Transient`
//!   (a fresh instance per resolution, owned by the caller).
//! - **Factories**: plain closures that receive the container, so a service
//!   resolves its own dependencies while it is being built. Dependencies
//!   are discovered dynamically; nothing is declared up front.
//! - **Teardown**: services registered through `register_disposable` have
//!   their [`Dispose`] hook invoked at `clear_scope` and `dispose`.
//!
//! ## Quick Start
//!
//! ```
//! use warden::Container;
//!
//! struct Config {
//!   database_url: String,
//! }
//!
//! struct Database {
//!   url: String,
//! }
//!
//! let container = Container::new();
//!
//! container.register_instance("config", Config {
//!   database_url: "postgres://localhost/app".to_string(),
//! })?;
//!
//! // The factory resolves its own dependencies from the container.
//! container.register_singleton("database", |c: &Container| {
//!   let config = c.resolve::<Config>("config")?;
//!   Ok(Database {
//!     url: config.database_url.clone(),
//!   })
//! })?;
//!
//! let db = container.resolve::<Database>("database")?;
//! assert_eq!(db.url, "postgres://localhost/app");
//! # Ok::<(), warden::ContainerError>(())
//! ```

mod container;
mod core;
mod dispose;
mod error;
mod lifetime;
mod registry;

pub use container::Container;
pub use dispose::Dispose;
pub use error::{BoxError, ContainerError};
pub use lifetime::Lifetime;
