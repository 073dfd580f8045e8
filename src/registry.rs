//! The name-to-registration mapping. Pure data owner: insert, lookup,
//! enumerate, drain.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::ServiceRegistration;
use crate::error::ContainerError;

#[derive(Default)]
pub(crate) struct ServiceRegistry {
  entries: DashMap<String, ServiceRegistration>,
}

impl ServiceRegistry {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Inserts a registration. A name may be registered at most once;
  /// re-registration is an error, never an overwrite.
  pub(crate) fn insert(
    &self,
    name: &str,
    registration: ServiceRegistration,
  ) -> Result<(), ContainerError> {
    match self.entries.entry(name.to_owned()) {
      Entry::Occupied(_) => Err(ContainerError::DuplicateService(name.to_owned())),
      Entry::Vacant(slot) => {
        slot.insert(registration);
        Ok(())
      }
    }
  }

  /// Looks up a registration, cloning it out so the caller holds no map
  /// reference while it runs the factory.
  pub(crate) fn get(&self, name: &str) -> Option<ServiceRegistration> {
    self.entries.get(name).map(|entry| entry.value().clone())
  }

  pub(crate) fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  pub(crate) fn names(&self) -> Vec<String> {
    self.entries.iter().map(|entry| entry.key().clone()).collect()
  }

  /// Removes and returns every registration. Called only at container
  /// disposal.
  pub(crate) fn drain(&self) -> Vec<(String, ServiceRegistration)> {
    let drained: Vec<_> = self
      .entries
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect();
    self.entries.clear();
    drained
  }
}
