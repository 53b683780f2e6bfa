use std::collections::HashMap;

use gym::EnvInstance;
use tracing::{debug, info};

use crate::spec::family_of;
use crate::{EnvId, EnvSpec, MakeError, MakeOptions, RegistrationError};

/// Ordered table of registered environments.
#[derive(Debug, Default)]
pub struct Registry {
    order: Vec<EnvId>,
    specs: HashMap<EnvId, EnvSpec>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `spec` under its id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::AlreadyRegistered`] if the id is taken, and
    /// the other [`RegistrationError`] variants for malformed ids or
    /// parameters. A failed registration leaves the registry unchanged.
    pub fn register(&mut self, spec: EnvSpec) -> Result<(), RegistrationError> {
        let id = spec.validate()?;
        if self.specs.contains_key(&id) {
            return Err(RegistrationError::AlreadyRegistered(id.to_string()));
        }
        info!(env = %id, "registered environment");
        self.order.push(id.clone());
        self.specs.insert(id, spec);
        Ok(())
    }

    /// Constructs a new instance of `id`, applying `overrides` on top of the
    /// registered defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MakeError::UnknownEnvironment`] for unregistered ids and
    /// [`MakeError::Construction`] when the provider rejects the options.
    pub fn make(&self, id: &str, overrides: MakeOptions) -> Result<EnvInstance, MakeError> {
        let spec = self.specs.get(id).ok_or_else(|| MakeError::UnknownEnvironment {
            id: id.to_string(),
            similar: self.versions_of(family_of(id)),
        })?;

        let options = overrides.or(spec.defaults());
        debug!(env = id, ?options, "constructing environment");
        let env = (spec.entry_point)(&options).map_err(|source| MakeError::Construction {
            id: id.to_string(),
            source,
        })?;
        Ok(EnvInstance::new(id, env).with_max_episode_steps(spec.max_episode_steps))
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &EnvId> {
        self.order.iter()
    }

    /// Registered specs in registration order.
    pub fn specs(&self) -> impl Iterator<Item = &EnvSpec> {
        self.order.iter().filter_map(|id| self.specs.get(id))
    }

    #[must_use]
    pub fn spec(&self, id: &str) -> Option<&EnvSpec> {
        self.specs.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.specs.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn versions_of(&self, family: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| id.family() == family)
            .map(ToString::to_string)
            .collect()
    }
}
