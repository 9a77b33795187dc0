use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use crate::{
    errors::{AdmissionError, Result},
    interfaces::Interface,
};

/// Builds a plugin instance out of its optional configuration.
pub type Factory = fn(config: Option<&serde_yaml::Value>) -> Result<Arc<dyn Interface>>;

/// Registry of the admission plugins known to the process, by name.
#[derive(Default)]
pub struct Plugins {
    registry: HashMap<String, Factory>,
}

impl Plugins {
    pub fn new() -> Self {
        Plugins::default()
    }

    pub fn register(&mut self, name: &str, factory: Factory) {
        if self.registry.insert(name.to_string(), factory).is_some() {
            warn!(plugin = name, "admission plugin registered twice, keeping the last one");
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Names of all the registered plugins, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn new_plugin(
        &self,
        name: &str,
        config: Option<&serde_yaml::Value>,
    ) -> Result<Arc<dyn Interface>> {
        let factory = self
            .registry
            .get(name)
            .ok_or_else(|| AdmissionError::UnknownPlugin(name.to_string()))?;
        factory(config)
    }
}
