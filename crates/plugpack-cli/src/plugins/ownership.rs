//! Module ownership index
//!
//! Every module name must be declared by exactly one plugin across all roots.
//! Names are compared through a key function so callers choose how
//! case-sensitive the comparison is.

use crate::errors::PipelineError;
use crate::plugins::record::PluginRecord;
use ahash::AHashMap;
use std::sync::Arc;
use tracing::debug;

/// Normalizes a module name into its lookup key
pub type KeyFn = fn(&str) -> String;

/// Default key function
pub fn ascii_lowercase_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct ModuleOwnershipIndex {
    owners: AHashMap<String, Arc<PluginRecord>>,
    key_fn: KeyFn,
}

impl Default for ModuleOwnershipIndex {
    fn default() -> Self {
        ModuleOwnershipIndex::with_key_fn(ascii_lowercase_key)
    }
}

impl ModuleOwnershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_fn(key_fn: KeyFn) -> Self {
        ModuleOwnershipIndex {
            owners: AHashMap::new(),
            key_fn,
        }
    }

    /// Fold plugins into a new index in discovery order
    pub fn build(plugins: &[Arc<PluginRecord>]) -> Result<Self, PipelineError> {
        Self::build_with_key_fn(plugins, ascii_lowercase_key)
    }

    pub fn build_with_key_fn(
        plugins: &[Arc<PluginRecord>],
        key_fn: KeyFn,
    ) -> Result<Self, PipelineError> {
        let mut index = ModuleOwnershipIndex::with_key_fn(key_fn);
        for plugin in plugins {
            index.insert(plugin)?;
        }
        debug!(
            "Indexed {} module(s) from {} plugin(s)",
            index.len(),
            plugins.len()
        );
        Ok(index)
    }

    /// Register every module of `plugin`.
    ///
    /// Fails on the first name already present, including a name repeated
    /// inside `plugin` itself. Modules registered before the failure stay in
    /// the index.
    pub fn insert(&mut self, plugin: &Arc<PluginRecord>) -> Result<(), PipelineError> {
        for module in &plugin.manifest.modules {
            let key = (self.key_fn)(&module.name);
            if let Some(existing) = self.owners.get(&key) {
                return Err(PipelineError::ModuleCollision {
                    module_name: module.name.clone(),
                    existing_owner_dir: existing.directory.clone(),
                    new_owner_dir: plugin.directory.clone(),
                });
            }
            self.owners.insert(key, Arc::clone(plugin));
        }
        Ok(())
    }

    pub fn owner_of(&self, module_name: &str) -> Option<&PluginRecord> {
        self.owners
            .get(&(self.key_fn)(module_name))
            .map(Arc::as_ref)
    }

    pub fn is_plugin_module(&self, module_name: &str) -> bool {
        self.owners.contains_key(&(self.key_fn)(module_name))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
