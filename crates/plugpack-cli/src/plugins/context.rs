//! Discovery results shared by the pipeline stages
//!
//! The context walks its roots at most once. Later calls, from any thread, see
//! the same plugins and ownership index until [`PluginContext::reset`].

use crate::errors::PipelineError;
use crate::plugins::discovery::{DiscoveryEngine, DiscoveryRoot};
use crate::plugins::ownership::{ascii_lowercase_key, KeyFn, ModuleOwnershipIndex};
use crate::plugins::record::PluginRecord;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

/// Plugins found under the context roots and the index built from them
#[derive(Debug)]
pub struct DiscoveredPlugins {
    pub plugins: Vec<Arc<PluginRecord>>,
    pub index: ModuleOwnershipIndex,
}

#[derive(Debug)]
pub struct PluginContext {
    roots: Vec<DiscoveryRoot>,
    key_fn: KeyFn,
    discovered: OnceCell<DiscoveredPlugins>,
}

impl PluginContext {
    pub fn new(roots: Vec<DiscoveryRoot>) -> Self {
        Self::with_key_fn(roots, ascii_lowercase_key)
    }

    pub fn with_key_fn(roots: Vec<DiscoveryRoot>, key_fn: KeyFn) -> Self {
        PluginContext {
            roots,
            key_fn,
            discovered: OnceCell::new(),
        }
    }

    pub fn roots(&self) -> &[DiscoveryRoot] {
        &self.roots
    }

    /// Discover plugins and index their modules on first use.
    ///
    /// A failed discovery is not cached; the next call walks again.
    pub fn discovered(&self) -> Result<&DiscoveredPlugins, PipelineError> {
        self.discovered.get_or_try_init(|| {
            let plugins: Vec<Arc<PluginRecord>> = DiscoveryEngine::discover_all(&self.roots)?
                .into_iter()
                .map(Arc::new)
                .collect();
            let index = ModuleOwnershipIndex::build_with_key_fn(&plugins, self.key_fn)?;
            info!(
                "Discovered {} plugin(s) declaring {} module(s)",
                plugins.len(),
                index.len()
            );
            Ok(DiscoveredPlugins { plugins, index })
        })
    }

    pub fn plugins(&self) -> Result<&[Arc<PluginRecord>], PipelineError> {
        Ok(&self.discovered()?.plugins)
    }

    pub fn owner_of(&self, module_name: &str) -> Result<Option<&PluginRecord>, PipelineError> {
        Ok(self.discovered()?.index.owner_of(module_name))
    }

    pub fn is_initialized(&self) -> bool {
        self.discovered.get().is_some()
    }

    /// Drop cached results so the next access walks the roots again
    pub fn reset(&mut self) {
        self.discovered.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_plugin(dir: &Path, name: &str, module: &str) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join(format!("{name}.uplugin")),
            format!(r#"{{ "Modules": [{{ "Name": "{module}", "Type": "Runtime" }}] }}"#),
        )
    }

    #[test]
    fn test_concurrent_readers_share_one_discovery() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let root = temp.path().join("Plugins");
        write_plugin(&root.join("Foo"), "Foo", "FooModule")?;

        let context = PluginContext::new(vec![DiscoveryRoot::engine(&root)]);
        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        context
                            .discovered()
                            .map(|d| d as *const DiscoveredPlugins as usize)
                            .unwrap_or_default()
                    })
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|h| h.join().ok())
                .collect()
        });

        assert_eq!(addresses.len(), 4);
        assert!(addresses.iter().all(|a| *a != 0 && *a == addresses[0]));
        assert!(context.is_initialized());
        Ok(())
    }

    #[test]
    fn test_reset_picks_up_new_plugins() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let root = temp.path().join("Plugins");
        write_plugin(&root.join("Foo"), "Foo", "FooModule")?;

        let mut context = PluginContext::new(vec![DiscoveryRoot::project(&root)]);
        assert_eq!(context.plugins()?.len(), 1);

        write_plugin(&root.join("Bar"), "Bar", "BarModule")?;
        assert_eq!(context.plugins()?.len(), 1);
        assert!(context.owner_of("BarModule")?.is_none());

        context.reset();
        assert!(!context.is_initialized());
        assert_eq!(context.plugins()?.len(), 2);
        assert_eq!(
            context.owner_of("barmodule")?.map(|p| p.name.as_str()),
            Some("Bar")
        );
        Ok(())
    }

    #[test]
    fn test_collision_is_reported_and_not_cached() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let root = temp.path().join("Plugins");
        write_plugin(&root.join("A"), "A", "Shared")?;
        write_plugin(&root.join("B"), "B", "Shared")?;

        let context = PluginContext::new(vec![DiscoveryRoot::engine(&root)]);
        assert!(matches!(
            context.discovered(),
            Err(PipelineError::ModuleCollision { .. })
        ));
        assert!(!context.is_initialized());
        Ok(())
    }
}
