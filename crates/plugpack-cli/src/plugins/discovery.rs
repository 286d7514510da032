//! Plugin discovery across engine and project roots
//!
//! Each root is walked depth-first in file-name order. A directory that holds a
//! descriptor is a plugin and the walk never goes below it; any other directory
//! is searched the same way. The walk keeps its own stack of pending
//! directories, pushing children in reverse so they pop in sorted order, which
//! gives the same visiting order as a recursive walk.

use crate::errors::PipelineError;
use crate::plugins::record::{PluginRecord, Provenance};
use plugpack_manifest::PluginManifest;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the plugin folder under an engine or project directory
pub const PLUGINS_FOLDER: &str = "Plugins";

/// A directory searched for plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRoot {
    pub directory: PathBuf,
    pub provenance: Provenance,
}

impl DiscoveryRoot {
    pub fn engine(directory: impl Into<PathBuf>) -> Self {
        DiscoveryRoot {
            directory: directory.into(),
            provenance: Provenance::Engine,
        }
    }

    pub fn project(directory: impl Into<PathBuf>) -> Self {
        DiscoveryRoot {
            directory: directory.into(),
            provenance: Provenance::ProjectLocal,
        }
    }

    /// Roots for an engine directory and any number of project directories.
    ///
    /// The engine's `Plugins` folder comes first, then each project's in order.
    pub fn for_layout(engine_dir: Option<&Path>, project_dirs: &[PathBuf]) -> Vec<Self> {
        engine_dir
            .map(|dir| DiscoveryRoot::engine(dir.join(PLUGINS_FOLDER)))
            .into_iter()
            .chain(
                project_dirs
                    .iter()
                    .map(|dir| DiscoveryRoot::project(dir.join(PLUGINS_FOLDER))),
            )
            .collect()
    }
}

/// Accumulates plugin records over one or more roots
#[derive(Debug, Default)]
pub struct DiscoveryEngine {
    plugins: Vec<PluginRecord>,
    recorded: HashSet<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk every root left to right and return the plugins in discovery order
    pub fn discover_all(roots: &[DiscoveryRoot]) -> Result<Vec<PluginRecord>, PipelineError> {
        let mut engine = DiscoveryEngine::new();
        for root in roots {
            engine.discover_in(root)?;
        }
        Ok(engine.into_plugins())
    }

    /// Walk a single root. Returns how many new plugins it contributed.
    pub fn discover_in(&mut self, root: &DiscoveryRoot) -> Result<usize, PipelineError> {
        if !root.directory.is_dir() {
            debug!("Skipping missing plugin root {:?}", root.directory);
            return Ok(0);
        }

        let before = self.plugins.len();
        let mut pending: Vec<PathBuf> = Vec::new();
        self.push_children(&root.directory, &mut pending);

        while let Some(dir) = pending.pop() {
            let Ok(canonical) = fs::canonicalize(&dir) else {
                warn!("Cannot resolve directory {:?}, skipping", dir);
                continue;
            };

            if let Some(manifest_path) = PluginManifest::find_in_dir(&dir) {
                if !self.recorded.insert(canonical.clone()) {
                    debug!("Plugin at {:?} already recorded", canonical);
                    continue;
                }
                let manifest = PluginManifest::load(&manifest_path)?;
                let manifest_path = canonical.join(
                    manifest_path
                        .file_name()
                        .map_or_else(PathBuf::new, PathBuf::from),
                );
                debug!(
                    "Found plugin {:?} ({} module(s))",
                    manifest_path,
                    manifest.modules.len()
                );
                self.plugins.push(PluginRecord::new(
                    canonical,
                    manifest_path,
                    manifest,
                    root.provenance,
                ));
                continue;
            }

            // Symlinked directories can point back up the tree
            if !self.visited.insert(canonical) {
                continue;
            }
            self.push_children(&dir, &mut pending);
        }

        Ok(self.plugins.len() - before)
    }

    fn push_children(&self, dir: &Path, pending: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory {:?}: {}", dir, e);
                return;
            }
        };

        let mut children: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        pending.extend(children.into_iter().rev());
    }

    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }

    pub fn into_plugins(self) -> Vec<PluginRecord> {
        self.plugins
    }
}
