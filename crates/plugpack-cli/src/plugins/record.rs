use plugpack_manifest::PluginManifest;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which kind of root a plugin was discovered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provenance {
    Engine,
    ProjectLocal,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Engine => f.write_str("engine"),
            Provenance::ProjectLocal => f.write_str("project"),
        }
    }
}

/// A discovered plugin
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRecord {
    /// Name of the plugin directory
    pub name: String,
    /// Canonical absolute plugin directory
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: PluginManifest,
    pub provenance: Provenance,
    /// Declares modules and is not shipped prebuilt
    pub should_build: bool,
}

impl PluginRecord {
    pub fn new(
        directory: PathBuf,
        manifest_path: PathBuf,
        manifest: PluginManifest,
        provenance: Provenance,
    ) -> Self {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| manifest.name.clone());
        let should_build = !manifest.modules.is_empty() && !manifest.installed;
        PluginRecord {
            name,
            directory,
            manifest_path,
            manifest,
            provenance,
            should_build,
        }
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.modules.iter().map(|m| m.name.as_str())
    }
}

impl fmt::Display for PluginRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.manifest_path.display())
    }
}
