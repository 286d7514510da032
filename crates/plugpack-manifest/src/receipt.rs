//! Build receipts: the per-target record of what a build produced

use crate::errors::ManifestError;
use crate::types::{Configuration, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder a receipt may use for the directory of the plugin being built
pub const PLUGIN_DIR_VARIABLE: &str = "$(PluginDir)";

/// What kind of artifact a build product is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildProductKind {
    Executable,
    DynamicLibrary,
    StaticLibrary,
    ImportLibrary,
    SymbolFile,
    RequiredResource,
    BuildResource,
    #[default]
    Unknown,
    Other(String),
}

impl BuildProductKind {
    pub fn as_str(&self) -> &str {
        match self {
            BuildProductKind::Executable => "Executable",
            BuildProductKind::DynamicLibrary => "DynamicLibrary",
            BuildProductKind::StaticLibrary => "StaticLibrary",
            BuildProductKind::ImportLibrary => "ImportLibrary",
            BuildProductKind::SymbolFile => "SymbolFile",
            BuildProductKind::RequiredResource => "RequiredResource",
            BuildProductKind::BuildResource => "BuildResource",
            BuildProductKind::Unknown => "Unknown",
            BuildProductKind::Other(name) => name,
        }
    }
}

impl From<String> for BuildProductKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Executable" => BuildProductKind::Executable,
            "DynamicLibrary" => BuildProductKind::DynamicLibrary,
            "StaticLibrary" => BuildProductKind::StaticLibrary,
            "ImportLibrary" => BuildProductKind::ImportLibrary,
            "SymbolFile" => BuildProductKind::SymbolFile,
            "RequiredResource" => BuildProductKind::RequiredResource,
            "BuildResource" => BuildProductKind::BuildResource,
            "Unknown" | "" => BuildProductKind::Unknown,
            _ => BuildProductKind::Other(value),
        }
    }
}

impl From<BuildProductKind> for String {
    fn from(kind: BuildProductKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BuildProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file produced by a build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildProduct {
    pub path: String,
    #[serde(rename = "Type", default)]
    pub kind: BuildProductKind,
}

impl BuildProduct {
    pub fn new(path: impl Into<String>, kind: BuildProductKind) -> Self {
        BuildProduct {
            path: path.into(),
            kind,
        }
    }

    /// Resolve the product path against the plugin directory.
    ///
    /// `$(PluginDir)` is expanded, relative paths are joined onto `plugin_dir`,
    /// absolute paths are returned as-is.
    pub fn resolve(&self, plugin_dir: &Path) -> PathBuf {
        if let Some(rest) = self.path.strip_prefix(PLUGIN_DIR_VARIABLE) {
            let rest = rest.trim_start_matches(['/', '\\']);
            return plugin_dir.join(rest);
        }
        let path = Path::new(&self.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            plugin_dir.join(path)
        }
    }
}

/// Record written by the builder for a single target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildReceipt {
    pub target_name: String,
    pub platform: Platform,
    pub configuration: Configuration,
    #[serde(default)]
    pub build_products: Vec<BuildProduct>,
}

impl BuildReceipt {
    /// Default receipt location for a target built from `base_dir`.
    ///
    /// Development builds use the short `<Target>.target` form; every other
    /// configuration spells out platform and configuration.
    pub fn default_path(
        base_dir: &Path,
        target_name: &str,
        platform: Platform,
        configuration: Configuration,
    ) -> PathBuf {
        let binaries = base_dir.join("Binaries").join(platform.as_str());
        if configuration == Configuration::Development {
            binaries.join(format!("{target_name}.target"))
        } else {
            binaries.join(format!("{target_name}-{platform}-{configuration}.target"))
        }
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ManifestError::parse(path, e))?;
        let receipt: BuildReceipt =
            serde_json::from_str(content.trim_start_matches('\u{feff}'))
                .map_err(|e| ManifestError::parse(path, e))?;
        debug!(
            "Read receipt {:?} with {} product(s)",
            path,
            receipt.build_products.len()
        );
        Ok(receipt)
    }

    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
