//! Plugin descriptor operations - loading, saving, and module queries
//!
//! Descriptors are JSON documents with PascalCase keys, tab-indented on disk.
//! A loaded descriptor remembers the key order of its document and keys this
//! crate does not model, so [`PluginManifest::save`] writes an unmodified
//! descriptor back byte for byte.

use crate::errors::ManifestError;
use crate::types::{ModuleKind, Platform, TargetKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension (without the dot) that identifies a plugin descriptor
pub const MANIFEST_EXTENSION: &str = "uplugin";

fn default_file_version() -> u32 {
    3
}

/// A loaded plugin descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginManifest {
    /// Plugin identity, taken from the descriptor file stem
    #[serde(skip)]
    pub name: String,

    #[serde(default = "default_file_version")]
    pub file_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(
        rename = "CreatedByURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub enabled_by_default: bool,
    #[serde(default)]
    pub installed: bool,

    /// Keys not modelled above, in document order
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Top-level keys of the loaded document, in order
    #[serde(skip)]
    key_order: Vec<String>,
}

/// One code module declared by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ModuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_phase: Option<String>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub whitelist_platforms: SmallVec<[Platform; 4]>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub blacklist_platforms: SmallVec<[Platform; 4]>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    key_order: Vec<String>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        ModuleDescriptor {
            name: name.into(),
            kind,
            loading_phase: None,
            whitelist_platforms: SmallVec::new(),
            blacklist_platforms: SmallVec::new(),
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Whether this module is compiled into a target of `target` kind on `platform`
    pub fn is_compiled_for(&self, platform: Platform, target: TargetKind) -> bool {
        if !self.whitelist_platforms.is_empty() && !self.whitelist_platforms.contains(&platform)
        {
            return false;
        }
        if self.blacklist_platforms.contains(&platform) {
            return false;
        }
        self.kind.is_hosted_by(target)
    }
}

impl PluginManifest {
    /// Create an empty descriptor for a plugin called `name`
    pub fn new(name: impl Into<String>) -> Self {
        PluginManifest {
            name: name.into(),
            file_version: default_file_version(),
            version: None,
            version_name: None,
            friendly_name: None,
            description: None,
            category: None,
            created_by: None,
            created_by_url: None,
            modules: Vec::new(),
            enabled_by_default: false,
            installed: false,
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Load a descriptor from `path`
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        debug!("Loading plugin descriptor: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ManifestError::parse(path, e))?;
        // Descriptors saved by Windows tooling may carry a byte order mark
        let content = content.trim_start_matches('\u{feff}');
        let document: Value =
            serde_json::from_str(content).map_err(|e| ManifestError::parse(path, e))?;
        let key_order = object_keys(&document);
        let module_key_orders: Vec<Vec<String>> = document
            .get("Modules")
            .and_then(Value::as_array)
            .map(|modules| modules.iter().map(object_keys).collect())
            .unwrap_or_default();

        let mut manifest: PluginManifest =
            serde_json::from_value(document).map_err(|e| ManifestError::parse(path, e))?;
        manifest.key_order = key_order;
        for (module, order) in manifest.modules.iter_mut().zip(module_key_orders) {
            module.key_order = order;
        }

        manifest.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Render the descriptor in its on-disk form.
    ///
    /// Keys follow the order of the document the descriptor was loaded from;
    /// keys that document lacked come after, in declaration order. A new
    /// descriptor is written entirely in declaration order.
    pub fn to_canonical_string(&self) -> Result<String, ManifestError> {
        let Value::Object(map) = serde_json::to_value(self)? else {
            return Err(ManifestError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "descriptor did not serialize to an object",
            )));
        };
        // Flags the document never spelled out stay implicit while they hold their default
        let map: Map<String, Value> = map
            .into_iter()
            .filter(|(key, value)| !self.is_implied_default(key, value))
            .collect();
        let mut map = arrange(map, &self.key_order, &["Modules"]);

        if let Some(Value::Array(modules)) = map.get_mut("Modules") {
            for (value, module) in modules.iter_mut().zip(&self.modules) {
                if let Value::Object(fields) = value {
                    *fields = arrange(
                        std::mem::take(fields),
                        &module.key_order,
                        &["WhitelistPlatforms", "BlacklistPlatforms"],
                    );
                }
            }
        }

        let mut buffer = Vec::with_capacity(1024);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        Value::Object(map).serialize(&mut serializer)?;
        buffer.push(b'\n');
        String::from_utf8(buffer).map_err(|e| {
            ManifestError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn is_implied_default(&self, key: &str, value: &Value) -> bool {
        if self.key_order.is_empty() || self.key_order.iter().any(|k| k == key) {
            return false;
        }
        match key {
            "FileVersion" => *value == Value::from(default_file_version()),
            "EnabledByDefault" | "Installed" => *value == Value::Bool(false),
            _ => false,
        }
    }

    /// Save the descriptor to `path` with an atomic write
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = self.to_canonical_string()?;

        let temp_path = path.with_extension(format!("{MANIFEST_EXTENSION}.tmp"));
        {
            let file = fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;

        debug!("Saved plugin descriptor: {:?}", path);
        Ok(())
    }

    /// Find the descriptor file directly inside `dir`, if any.
    ///
    /// Only `dir` itself is scanned. When several descriptors are present the
    /// first one by file name wins.
    pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        let entries = fs::read_dir(dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }

    /// Look up a module by name (case-insensitive)
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules
            .iter()
            .find(|module| module.name.eq_ignore_ascii_case(name))
    }

    /// Names of the modules compiled into a `target` build for `platform`, in declaration order
    pub fn modules_compiled_for(&self, platform: Platform, target: TargetKind) -> Vec<String> {
        self.modules
            .iter()
            .filter(|module| module.is_compiled_for(platform, target))
            .map(|module| module.name.clone())
            .collect()
    }
}

fn object_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

/// Sort `map` into `order`, keeping keys outside `order` last in their current order.
///
/// A list key present in `order` but skipped as empty is written back as `[]`.
fn arrange(
    mut map: Map<String, Value>,
    order: &[String],
    list_keys: &[&str],
) -> Map<String, Value> {
    for key in list_keys {
        if order.iter().any(|k| k == key) && !map.contains_key(*key) {
            map.insert((*key).to_string(), Value::Array(Vec::new()));
        }
    }
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by_key(|(key, _)| {
        order
            .iter()
            .position(|k| k == key)
            .unwrap_or(order.len())
    });
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
	"FileVersion": 3,
	"Version": 2,
	"VersionName": "1.1",
	"FriendlyName": "Foo",
	"Modules": [
		{
			"Name": "FooModule",
			"Type": "Runtime",
			"LoadingPhase": "Default"
		},
		{
			"Name": "FooEditor",
			"Type": "Editor",
			"WhitelistPlatforms": [
				"Win64",
				"Mac"
			]
		}
	],
	"EnabledByDefault": true,
	"Installed": false,
	"CanContainContent": true
}
"#;

    fn write_sample(dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join("Foo.uplugin");
        fs::write(&path, SAMPLE)?;
        Ok(path)
    }

    #[test]
    fn test_load_reads_modules_and_flags() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = write_sample(temp.path())?;

        let manifest = PluginManifest::load(&path)?;
        assert_eq!(manifest.name, "Foo");
        assert_eq!(manifest.modules.len(), 2);
        assert_eq!(manifest.modules[1].kind, ModuleKind::Editor);
        assert!(manifest.enabled_by_default);
        assert!(!manifest.installed);
        assert_eq!(
            manifest.extra.get("CanContainContent"),
            Some(&Value::Bool(true))
        );
        Ok(())
    }

    #[test]
    fn test_save_load_is_byte_stable() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = write_sample(temp.path())?;

        let manifest = PluginManifest::load(&path)?;
        manifest.save(&path)?;
        let reloaded = PluginManifest::load(&path)?;
        assert_eq!(manifest, reloaded);
        assert_eq!(fs::read_to_string(&path)?, SAMPLE);
        Ok(())
    }

    const UNORDERED: &str = r#"{
	"FileVersion": 3,
	"FriendlyName": "Foo",
	"EnabledByDefault": true,
	"CanContainContent": true,
	"Installed": false,
	"Modules": [
		{
			"Type": "Runtime",
			"Name": "FooModule",
			"BlacklistPlatforms": []
		}
	]
}
"#;

    #[test]
    fn test_save_keeps_document_key_order() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = temp.path().join("Foo.uplugin");
        fs::write(&path, UNORDERED)?;

        PluginManifest::load(&path)?.save(&path)?;
        assert_eq!(fs::read_to_string(&path)?, UNORDERED);
        Ok(())
    }

    #[test]
    fn test_save_changes_only_the_mutated_flag() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = temp.path().join("Foo.uplugin");
        fs::write(&path, UNORDERED)?;

        let mut manifest = PluginManifest::load(&path)?;
        manifest.installed = true;
        manifest.save(&path)?;
        assert_eq!(
            fs::read_to_string(&path)?,
            UNORDERED.replace("\"Installed\": false", "\"Installed\": true")
        );
        Ok(())
    }

    #[test]
    fn test_save_keeps_empty_modules_and_implicit_flags() -> Result<(), Box<dyn std::error::Error>> {
        let content = "{\n\t\"FriendlyName\": \"Empty\",\n\t\"Modules\": []\n}\n";
        let temp = TempDir::new()?;
        let path = temp.path().join("Empty.uplugin");
        fs::write(&path, content)?;

        let manifest = PluginManifest::load(&path)?;
        assert!(manifest.modules.is_empty());
        manifest.save(&path)?;
        assert_eq!(fs::read_to_string(&path)?, content);
        Ok(())
    }

    #[test]
    fn test_new_descriptor_uses_declaration_order() -> Result<(), ManifestError> {
        let mut manifest = PluginManifest::new("Foo");
        manifest.friendly_name = Some("Foo".to_string());
        manifest.installed = true;
        assert_eq!(
            manifest.to_canonical_string()?,
            "{\n\t\"FileVersion\": 3,\n\t\"FriendlyName\": \"Foo\",\n\t\"EnabledByDefault\": false,\n\t\"Installed\": true\n}\n"
        );
        Ok(())
    }

    #[test]
    fn test_flag_mutation_only_changes_flags() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = write_sample(temp.path())?;
        let original = PluginManifest::load(&path)?;

        let mut changed = original.clone();
        changed.enabled_by_default = false;
        changed.installed = true;
        let out = temp.path().join("out").join("Foo.uplugin");
        changed.save(&out)?;

        let reloaded = PluginManifest::load(&out)?;
        assert!(!reloaded.enabled_by_default);
        assert!(reloaded.installed);
        assert_eq!(reloaded.modules, original.modules);
        assert_eq!(reloaded.extra, original.extra);
        assert_eq!(reloaded.friendly_name, original.friendly_name);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = PluginManifest::load(Path::new("/nonexistent/plugin/Foo.uplugin"));
        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }

    #[test]
    fn test_malformed_descriptor_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = temp.path().join("Bad.uplugin");

        fs::write(&path, "{ \"Modules\": [ { \"Type\": \"Runtime\" } ] }")?;
        assert!(matches!(
            PluginManifest::load(&path),
            Err(ManifestError::Parse { .. })
        ));

        fs::write(&path, "not json")?;
        assert!(matches!(
            PluginManifest::load(&path),
            Err(ManifestError::Parse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_is_compiled_for_respects_platform_lists() {
        let mut module = ModuleDescriptor::new("Foo", ModuleKind::Runtime);
        assert!(module.is_compiled_for(Platform::Linux, TargetKind::Game));

        module.whitelist_platforms.push(Platform::Win64);
        assert!(module.is_compiled_for(Platform::Win64, TargetKind::Game));
        assert!(!module.is_compiled_for(Platform::Linux, TargetKind::Game));

        module.blacklist_platforms.push(Platform::Win64);
        assert!(!module.is_compiled_for(Platform::Win64, TargetKind::Game));
    }

    #[test]
    fn test_find_in_dir_is_not_recursive() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let nested = temp.path().join("Nested");
        fs::create_dir_all(&nested)?;
        fs::write(nested.join("Inner.uplugin"), "{}")?;

        assert!(PluginManifest::find_in_dir(temp.path()).is_none());

        fs::write(temp.path().join("B.uplugin"), "{}")?;
        fs::write(temp.path().join("A.uplugin"), "{}")?;
        assert_eq!(
            PluginManifest::find_in_dir(temp.path()),
            Some(temp.path().join("A.uplugin"))
        );
        Ok(())
    }
}
