//! Include/exclude rules deciding which plugin files ship in a package
//!
//! Rules are kept in the order they are added and carry a tier. For a given
//! path the matching rule with the highest tier wins, and within a tier the
//! one added last. Rules for a package are added tier by tier, so in practice
//! the last matching rule wins. Confidentiality excludes sit in the top tier
//! and cannot be overridden. A path no rule matches is left out.

pub mod pattern;
pub mod rules_file;

use crate::errors::PipelineError;
use plugpack_config::Config;
use plugpack_manifest::BuildProduct;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

pub use rules_file::{FILTER_FILE, FILTER_SECTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Disposition {
    Include,
    Exclude,
}

/// Where a rule came from. Later tiers override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RuleTier {
    /// The manifest and the build products
    Products = 1,
    /// Source, content and resource folders
    BuiltIn = 2,
    /// `Config/FilterPlugin.ini`
    User = 3,
    /// Restricted folders and platforms
    Confidential = 4,
}

#[derive(Debug, Clone)]
pub struct FilterRule {
    pub pattern: String,
    pub disposition: Disposition,
    pub tier: RuleTier,
    regex: Regex,
}

impl FilterRule {
    /// A wildcard rule (see [`pattern`] for the syntax)
    pub fn new(
        pattern: &str,
        disposition: Disposition,
        tier: RuleTier,
    ) -> Result<Self, PipelineError> {
        Ok(FilterRule {
            regex: pattern::compile(pattern)?,
            pattern: pattern.to_string(),
            disposition,
            tier,
        })
    }

    /// A rule for exactly one plugin-relative file, wildcards taken literally
    pub fn literal(
        relative_path: &str,
        disposition: Disposition,
        tier: RuleTier,
    ) -> Result<Self, PipelineError> {
        Ok(FilterRule {
            regex: pattern::compile_literal(relative_path)?,
            pattern: pattern::to_match_path(relative_path),
            disposition,
            tier,
        })
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.regex.is_match(&pattern::to_match_path(relative_path))
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.disposition {
            Disposition::Include => '+',
            Disposition::Exclude => '-',
        };
        write!(f, "{sign}{} (tier {})", self.pattern, self.tier as u8)
    }
}

/// Ordered rule set
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    rules: Vec<FilterRule>,
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    pub fn include(&mut self, pattern: &str, tier: RuleTier) -> Result<(), PipelineError> {
        self.add_rule(FilterRule::new(pattern, Disposition::Include, tier)?);
        Ok(())
    }

    pub fn exclude(&mut self, pattern: &str, tier: RuleTier) -> Result<(), PipelineError> {
        self.add_rule(FilterRule::new(pattern, Disposition::Exclude, tier)?);
        Ok(())
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// The rule that decides `relative_path`, if any matches
    pub fn explain(&self, relative_path: &str) -> Option<&FilterRule> {
        let path = pattern::to_match_path(relative_path);
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.regex.is_match(&path))
            .max_by_key(|(index, rule)| (rule.tier, *index))
            .map(|(_, rule)| rule)
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.explain(relative_path)
            .is_some_and(|rule| rule.disposition == Disposition::Include)
    }

    /// Relative paths of every file under `root` that the filter includes,
    /// in sorted walk order
    pub fn apply(&self, root: &Path) -> Result<Vec<String>, PipelineError> {
        let selected: Vec<String> = list_files(root)?
            .into_par_iter()
            .filter(|path| self.matches(path))
            .collect();
        debug!("Filter selected {} file(s) under {:?}", selected.len(), root);
        Ok(selected)
    }
}

/// Relative `/`-separated paths of every file under `root`, sorted by name
/// at each level
pub fn list_files(root: &Path) -> Result<Vec<String>, PipelineError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        files.push(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        );
    }
    Ok(files)
}

/// Folder and platform names that never ship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    pub restricted_folders: Vec<String>,
    pub restricted_platforms: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings::from(&Config::default())
    }
}

impl From<&Config> for FilterSettings {
    fn from(config: &Config) -> Self {
        FilterSettings {
            restricted_folders: config.restricted_folders(),
            restricted_platforms: config.restricted_platforms(),
        }
    }
}

/// Built-in includes for every plugin package
pub const BUILT_IN_INCLUDES: &[&str] = &[
    "/Resources/...",
    "/Content/...",
    "/Intermediate/Build/.../Inc/...",
    "/Source/...",
];

/// Assemble the package filter for the plugin whose manifest is `manifest_path`
pub fn plugin_filter(
    manifest_path: &Path,
    products: &[BuildProduct],
    settings: &FilterSettings,
) -> Result<FileFilter, PipelineError> {
    let plugin_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let mut filter = FileFilter::new();

    if let Some(file_name) = manifest_path.file_name() {
        filter.add_rule(FilterRule::literal(
            &file_name.to_string_lossy(),
            Disposition::Include,
            RuleTier::Products,
        )?);
    }
    for product in products {
        let resolved = product.resolve(plugin_dir);
        match resolved.strip_prefix(plugin_dir) {
            Ok(relative) => filter.add_rule(FilterRule::literal(
                &relative.to_string_lossy(),
                Disposition::Include,
                RuleTier::Products,
            )?),
            Err(_) => debug!("Product {:?} is outside the plugin, skipping", resolved),
        }
    }

    for pattern in BUILT_IN_INCLUDES {
        filter.include(pattern, RuleTier::BuiltIn)?;
    }

    for rule in rules_file::read_rules(&plugin_dir.join(FILTER_FILE), FILTER_SECTION)? {
        filter.add_rule(rule);
    }

    for name in settings
        .restricted_folders
        .iter()
        .chain(&settings.restricted_platforms)
    {
        filter.exclude(&format!(".../{name}/..."), RuleTier::Confidential)?;
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugpack_manifest::BuildProductKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_last_matching_rule_wins() -> Result<(), PipelineError> {
        let mut filter = FileFilter::new();
        filter.include("/Docs/...", RuleTier::User)?;
        filter.exclude("/Docs/Drafts/...", RuleTier::User)?;
        filter.include("/Docs/Drafts/Keep.md", RuleTier::User)?;

        assert!(filter.matches("Docs/Guide.md"));
        assert!(!filter.matches("Docs/Drafts/Plan.md"));
        assert!(filter.matches("Docs/Drafts/Keep.md"));
        assert!(!filter.matches("Other/File.txt"));
        Ok(())
    }

    #[test]
    fn test_reordering_rules_changes_the_outcome() -> Result<(), PipelineError> {
        let mut filter = FileFilter::new();
        filter.exclude("*.txt", RuleTier::User)?;
        filter.include("/Notes/...", RuleTier::User)?;
        assert!(filter.matches("Notes/a.txt"));

        let mut reversed = FileFilter::new();
        reversed.include("/Notes/...", RuleTier::User)?;
        reversed.exclude("*.txt", RuleTier::User)?;
        assert!(!reversed.matches("Notes/a.txt"));
        Ok(())
    }

    #[test]
    fn test_confidential_exclude_beats_later_include() -> Result<(), PipelineError> {
        let mut filter = FileFilter::new();
        filter.exclude(".../NoRedist/...", RuleTier::Confidential)?;
        filter.include("/Source/...", RuleTier::BuiltIn)?;
        filter.add_rule(FilterRule::literal(
            "Source/NoRedist/Secret.cpp",
            Disposition::Include,
            RuleTier::User,
        )?);

        let rule = filter.explain("Source/NoRedist/Secret.cpp");
        assert_eq!(rule.map(|r| r.tier), Some(RuleTier::Confidential));
        assert!(!filter.matches("Source/NoRedist/Secret.cpp"));
        assert!(filter.matches("Source/Public/Foo.h"));
        Ok(())
    }

    fn touch(root: &Path, relative: &str) -> std::io::Result<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, relative)
    }

    #[test]
    fn test_plugin_filter_applies_all_tiers() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let root = temp.path();
        for file in [
            "Foo.uplugin",
            "Binaries/Win64/Foo.dll",
            "Binaries/Win64/Stale.dll",
            "Binaries/PS4/Foo.prx",
            "Content/Map.umap",
            "Docs/Guide.md",
            "Docs/Drafts/Plan.md",
            "Intermediate/Build/Win64/UE4/Inc/Foo/Foo.generated.h",
            "Intermediate/Build/Win64/UE4/Development/Foo.obj",
            "Source/Foo/Foo.cpp",
            "Source/NoRedist/Secret.cpp",
            "Source/PS4/Platform.cpp",
        ] {
            touch(root, file)?;
        }
        fs::create_dir_all(root.join("Config"))?;
        fs::write(
            root.join(FILTER_FILE),
            "[FilterPlugin]\n/Docs/...\n-/Docs/Drafts/...\n/Source/NoRedist/...\n",
        )?;

        let products = vec![
            BuildProduct::new("$(PluginDir)/Binaries/Win64/Foo.dll", BuildProductKind::DynamicLibrary),
            BuildProduct::new("Binaries/PS4/Foo.prx", BuildProductKind::DynamicLibrary),
            BuildProduct::new("/elsewhere/Engine.dll", BuildProductKind::DynamicLibrary),
        ];
        let filter = plugin_filter(&root.join("Foo.uplugin"), &products, &FilterSettings::default())?;
        let files = filter.apply(root)?;

        assert_eq!(
            files,
            vec![
                "Binaries/Win64/Foo.dll",
                "Content/Map.umap",
                "Docs/Guide.md",
                "Foo.uplugin",
                "Intermediate/Build/Win64/UE4/Inc/Foo/Foo.generated.h",
                "Source/Foo/Foo.cpp",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_custom_restrictions() -> Result<(), Box<dyn std::error::Error>> {
        let settings = FilterSettings {
            restricted_folders: vec!["Internal".to_string()],
            restricted_platforms: Vec::new(),
        };
        let temp = TempDir::new()?;
        let filter = plugin_filter(&temp.path().join("Foo.uplugin"), &[], &settings)?;

        assert!(!filter.matches("Source/Internal/Foo.cpp"));
        assert!(filter.matches("Source/NoRedist/Foo.cpp"));
        assert!(filter.matches("Source/PS4/Foo.cpp"));
        Ok(())
    }
}
