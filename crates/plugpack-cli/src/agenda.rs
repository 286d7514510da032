//! Build agenda: the targets that have to be compiled for a plugin
//!
//! Editor platforms get one Development editor target. Game platforms get a
//! Development and a Shipping game target. A tuple whose module list would be
//! empty is left out.

use plugpack_config::Config;
use plugpack_manifest::{BuildReceipt, Configuration, Platform, PluginManifest, TargetKind};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One concrete (platform, target kind, configuration) build unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    pub target_name: String,
    pub platform: Platform,
    pub configuration: Configuration,
    pub target_kind: TargetKind,
    pub modules: Vec<String>,
    pub receipt_path: PathBuf,
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.target_name,
            self.platform,
            self.configuration,
            self.modules.join(", ")
        )
    }
}

/// Ordered build targets for one plugin manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub manifest_path: PathBuf,
    pub targets: Vec<BuildTarget>,
}

impl Agenda {
    pub fn plugin_dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new("."))
    }

    pub fn receipt_paths(&self) -> Vec<PathBuf> {
        self.targets.iter().map(|t| t.receipt_path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

/// Names of the editor and game targets that host plugin modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNames {
    pub editor: String,
    pub game: String,
}

impl Default for TargetNames {
    fn default() -> Self {
        TargetNames {
            editor: plugpack_config::DEFAULT_EDITOR_TARGET_NAME.to_string(),
            game: plugpack_config::DEFAULT_GAME_TARGET_NAME.to_string(),
        }
    }
}

impl From<&Config> for TargetNames {
    fn from(config: &Config) -> Self {
        TargetNames {
            editor: config.editor_target_name().to_string(),
            game: config.game_target_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgendaBuilder {
    target_names: TargetNames,
}

impl AgendaBuilder {
    pub fn new(target_names: TargetNames) -> Self {
        AgendaBuilder { target_names }
    }

    pub fn build_agenda(
        &self,
        manifest_path: &Path,
        manifest: &PluginManifest,
        editor_platforms: &[Platform],
        game_platforms: &[Platform],
    ) -> Agenda {
        let plugin_dir = manifest_path.parent().unwrap_or(Path::new("."));
        let mut targets = Vec::new();

        for platform in dedup(editor_platforms) {
            targets.extend(target_for(
                plugin_dir,
                manifest,
                &self.target_names.editor,
                platform,
                TargetKind::Editor,
                Configuration::Development,
            ));
        }

        for platform in dedup(game_platforms) {
            for configuration in [Configuration::Development, Configuration::Shipping] {
                targets.extend(target_for(
                    plugin_dir,
                    manifest,
                    &self.target_names.game,
                    platform,
                    TargetKind::Game,
                    configuration,
                ));
            }
        }

        debug!(
            "Agenda for {:?}: {} target(s)",
            manifest_path,
            targets.len()
        );
        Agenda {
            manifest_path: manifest_path.to_path_buf(),
            targets,
        }
    }
}

fn target_for(
    plugin_dir: &Path,
    manifest: &PluginManifest,
    target_name: &str,
    platform: Platform,
    target_kind: TargetKind,
    configuration: Configuration,
) -> Option<BuildTarget> {
    let modules = manifest.modules_compiled_for(platform, target_kind);
    if modules.is_empty() {
        debug!(
            "No modules of {} are compiled for {} {}",
            manifest.name, target_kind, platform
        );
        return None;
    }
    Some(BuildTarget {
        target_name: target_name.to_string(),
        platform,
        configuration,
        target_kind,
        modules,
        receipt_path: BuildReceipt::default_path(plugin_dir, target_name, platform, configuration),
    })
}

fn dedup(platforms: &[Platform]) -> Vec<Platform> {
    let mut seen = Vec::with_capacity(platforms.len());
    for platform in platforms {
        if !seen.contains(platform) {
            seen.push(*platform);
        }
    }
    seen
}
