//! Compiling agenda targets
//!
//! The compiler itself is an outside program. [`ExternalCommandBuilder`] runs it
//! once per target and expects it to write the receipt named in the agenda.

use crate::agenda::{Agenda, BuildTarget};
use crate::errors::PipelineError;
use plugpack_logger as logger;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Compiles every target of an agenda
pub trait TargetBuilder {
    fn build(&self, agenda: &Agenda) -> Result<(), PipelineError>;
}

/// Builder that compiles nothing; receipts must already exist
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBuilder;

impl TargetBuilder for NoopBuilder {
    fn build(&self, agenda: &Agenda) -> Result<(), PipelineError> {
        debug!(
            "Skipping build of {} target(s) for {:?}",
            agenda.len(),
            agenda.manifest_path
        );
        Ok(())
    }
}

/// Runs an external program once per target
#[derive(Debug, Clone)]
pub struct ExternalCommandBuilder {
    program: PathBuf,
}

impl ExternalCommandBuilder {
    /// Resolve `program` on `PATH` (or as a path) up front
    pub fn new(program: &str) -> Result<Self, PipelineError> {
        let program = which::which(program)
            .map_err(|e| PipelineError::BuilderNotFound(format!("{program}: {e}")))?;
        Ok(ExternalCommandBuilder { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed for one target
    pub fn arguments(manifest_path: &Path, target: &BuildTarget) -> Vec<String> {
        let mut args = vec![
            target.target_name.clone(),
            target.platform.to_string(),
            target.configuration.to_string(),
            "-plugin".to_string(),
            manifest_path.display().to_string(),
        ];
        for module in &target.modules {
            args.push("-module".to_string());
            args.push(module.clone());
        }
        args.push("-receipt".to_string());
        args.push(target.receipt_path.display().to_string());
        args
    }
}

impl TargetBuilder for ExternalCommandBuilder {
    fn build(&self, agenda: &Agenda) -> Result<(), PipelineError> {
        for target in &agenda.targets {
            let mut cmd = Command::new(&self.program);
            cmd.args(Self::arguments(&agenda.manifest_path, target))
                .current_dir(agenda.plugin_dir());

            logger::debug(&format!("Running: {:?}", cmd));
            logger::spinner_start(&format!("Building {target}"));

            let output = match cmd.output() {
                Ok(output) => output,
                Err(e) => {
                    logger::spinner_error(&format!("Failed to run builder for {target}"));
                    return Err(PipelineError::Io(e));
                }
            };
            logger::capture_output(&self.program.display().to_string(), &output);

            if !output.status.success() {
                logger::spinner_error(&format!("Build failed for {target}"));
                return Err(PipelineError::BuildFailed {
                    target: target.to_string(),
                    status: output.status.code(),
                });
            }
            logger::spinner_success(&format!("Built {target}"));
        }
        Ok(())
    }
}

/// Remove `<plugin_dir>/Intermediate/Build` so nothing stale leaks into a build
pub fn clean_intermediate_build(plugin_dir: &Path) -> Result<(), PipelineError> {
    let build_dir = plugin_dir.join("Intermediate").join("Build");
    if build_dir.is_dir() {
        debug!("Removing {:?}", build_dir);
        fs::remove_dir_all(&build_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugpack_manifest::{Configuration, Platform, TargetKind};
    use tempfile::TempDir;

    fn target() -> BuildTarget {
        BuildTarget {
            target_name: "UE4Game".to_string(),
            platform: Platform::Win64,
            configuration: Configuration::Shipping,
            target_kind: TargetKind::Game,
            modules: vec!["FooModule".to_string(), "FooRuntime".to_string()],
            receipt_path: PathBuf::from("/Plugins/Foo/Binaries/Win64/UE4Game-Win64-Shipping.target"),
        }
    }

    #[test]
    fn test_arguments_layout() {
        let args = ExternalCommandBuilder::arguments(Path::new("/Plugins/Foo/Foo.uplugin"), &target());
        assert_eq!(
            args,
            vec![
                "UE4Game",
                "Win64",
                "Shipping",
                "-plugin",
                "/Plugins/Foo/Foo.uplugin",
                "-module",
                "FooModule",
                "-module",
                "FooRuntime",
                "-receipt",
                "/Plugins/Foo/Binaries/Win64/UE4Game-Win64-Shipping.target",
            ]
        );
    }

    #[test]
    fn test_unknown_program_is_reported() {
        let result = ExternalCommandBuilder::new("plugpack-no-such-builder");
        assert!(matches!(result, Err(PipelineError::BuilderNotFound(_))));
    }

    #[test]
    fn test_clean_intermediate_build_keeps_other_intermediates() -> Result<(), Box<dyn std::error::Error>>
    {
        let temp = TempDir::new()?;
        let build = temp.path().join("Intermediate").join("Build").join("Win64");
        let other = temp.path().join("Intermediate").join("ProjectFiles");
        fs::create_dir_all(&build)?;
        fs::create_dir_all(&other)?;

        clean_intermediate_build(temp.path())?;
        assert!(!temp.path().join("Intermediate").join("Build").exists());
        assert!(other.exists());

        clean_intermediate_build(temp.path())?;
        Ok(())
    }

    #[test]
    fn test_noop_builder_succeeds() {
        let agenda = Agenda {
            manifest_path: PathBuf::from("/Plugins/Foo/Foo.uplugin"),
            targets: vec![target()],
        };
        assert!(NoopBuilder.build(&agenda).is_ok());
    }
}
