//! `plugpack build`: discover, plan, build and optionally package one plugin

use crate::agenda::{Agenda, AgendaBuilder, TargetNames};
use crate::builder::{clean_intermediate_build, ExternalCommandBuilder, NoopBuilder, TargetBuilder};
use crate::commands::AgendaArgs;
use crate::common::{absolute_path, RootArgs};
use crate::errors::PipelineError;
use crate::filter::FilterSettings;
use crate::packager::{PackageSummary, Packager};
use crate::plugins::PluginContext;
use crate::receipts;
use crate::GlobalOpts;
use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use plugpack_config::Config;
use plugpack_logger as logger;
use plugpack_manifest::{BuildProduct, Platform, PluginManifest};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct BuildCommand {
    #[command(flatten)]
    pub agenda: AgendaArgs,

    /// Copy the filtered plugin into DIR after building
    #[arg(long, value_name = "DIR")]
    pub package: Option<PathBuf>,

    #[command(flatten)]
    pub roots: RootArgs,

    /// Do not compile; receipts from an earlier build must exist
    #[arg(long)]
    pub skip_build: bool,

    /// Program invoked once per target (overrides the `builder` config key)
    #[arg(long, value_name = "PROGRAM")]
    pub builder: Option<String>,
}

/// Everything the build pipeline needs for one plugin
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub manifest_path: PathBuf,
    pub editor_platforms: Vec<Platform>,
    pub game_platforms: Vec<Platform>,
    pub package_dir: Option<PathBuf>,
    pub clean_intermediate: bool,
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub agenda: Agenda,
    /// Products of every receipt; only collected when packaging
    pub products: Vec<BuildProduct>,
    pub package: Option<PackageSummary>,
}

/// Run the pipeline.
///
/// Discovery runs first so that a module collision anywhere under the roots
/// aborts before an agenda is produced.
pub fn run_build(
    request: &BuildRequest,
    context: &PluginContext,
    config: &Config,
    builder: &dyn TargetBuilder,
) -> Result<BuildOutcome, PipelineError> {
    context.discovered()?;

    let manifest = PluginManifest::load(&request.manifest_path)?;
    let agenda = AgendaBuilder::new(TargetNames::from(config)).build_agenda(
        &request.manifest_path,
        &manifest,
        &request.editor_platforms,
        &request.game_platforms,
    );

    if request.clean_intermediate {
        clean_intermediate_build(agenda.plugin_dir())?;
    }
    builder.build(&agenda)?;

    let Some(package_dir) = &request.package_dir else {
        return Ok(BuildOutcome {
            agenda,
            products: Vec::new(),
            package: None,
        });
    };

    let products = receipts::aggregate(&agenda.receipt_paths())?;
    let summary = Packager::new(FilterSettings::from(config)).package(
        &request.manifest_path,
        &products,
        package_dir,
    )?;
    Ok(BuildOutcome {
        agenda,
        products,
        package: Some(summary),
    })
}

pub fn print_agenda(agenda: &Agenda) {
    if agenda.is_empty() {
        println!("{}", "No targets to build".yellow());
        return;
    }
    println!(
        "{} {}",
        "Agenda for".bold().green(),
        agenda.manifest_path.display()
    );
    for target in &agenda.targets {
        println!(
            "  {} {} {} [{}]",
            target.target_name.cyan(),
            target.platform,
            target.configuration,
            target.modules.join(", ")
        );
        println!("    receipt: {}", target.receipt_path.display().to_string().dimmed());
    }
}

pub fn handle_build(cmd: BuildCommand, _opts: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let (editor_platforms, game_platforms) = cmd.agenda.platforms()?;
    if editor_platforms.is_empty() && game_platforms.is_empty() {
        logger::warn("No platforms requested; pass --editor-platforms or --game-platforms");
    }
    let manifest_path = absolute_path(&cmd.agenda.plugin)?;

    let builder: Box<dyn TargetBuilder> = if cmd.skip_build {
        Box::new(NoopBuilder)
    } else {
        let program = cmd
            .builder
            .or_else(|| config.builder.clone())
            .ok_or_else(|| {
                anyhow!("No builder configured. Pass --builder, set it with `plugpack config set builder <PROGRAM>`, or use --skip-build")
            })?;
        let builder = ExternalCommandBuilder::new(&program)?;
        logger::info(&format!("Using builder {}", builder.program().display()));
        Box::new(builder)
    };

    let request = BuildRequest {
        manifest_path,
        editor_platforms,
        game_platforms,
        package_dir: cmd.package,
        clean_intermediate: !cmd.skip_build,
    };
    let context = PluginContext::new(cmd.roots.discovery_roots(&config));

    logger::step(&format!("Building {}", request.manifest_path.display()));
    let outcome = run_build(&request, &context, &config, builder.as_ref())?;
    print_agenda(&outcome.agenda);

    match outcome.package {
        Some(summary) => logger::success(&format!(
            "Packaged {} file(s) to {}",
            summary.files.len(),
            summary.output_dir.display()
        )),
        None => logger::success(&format!("Built {} target(s)", outcome.agenda.len())),
    }
    Ok(())
}
