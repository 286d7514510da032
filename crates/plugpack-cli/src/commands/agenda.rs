use crate::agenda::{AgendaBuilder, TargetNames};
use crate::commands::build::print_agenda;
use crate::commands::AgendaArgs;
use crate::common::absolute_path;
use crate::GlobalOpts;
use anyhow::Result;
use clap::Parser;
use plugpack_config::Config;
use plugpack_manifest::PluginManifest;

#[derive(Parser, Debug, Clone)]
pub struct AgendaCommand {
    #[command(flatten)]
    pub agenda: AgendaArgs,

    /// Print the agenda as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print the targets `build` would compile, without compiling anything
pub fn handle_agenda(cmd: AgendaCommand, _opts: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let (editor_platforms, game_platforms) = cmd.agenda.platforms()?;
    let manifest_path = absolute_path(&cmd.agenda.plugin)?;
    let manifest = PluginManifest::load(&manifest_path)?;

    let agenda = AgendaBuilder::new(TargetNames::from(&config)).build_agenda(
        &manifest_path,
        &manifest,
        &editor_platforms,
        &game_platforms,
    );

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
    } else {
        print_agenda(&agenda);
    }
    Ok(())
}
