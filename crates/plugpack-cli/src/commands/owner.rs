use crate::common::RootArgs;
use crate::plugins::PluginContext;
use crate::GlobalOpts;
use anyhow::{anyhow, Result};
use clap::Parser;
use plugpack_config::Config;
use plugpack_logger as logger;

#[derive(Parser, Debug, Clone)]
pub struct OwnerCommand {
    /// Module name (case-insensitive)
    pub module: String,

    #[command(flatten)]
    pub roots: RootArgs,
}

/// Print the directory of the plugin that declares a module
pub fn handle_owner(cmd: OwnerCommand, _opts: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let context = PluginContext::new(cmd.roots.discovery_roots(&config));

    let owner = context
        .owner_of(&cmd.module)?
        .ok_or_else(|| anyhow!("No plugin declares a module named '{}'", cmd.module))?;
    println!("{}", owner.directory.display());
    if let Some(module) = owner.manifest.module(&cmd.module) {
        logger::info(&format!(
            "{} ({:?}) is declared in {}",
            module.name,
            module.kind,
            owner.manifest_path.display()
        ));
    }
    Ok(())
}
