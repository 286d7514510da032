use crate::common::RootArgs;
use crate::plugins::PluginContext;
use crate::GlobalOpts;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use plugpack_config::Config;

#[derive(Parser, Debug, Clone)]
pub struct DiscoverCommand {
    #[command(flatten)]
    pub roots: RootArgs,
}

/// List every plugin under the configured roots
pub fn handle_discover(cmd: DiscoverCommand, opts: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let context = PluginContext::new(cmd.roots.discovery_roots(&config));

    if context.roots().is_empty() {
        println!("No plugin roots configured.\n");
        println!(
            "Pass {} or {}, or set them with:\n  {} config set engine-dir <DIR>",
            "--engine-dir".cyan(),
            "--project-dir".cyan(),
            "plugpack".bold().cyan()
        );
        return Ok(());
    }

    let plugins = context.plugins()?;

    if plugins.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    println!("{}", "Plugins:".bold().green());
    for plugin in plugins {
        let mut header = format!(
            " {} {}",
            plugin.name.bold().blue(),
            format!("[{}]", plugin.provenance).dimmed()
        );
        if plugin.manifest.installed {
            header.push_str(&format!(" {}", "[installed]".yellow()));
        }
        println!("{}", header);
        if opts.verbosity_level() > 0 {
            println!("    {}", plugin.manifest_path.display().to_string().dimmed());
        }
        for module in &plugin.manifest.modules {
            println!("    - {} ({:?})", module.name, module.kind);
        }
    }
    println!();
    println!("{}: {}", "Total plugins".bold(), plugins.len());
    Ok(())
}
