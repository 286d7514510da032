use crate::common::absolute_path;
use crate::filter::{list_files, plugin_filter, FilterSettings};
use crate::receipts;
use crate::GlobalOpts;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use plugpack_config::Config;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
pub struct FilterCommand {
    /// Path to the plugin descriptor (.uplugin)
    #[arg(long, value_name = "PATH")]
    pub plugin: PathBuf,

    /// Build receipt whose products are included (repeatable)
    #[arg(long = "receipt", value_name = "PATH")]
    pub receipts: Vec<PathBuf>,

    /// Also list excluded files with the rule that decided them
    #[arg(long)]
    pub explain: bool,
}

/// Print the files a package of the plugin would contain
pub fn handle_filter(cmd: FilterCommand, _opts: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let manifest_path = absolute_path(&cmd.plugin)?;
    let plugin_dir = manifest_path.parent().unwrap_or(Path::new("."));

    let products = receipts::aggregate(&cmd.receipts)?;
    let filter = plugin_filter(&manifest_path, &products, &FilterSettings::from(&config))?;

    if !cmd.explain {
        for file in filter.apply(plugin_dir)? {
            println!("{file}");
        }
        return Ok(());
    }

    for file in list_files(plugin_dir)? {
        match filter.explain(&file) {
            Some(rule) if filter.matches(&file) => {
                println!("{} {}  {}", "+".green(), file, rule.to_string().dimmed());
            }
            Some(rule) => println!("{} {}  {}", "-".red(), file, rule.to_string().dimmed()),
            None => println!("{} {}  {}", "-".red(), file, "(no matching rule)".dimmed()),
        }
    }
    Ok(())
}
