//! Common types and utilities shared across modules

use clap::{Args, Parser};
use plugpack_config::Config;
use std::io;
use std::path::{Path, PathBuf};

use crate::plugins::DiscoveryRoot;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Only write logs to the log file")]
    pub no_stdout: bool,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Directory roots searched for plugins
#[derive(Args, Debug, Clone, Default)]
pub struct RootArgs {
    /// Engine directory; plugins are searched under <DIR>/Plugins
    #[arg(long, value_name = "DIR")]
    pub engine_dir: Option<PathBuf>,

    /// Project directory; plugins are searched under <DIR>/Plugins (repeatable)
    #[arg(long = "project-dir", value_name = "DIR")]
    pub project_dirs: Vec<PathBuf>,
}

impl RootArgs {
    /// Combine flags with configured roots; flags take precedence
    pub fn discovery_roots(&self, config: &Config) -> Vec<DiscoveryRoot> {
        let engine_dir = self.engine_dir.as_ref().or(config.engine_dir.as_ref());
        let project_dirs = if self.project_dirs.is_empty() {
            &config.project_dirs
        } else {
            &self.project_dirs
        };
        DiscoveryRoot::for_layout(engine_dir.map(PathBuf::as_path), project_dirs)
    }
}

/// Join a relative path onto the working directory
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
