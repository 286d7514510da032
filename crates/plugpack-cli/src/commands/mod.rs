pub mod agenda;
pub mod build;
pub mod config;
pub mod discover;
pub mod filter;
pub mod owner;

use crate::errors::PipelineError;
use clap::Args;
use plugpack_manifest::Platform;
use std::path::PathBuf;

/// Plugin and platform selection shared by `build` and `agenda`
#[derive(Args, Debug, Clone, Default)]
pub struct AgendaArgs {
    /// Path to the plugin descriptor (.uplugin)
    #[arg(long, value_name = "PATH")]
    pub plugin: PathBuf,

    /// Editor platforms, separated by '+' (e.g. Win64+Mac)
    #[arg(long, value_name = "PLATFORMS", default_value = "")]
    pub editor_platforms: String,

    /// Game platforms, separated by '+' (e.g. Win64+Linux)
    #[arg(long, value_name = "PLATFORMS", default_value = "")]
    pub game_platforms: String,
}

impl AgendaArgs {
    pub fn platforms(&self) -> Result<(Vec<Platform>, Vec<Platform>), PipelineError> {
        Ok((
            Platform::parse_list(&self.editor_platforms)?,
            Platform::parse_list(&self.game_platforms)?,
        ))
    }
}
