//! Centralized error types for the plugpack pipeline
//!
//! Every stage returns [`PipelineError`]. All variants are fatal; the category
//! only tells authoring mistakes apart from environment or build-order problems.

use plugpack_manifest::{ManifestError, ParseNameError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unresolvable authoring mistake (collision, bad platform, bad manifest)
    Configuration,
    /// Environment or build-order problem (missing receipt, unwritable directory)
    Resource,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error(
        "Found a plugin in '{}' which describes a module '{module_name}', but a module with this name already exists in plugin '{}'",
        new_owner_dir.display(),
        existing_owner_dir.display()
    )]
    ModuleCollision {
        module_name: String,
        existing_owner_dir: PathBuf,
        new_owner_dir: PathBuf,
    },

    #[error("{0}")]
    InvalidPlatform(#[from] ParseNameError),

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Build receipt not found: {}", .0.display())]
    ReceiptMissing(PathBuf),

    #[error("Failed to parse build receipt {}: {message}", path.display())]
    ReceiptParse { path: PathBuf, message: String },

    #[error("Failed to read filter file {}: {source}", path.display())]
    FilterFile { path: PathBuf, source: io::Error },

    #[error(
        "Filter rules exclude the plugin descriptor {}; a package must contain it",
        .0.display()
    )]
    ManifestExcluded(PathBuf),

    #[error("Failed to clear package directory {}: {source}", path.display())]
    PackageDirectory { path: PathBuf, source: io::Error },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Builder program not found: {0}")]
    BuilderNotFound(String),

    #[error("Build failed for target {target} (exit {status:?})")]
    BuildFailed { target: String, status: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Manifest(_)
            | PipelineError::ModuleCollision { .. }
            | PipelineError::InvalidPlatform(_)
            | PipelineError::InvalidPattern { .. }
            | PipelineError::ManifestExcluded(_) => ErrorCategory::Configuration,
            PipelineError::ReceiptMissing(_)
            | PipelineError::ReceiptParse { .. }
            | PipelineError::FilterFile { .. }
            | PipelineError::PackageDirectory { .. }
            | PipelineError::Copy { .. }
            | PipelineError::BuilderNotFound(_)
            | PipelineError::BuildFailed { .. }
            | PipelineError::Io(_) => ErrorCategory::Resource,
        }
    }
}
