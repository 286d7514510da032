use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing plugin descriptors and receipts
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ManifestError {
    pub(crate) fn parse(path: &std::path::Path, message: impl ToString) -> Self {
        ManifestError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
