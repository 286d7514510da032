//! Copy a filtered plugin into a redistributable package directory

use crate::errors::PipelineError;
use crate::filter::{plugin_filter, FilterSettings};
use plugpack_manifest::{BuildProduct, PluginManifest};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What ended up in the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub output_dir: PathBuf,
    /// Relative `/`-separated paths, in copy order
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Packager {
    settings: FilterSettings,
}

impl Packager {
    pub fn new(settings: FilterSettings) -> Self {
        Packager { settings }
    }

    /// Replace the contents of `output_dir` with the filtered plugin.
    ///
    /// The packaged manifest is marked installed and disabled by default. The
    /// source manifest is not touched. Filter rules that drop the manifest fail
    /// the run before `output_dir` is modified.
    pub fn package(
        &self,
        manifest_path: &Path,
        products: &[BuildProduct],
        output_dir: &Path,
    ) -> Result<PackageSummary, PipelineError> {
        let plugin_dir = manifest_path.parent().unwrap_or(Path::new("."));

        let filter = plugin_filter(manifest_path, products, &self.settings)?;
        let files = filter.apply(plugin_dir)?;
        if let Some(file_name) = manifest_path.file_name() {
            if !files.iter().any(|file| file.as_str() == file_name.to_string_lossy()) {
                return Err(PipelineError::ManifestExcluded(manifest_path.to_path_buf()));
            }
        }

        prepare_output_dir(plugin_dir, output_dir)?;

        for relative in &files {
            let from = plugin_dir.join(relative);
            let to = output_dir.join(relative);
            copy_file(&from, &to)?;
        }
        info!("Copied {} file(s) to {:?}", files.len(), output_dir);

        if let Some(file_name) = manifest_path.file_name() {
            let packaged = output_dir.join(file_name);
            let mut manifest = PluginManifest::load(&packaged)?;
            manifest.enabled_by_default = false;
            manifest.installed = true;
            manifest.save(&packaged)?;
        }

        Ok(PackageSummary {
            output_dir: output_dir.to_path_buf(),
            files,
        })
    }
}

fn prepare_output_dir(plugin_dir: &Path, output_dir: &Path) -> Result<(), PipelineError> {
    let package_error = |source: io::Error| PipelineError::PackageDirectory {
        path: output_dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(package_error)?;
    let output = fs::canonicalize(output_dir).map_err(package_error)?;
    let plugin = fs::canonicalize(plugin_dir)?;
    if plugin.starts_with(&output) || output.starts_with(&plugin) {
        return Err(package_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "package directory overlaps the plugin directory",
        )));
    }

    clear_directory_contents(output_dir).map_err(package_error)
}

/// Remove everything inside `dir`, keeping `dir` itself
pub fn clear_directory_contents(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    debug!("Cleared {:?}", dir);
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PipelineError> {
    let copy_error = |source: io::Error| PipelineError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_error)?;
    }
    fs::copy(from, to).map_err(copy_error)?;
    Ok(())
}
