//! Plugin manifest handling for plugpack
//!
//! A plugin is a directory holding a single `.uplugin` descriptor. This crate
//! owns the descriptor format (loading, saving and the module compilation
//! predicate), the platform/target vocabulary shared by the rest of the
//! pipeline, and the build receipt format written by the external builder.

pub mod errors;
pub mod manifest;
pub mod receipt;
pub mod types;

pub use errors::ManifestError;
pub use manifest::{ModuleDescriptor, PluginManifest, MANIFEST_EXTENSION};
pub use receipt::{BuildProduct, BuildProductKind, BuildReceipt};
pub use types::{Configuration, ModuleKind, ParseNameError, Platform, TargetKind};
