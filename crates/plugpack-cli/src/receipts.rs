//! Merge build products from the receipts of an agenda

use crate::errors::PipelineError;
use plugpack_manifest::{BuildProduct, BuildReceipt, ManifestError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read one receipt, mapping descriptor errors onto receipt errors
pub fn read_receipt(path: &Path) -> Result<BuildReceipt, PipelineError> {
    BuildReceipt::read(path).map_err(|e| match e {
        ManifestError::NotFound(path) => PipelineError::ReceiptMissing(path),
        ManifestError::Parse { path, message } => PipelineError::ReceiptParse { path, message },
        other => PipelineError::Manifest(other),
    })
}

/// Concatenate the products of every receipt in order.
///
/// Products are not deduplicated; the package copy collapses repeated paths.
pub fn aggregate(receipt_paths: &[PathBuf]) -> Result<Vec<BuildProduct>, PipelineError> {
    let mut products = Vec::new();
    for path in receipt_paths {
        let receipt = read_receipt(path)?;
        debug!(
            "Receipt {:?} lists {} product(s)",
            path,
            receipt.build_products.len()
        );
        products.extend(receipt.build_products);
    }
    Ok(products)
}
