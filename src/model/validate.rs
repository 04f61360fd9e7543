//! Pre-load validation gate.
//!
//! A cheap format/existence/permission check run before any native call, so
//! a handle is never created for an invalid model. This performs no parsing
//! of model internals.

use std::fs;

use tracing::{debug, warn};

use crate::error::{Result, RuntimeError};
use crate::model::{ModelFormat, ModelMetadata};

/// Validate a resolved model for runtime use.
///
/// Order matters and is observable: format is checked before existence,
/// existence before readability. The size comparison at the end is a
/// diagnostic only and never fails the gate.
pub(crate) fn validate_model(model: &ModelMetadata) -> Result<()> {
    if model.format != ModelFormat::Gguf {
        return Err(RuntimeError::UnsupportedFormat(format!(
            "Model format '{}' is not supported. Only GGUF models are supported at this time.",
            model.format
        )));
    }

    if !model.path.exists() {
        return Err(RuntimeError::ModelFileMissing(
            model.path.display().to_string(),
        ));
    }

    // Opening the file is the only reliable readability probe; a directory
    // at the path also fails here since the runtime needs a regular file.
    let regular_file = fs::metadata(&model.path)
        .map(|attributes| attributes.is_file())
        .unwrap_or(true);
    if !regular_file || fs::File::open(&model.path).is_err() {
        return Err(RuntimeError::ModelFileUnreadable(
            model.path.display().to_string(),
        ));
    }

    // Best-effort size comparison against the catalog entry. Mismatch is
    // logged, never raised; checksum verification is not implemented yet.
    match fs::metadata(&model.path) {
        Ok(attributes) => {
            if attributes.len() != model.size_bytes {
                warn!(
                    model = %model.id,
                    on_disk = attributes.len(),
                    declared = model.size_bytes,
                    "model file size does not match catalog metadata"
                );
            }
        }
        Err(error) => {
            debug!(model = %model.id, %error, "could not read model file attributes");
        }
    }

    Ok(())
}
