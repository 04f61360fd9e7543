//! Model metadata and the catalog that resolves model ids.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// On-disk format a model declares in its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Quantized llama.cpp format. The only format the runtime supports.
    Gguf,
    /// ONNX export (unsupported).
    Onnx,
    /// Safetensors checkpoint (unsupported).
    Safetensors,
}

impl std::fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelFormat::Gguf => "gguf",
            ModelFormat::Onnx => "onnx",
            ModelFormat::Safetensors => "safetensors",
        };
        f.write_str(name)
    }
}

/// Immutable description of an imported model. The runtime treats this as a
/// read-only snapshot per call; the catalog owns the persistent copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Declared on-disk format.
    pub format: ModelFormat,
    /// Location of the model file.
    pub path: PathBuf,
    /// Declared size in bytes, compared best-effort against the file.
    pub size_bytes: u64,
}

/// Read-only lookup of model metadata by identifier.
pub trait ModelCatalog: Send + Sync {
    /// Resolve an id to its metadata, if the catalog knows it.
    fn get_model(&self, id: &str) -> Option<ModelMetadata>;
}

impl<T: ModelCatalog + ?Sized> ModelCatalog for Arc<T> {
    fn get_model(&self, id: &str) -> Option<ModelMetadata> {
        (**self).get_model(id)
    }
}

/// In-memory catalog with optional JSON persistence.
///
/// The index is a [`DashMap`] so reads never block each other; persistence
/// is a whole-catalog atomic write, matching how small the catalog stays in
/// practice.
pub struct JsonCatalog {
    models: DashMap<String, ModelMetadata>,
    persist_path: Option<PathBuf>,
}

impl JsonCatalog {
    /// Empty, non-persisted catalog.
    pub fn in_memory() -> Self {
        Self {
            models: DashMap::new(),
            persist_path: None,
        }
    }

    /// Catalog persisted at the given JSON file. Loads existing entries if
    /// the file is present; a missing file is an empty catalog, not an
    /// error.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let models = DashMap::new();
        match std::fs::read(&path) {
            Ok(bytes) => {
                let entries: Vec<ModelMetadata> = serde_json::from_slice(&bytes)
                    .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
                for entry in entries {
                    models.insert(entry.id.clone(), entry);
                }
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no catalog file yet, starting empty");
            }
            Err(error) => return Err(error),
        }
        Ok(Self {
            models,
            persist_path: Some(path),
        })
    }

    /// Insert or replace a model entry and persist the catalog.
    pub fn insert(&self, model: ModelMetadata) -> io::Result<()> {
        self.models.insert(model.id.clone(), model);
        self.save()
    }

    /// Remove a model entry and persist the catalog. Returns the removed
    /// metadata, if any.
    pub fn remove(&self, id: &str) -> io::Result<Option<ModelMetadata>> {
        let removed = self.models.remove(id).map(|(_, model)| model);
        if removed.is_some() {
            self.save()?;
        }
        Ok(removed)
    }

    /// All entries, in unspecified order.
    pub fn list(&self) -> Vec<ModelMetadata> {
        self.models.iter().map(|entry| entry.value().clone()).collect()
    }

    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let entries = self.list();
        let bytes = serde_json::to_vec_pretty(&entries)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        crate::storage::write_atomic(path, &bytes)
    }
}

impl ModelCatalog for JsonCatalog {
    fn get_model(&self, id: &str) -> Option<ModelMetadata> {
        self.models.get(id).map(|entry| entry.value().clone())
    }
}
