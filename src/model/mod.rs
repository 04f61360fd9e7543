//! Model metadata, validation, and the generation runtime.

mod metadata;
mod runtime;
mod validate;

pub use metadata::{JsonCatalog, ModelCatalog, ModelFormat, ModelMetadata};
pub use runtime::ModelRuntime;

pub(crate) use validate::validate_model;
