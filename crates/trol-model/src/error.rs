use thiserror::Error;
use trol_core::PropertyError;
use trol_store::StoreError;

/// Errors from schema construction and model-level operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No property is registered under this field name.
    #[error("model {model} has no property {field}")]
    UnknownProperty { model: String, field: String },

    /// The field name was registered twice on one schema.
    #[error("model {model} already has a property {field}")]
    DuplicateProperty { model: String, field: String },

    /// No schema is registered under this model name.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A schema with this model name is already registered.
    #[error("model already registered: {0}")]
    DuplicateModel(String),

    /// A model reference cannot be turned back into a record.
    #[error("unresolvable model reference: {0}")]
    UnresolvableRef(String),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
