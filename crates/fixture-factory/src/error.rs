//! Error types for factory operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::InstanceId;

/// Failure reported by a model while assigning an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("unknown attribute `{0}`")]
    Unknown(String),
    #[error("attribute `{attribute}` expects {expected}")]
    Mismatch {
        attribute: String,
        expected: &'static str,
    },
}

impl AttributeError {
    pub fn mismatch(attribute: &str, expected: &'static str) -> Self {
        Self::Mismatch {
            attribute: attribute.to_string(),
            expected,
        }
    }
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("No factory defined for model: {0}")]
    NoDefinedFactory(String),

    #[error("Model {model} has no `{method}` method and no custom saver is set")]
    SaveMethodNotFound { model: String, method: String },

    #[error("Model {model} has no `{method}` method and no custom deleter is set")]
    DeleteMethodNotFound { model: String, method: String },

    #[error("Failed to save {model} ({instance}){}", detail(.errors))]
    SaveFailed {
        model: String,
        instance: InstanceId,
        /// Validation detail exposed by the model, if any.
        errors: Option<String>,
    },

    #[error("Failed to delete {model} ({instance})")]
    DeleteFailed { model: String, instance: InstanceId },

    #[error("Failed to delete {} saved instance(s): {}", .0.len(), join_messages(.0))]
    DeletingFailed(Vec<FactoryError>),

    #[error("Cannot assign attribute on {model}: {source}")]
    Attribute {
        model: String,
        #[source]
        source: AttributeError,
    },

    #[error("Unknown generator: {0}")]
    UnknownGenerator(String),

    #[error("Invalid descriptor `{descriptor}`: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },

    #[error("Unable to produce a unique value for `{0}`")]
    UniqueExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid definition file {}: {source}", .path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FactoryError {
    /// The underlying failures of a [`FactoryError::DeletingFailed`], empty otherwise.
    pub fn failures(&self) -> &[FactoryError] {
        match self {
            FactoryError::DeletingFailed(failures) => failures,
            _ => &[],
        }
    }

    pub(crate) fn invalid_descriptor(descriptor: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }
}

fn detail(errors: &Option<String>) -> String {
    errors
        .as_deref()
        .map(|e| format!(": {e}"))
        .unwrap_or_default()
}

fn join_messages(errors: &[FactoryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = FactoryError> = std::result::Result<T, E>;
