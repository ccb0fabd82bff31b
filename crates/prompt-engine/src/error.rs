//! Error types for prompt operations
//!
//! Parse diagnostics, missing data and security risks are reported as data on
//! the result types. The variants here cover the few failures that cannot be
//! degraded into a diagnostic.

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// A value could not be serialized into rendered or exported text
    #[error("Failed to serialize {context}: {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Imported JSON did not describe a prompt definition
    #[error("Failed to deserialize prompt definition: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The markdown export template failed to render
    #[error("Failed to render export template '{name}': {detail}")]
    TemplateRender { name: String, detail: String },

    /// A preview link could not be built or decoded
    #[error("Invalid preview link: {0}")]
    InvalidPreviewLink(String),

    /// The base URL for a preview link is not a valid URL
    #[error("Invalid URL '{url}': {detail}")]
    InvalidUrl { url: String, detail: String },
}

impl PromptError {
    pub(crate) fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
