//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema parsing error.
    #[error("schema parse error: {0}")]
    Parse(#[from] handlegen_schema::ParseError),

    /// Schema model error.
    #[error("schema error: {0}")]
    Schema(#[from] handlegen_schema::SchemaError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed replay override file.
    #[error("malformed override file: {0}")]
    Overrides(#[source] serde_json::Error),

    /// Malformed denylist file.
    #[error("malformed denylist file: {0}")]
    Denylist(#[source] serde_json::Error),

    /// Malformed generator configuration.
    #[error("malformed generator configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}
