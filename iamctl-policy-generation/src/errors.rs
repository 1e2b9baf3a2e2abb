//! Error types for policy code generation.
//!
//! Every failure in the pipeline is fatal: the generator aborts and no output
//! file is produced. [`CodegenError::UnsupportedType`] is the only variant that
//! signals a defect in the generator itself rather than bad input.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while compiling a policy document into source.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The input document is not well-formed or lacks a required field.
    #[error("Failed to parse policy document: {message}")]
    Parse { message: String },

    /// Reading the input or writing the output failed.
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field holds a JSON shape none of its permitted forms accept.
    #[error("Invalid type for field '{field}': expected {expected}, found {found}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// Literal synthesis met a shape it has no rule for.
    #[error("Unsupported literal shape during synthesis: {0}")]
    UnsupportedType(String),

    /// The skeleton source could not be parsed after namespace substitution.
    #[error("Failed to parse template: {0}")]
    Template(String),

    /// The skeleton has no placeholder return to replace.
    #[error("No stub returning `{document_type}` found in function `{function}`")]
    StubNotFound {
        function: String,
        document_type: String,
    },

    /// A schema name or identifier in the configuration is not valid Rust.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },
}

impl CodegenError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub(crate) fn io(operation: &str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_field_type(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::InvalidFieldType {
            field: field.into(),
            expected,
            found: json_kind(found).to_string(),
        }
    }

    pub(crate) fn invalid_config(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error indicates a generator defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnsupportedType(_))
    }
}

impl From<serde_json::Error> for CodegenError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

/// Short name of a JSON value's shape for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodegenError>;
