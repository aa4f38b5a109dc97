//! Error types for the storage layer.
//!
//! I/O failures carry the operation that failed so that the crash log and
//! the logs say more than "No such file or directory". Validation problems
//! with a stored document are reported separately through
//! [`ValidationError`]; they are always recovered from and never surface as
//! a [`StoreError`].

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What the store was doing.
        context: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Reasons a stored document is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The bytes are not JSON.
    #[error("document is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The top-level value is not an object.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// A required top-level section is absent.
    #[error("missing required section: {0}")]
    MissingSection(&'static str),

    /// A spot-checked field has the wrong primitive type.
    #[error("field {field} must be a {expected}")]
    WrongType {
        /// Dotted path of the field.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// The document passed the spot checks but does not match the schema.
    #[error("document does not match the schema: {0}")]
    Schema(#[source] serde_json::Error),
}
