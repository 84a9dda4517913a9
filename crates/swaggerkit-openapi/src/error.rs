//! Error types for document generation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating a swagger document
#[derive(Debug, Error)]
pub enum SwaggerGenError {
    /// The requested document name was never registered with `swagger_doc`
    #[error("Unknown Swagger document \"{0}\"")]
    UnknownDocument(String),

    /// The tag selector could not resolve a tag for an operation
    #[error("Unable to determine tag for endpoint {operation}")]
    UnableToDetermineTag { operation: String },

    /// Several descriptions share a method/path pair and no resolver is configured
    #[error(
        "Conflicting method/path combination \"{method} {path}\" for actions - {actions}. \
         Actions require a unique method/path combination; configure a conflicting actions resolver"
    )]
    ConflictingActions {
        method: String,
        path: String,
        actions: String,
    },

    /// The document could not be serialized to JSON
    #[error("Failed to serialize Swagger document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading an XML documentation file
#[derive(Debug, Error)]
pub enum XmlCommentsError {
    #[error("Failed to read XML comments from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML comments: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
}
