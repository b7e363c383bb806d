/*!
 * Error types for the cornucopia-convert application.
 *
 * This module contains custom error types for the different parts of the
 * conversion pipeline, using the thiserror crate for ergonomic error definitions.
 * A dictionary miss is not an error: resolvers return `None` for it.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or mutating an XML fragment
#[derive(Error, Debug)]
pub enum XmlError {
    /// The fragment could not be parsed
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader message
        message: String,
    },

    /// The fragment has no root element
    #[error("XML fragment has no root element")]
    MissingRoot,

    /// Serialization of the tree failed
    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// Errors that can occur while converting one (format, language) pair
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Missing or incomplete language or mapping data; aborts the current pair
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A structured file (YAML, XML fragment) could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Reading or writing a zip based document failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// The document does not have the expected structure
    #[error("Document error: {0}")]
    Document(String),

    /// XML tree error
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Error from a file operation
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive(error.to_string())
    }
}

impl ConvertError {
    /// Build a parse error for the given file
    pub fn parse<P: Into<PathBuf>>(path: P, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across the library
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
