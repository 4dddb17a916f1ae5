//! Error types for fb2outline operations.
//!
//! Routine navigation misses (no such row, no such scheme element, a
//! location that runs off the tree) are `Option`s, not errors.

use thiserror::Error;

/// Errors that can occur while loading schemas or editing a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("<{child}> is not allowed under <{parent}>")]
    NotAllowed { parent: String, child: String },
}

pub type Result<T> = std::result::Result<T, Error>;
