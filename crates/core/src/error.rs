// src/error.rs
//! Error types for the operations that can fail outward.
//!
//! Extraction, tree building and tracking never fail; they degrade to empty
//! results. Only settings persistence and document loading report errors.

use sidetoc_traits::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document is not well-formed XHTML: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("Document has no <body> element")]
    MissingBody,
}
