//! Error types for the editor

use compedit_common::CommonError;
use compedit_schema::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Hydration error: {0}")]
    Hydrate(#[from] HydrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path error: {0}")]
    Path(#[from] CommonError),

    #[error("Unknown composition `{0}`")]
    UnknownComposition(String),

    #[error("Nothing selected")]
    NoSelection,

    #[error("Composition `{0}` has no background")]
    NoBackground(String),

    #[error("No pending save `{0}`")]
    UnknownSave(String),
}

/// Errors raised turning stored composition records into live nodes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydrateError {
    #[error("Unknown component `{name}` for composition `{id}`")]
    UnknownComponent { id: String, name: String },

    #[error("Unknown background `{name}` for composition `{id}`")]
    UnknownBackground { id: String, name: String },

    #[error("Duplicate composition id `{0}`")]
    DuplicateId(String),

    #[error("Invalid props for `{id}`: {error}")]
    InvalidProps { id: String, error: ValidationError },
}
