use thiserror::Error;

/// Errors raised while reading or writing property values by path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    #[error("Cannot descend into {found} at `{path}`")]
    NotAContainer { path: String, found: &'static str },

    #[error("Index {index} out of bounds (length {len}) at `{path}`")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid path `{0}`")]
    InvalidPath(String),
}
