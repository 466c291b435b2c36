use compedit_common::EditPath;
use thiserror::Error;

/// Errors raised while constructing or registering schemas
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Union must have at least two variants, found {0}")]
    UnionTooSmall(usize),

    #[error("Enum must declare at least one value")]
    EmptyEnum,

    #[error("Invalid bounds: min {min} is greater than max {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Discriminator `{0}` is not a literal field of every variant")]
    InvalidDiscriminator(String),

    #[error("Component schema for `{0}` must be an object")]
    TopLevelNotObject(String),

    #[error("Component `{0}` is already registered")]
    DuplicateComponent(String),

    #[error("Invalid schema document: {0}")]
    Wire(String),
}

/// Errors raised when a value does not satisfy its schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{}{}", at(.path), .message)]
    SchemaMismatch { path: EditPath, message: String },

    #[error("{}unsupported schema type `{}`", at(.path), .type_name)]
    UnsupportedType { path: EditPath, type_name: String },
}

impl ValidationError {
    pub fn mismatch(path: &EditPath, message: impl Into<String>) -> Self {
        ValidationError::SchemaMismatch {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &EditPath {
        match self {
            ValidationError::SchemaMismatch { path, .. } => path,
            ValidationError::UnsupportedType { path, .. } => path,
        }
    }

    /// The message without the path prefix.
    pub fn message(&self) -> String {
        match self {
            ValidationError::SchemaMismatch { message, .. } => message.clone(),
            ValidationError::UnsupportedType { type_name, .. } => {
                format!("unsupported schema type `{}`", type_name)
            }
        }
    }
}

fn at(path: &EditPath) -> String {
    if path.is_root() {
        String::new()
    } else {
        format!("{}: ", path)
    }
}

/// Errors raised by the color codec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Color must start with `#`: {0}")]
    MissingHash(String),

    #[error("Color must have 3, 4, 6 or 8 hex digits: {0}")]
    InvalidLength(String),

    #[error("Invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

pub type SchemaResult<T> = Result<T, SchemaError>;
