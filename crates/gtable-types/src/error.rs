use thiserror::Error;

/// Contract-violation errors.
///
/// Every variant is raised synchronously at the offending call and is
/// fatal to the current transform invocation; there is no recoverable
/// tier inside the engine.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("column {0} has more than one distinct value in a group")]
    NonUniqueValue(String),

    #[error("column {0} is not orderable: {1}")]
    NotOrderable(String, String),
}

pub type Result<T> = std::result::Result<T, TableError>;
