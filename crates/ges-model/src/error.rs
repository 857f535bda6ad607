use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("unrecognized condition label: {0:?}")]
    UnknownCondition(String),
    #[error("invalid procedure code: {0:?}")]
    InvalidProcedureCode(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
