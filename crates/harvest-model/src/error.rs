use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("invalid temporal value: {0:?}")]
    InvalidTemporal(String),
    #[error("invalid concept: {0:?}")]
    InvalidConcept(String),
    #[error("unknown language code: {0:?}")]
    UnknownLanguage(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
