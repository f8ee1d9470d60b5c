use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("object has no name")]
    MissingName,
    #[error("unexpected key format: {0:?}")]
    InvalidFormat(String),
}
