use std::env::VarError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Environment variable {1}: {0}")]
    EnvVar(#[source] VarError, String),
    #[error("Environment variable {0} is empty")]
    Empty(String),
}
