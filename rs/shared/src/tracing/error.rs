use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::ParseError;

use crate::env::EnvError;

#[derive(Error, Debug)]
pub enum TracingSetupError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] EnvError),
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("Subscriber error: {0}")]
    SetGlobalDefaultError(#[from] SetGlobalDefaultError),
}
