use thiserror::Error;
use tokio::sync::mpsc;
use tracing::error;

use crate::key::KeyError;

use super::Action;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dropped {action} event: {source}")]
pub struct DispatchError {
    pub action: Action,
    #[source]
    pub source: KeyError,
}

pub type ErrorSink = mpsc::UnboundedSender<DispatchError>;
pub type ErrorReceiver = mpsc::UnboundedReceiver<DispatchError>;

pub fn error_channel() -> (ErrorSink, ErrorReceiver) {
    mpsc::unbounded_channel()
}

/// Logs every dispatch error until all sinks are dropped.
pub async fn log_dispatch_errors(mut receiver: ErrorReceiver) {
    while let Some(err) = receiver.recv().await {
        error!("Failed to dispatch event: {err}");
    }
}
