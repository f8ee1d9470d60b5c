mod error;
mod queueing;
mod r#trait;

pub use error::{error_channel, log_dispatch_errors, DispatchError, ErrorReceiver, ErrorSink};
pub use queueing::{Action, QueueingHandler, UpdateKeySource};
pub use r#trait::ResourceEventHandler;
