mod error;
mod tracing;

pub use self::tracing::{env_filter, setup_tracing};
pub use error::TracingSetupError;
