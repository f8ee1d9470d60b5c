use std::{env::VarError, sync::Once};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, FmtSubscriber};

use super::error::TracingSetupError;
use crate::env::{get_env_var, EnvError};

const DEFAULT_DIRECTIVES: &str = "info";

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Safe to call from every test and binary,
/// only the first call has an effect.
pub fn setup_tracing() -> Result<(), TracingSetupError> {
    let mut init_result: Result<(), TracingSetupError> = Ok(());

    // ensures that the subscriber is only initialized once for all threads
    TRACING_INIT.call_once(|| {
        let filter = match filter_from_env() {
            Ok(filter) => filter,
            Err(e) => {
                init_result = Err(e);
                return;
            }
        };

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_timer(UtcTime::rfc_3339())
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .fmt_fields(fmt::format::DefaultFields::new())
            .event_format(
                fmt::format()
                    .compact()
                    .with_line_number(true)
                    .with_thread_ids(true),
            )
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            init_result = Err(e.into());
        }
    });
    init_result
}

/// Parses `RUST_LOG` style directives, rejecting any that do not parse.
pub fn env_filter(directives: &str) -> Result<EnvFilter, TracingSetupError> {
    Ok(EnvFilter::try_new(directives)?)
}

// RUST_LOG falls back to info only when unset
fn filter_from_env() -> Result<EnvFilter, TracingSetupError> {
    match get_env_var("RUST_LOG") {
        Ok(directives) => env_filter(&directives),
        Err(EnvError::EnvVar(VarError::NotPresent, _)) => env_filter(DEFAULT_DIRECTIVES),
        Err(e) => Err(e.into()),
    }
}
