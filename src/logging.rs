//! Operational logging setup.
//!
//! Library code only emits `tracing` events. Applications embedding this
//! crate call [`init`] once at startup, or install their own subscriber.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::LoggingError;

/// Installs a global `tracing-subscriber` fmt subscriber writing to stdout.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Audit events use
/// the `secret_audit` target, so `RUST_LOG=secret_audit=info` isolates them.
///
/// # Errors
///
/// Returns [`LoggingError`] if a global subscriber is already installed.
pub fn init(format: LogFormat) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    subscriber(format, filter, std::io::stdout)
        .try_init()
        .map_err(|err| LoggingError {
            reason: err.to_string(),
        })
}

fn subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer);

    match format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}
