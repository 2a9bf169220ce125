mod config;
mod log_format;
#[cfg(feature = "testing")]
pub mod testing;

pub use config::{Config, SentryConfig};
pub use log_format::{InvalidLogFormat, LogFormat};

use akamai_purge_config::AppConfig as _;
use sentry::integrations::{panic as sentry_panic, tracing as sentry_tracing};
use tracing_subscriber::prelude::*;

pub struct Guard {
    #[allow(dead_code)]
    sentry_guard: Option<sentry::ClientInitGuard>,
}

pub fn init() -> anyhow::Result<Guard> {
    init_with_config(Config::from_environment()?)
}

pub fn init_with_config(config: Config) -> anyhow::Result<Guard> {
    // stdout is reserved for command output.
    let log_formatter = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let tracing_registry = tracing_subscriber::registry()
        .with(log_formatter)
        .with(config.filter);

    let sentry_guard = if let Some(sentry_config) = config.sentry {
        tracing::subscriber::set_global_default(
            tracing_registry.with(sentry_tracing::layer()),
        )?;

        Some(sentry::init((
            sentry_config.dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                attach_stacktrace: true,
                traces_sample_rate: sentry_config.traces_sample_rate,
                ..Default::default()
            }
            .add_integration(sentry_panic::PanicIntegration::default()),
        )))
    } else {
        tracing::subscriber::set_global_default(tracing_registry)?;
        None
    };

    Ok(Guard { sentry_guard })
}
