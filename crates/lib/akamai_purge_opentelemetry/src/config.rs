use akamai_purge_config::{AppConfig, maybe_env};
use anyhow::Result;
use url::Url;

#[derive(Debug, Default)]
pub struct Config {
    // OTLP/gRPC collector; metrics stay in-process when unset.
    pub endpoint: Option<Url>,
}

impl AppConfig for Config {
    fn from_environment() -> Result<Self> {
        Ok(Self {
            endpoint: maybe_env("OTEL_EXPORTER_OTLP_ENDPOINT")?,
        })
    }
}
