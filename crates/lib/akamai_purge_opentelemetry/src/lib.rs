mod config;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub use config::Config;

use anyhow::Result;
use opentelemetry_otlp::{Protocol, WithExportConfig as _};
use opentelemetry_sdk::metrics::{SdkMeterProvider, Temporality};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// shared handle to the meter provider every metric struct is built from.
pub type AnyMeterProvider = Arc<SdkMeterProvider>;

/// Build the meter provider.
///
/// Without a configured endpoint the provider has no reader attached,
/// so recorded values are dropped.
pub fn get_meter_provider(config: &Config) -> Result<AnyMeterProvider> {
    let Some(ref endpoint) = config.endpoint else {
        return Ok(Arc::new(SdkMeterProvider::builder().build()));
    };

    let endpoint = endpoint.to_string();
    info!(endpoint, "setting up OpenTelemetry metrics exporter");

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_protocol(Protocol::Grpc)
        .with_timeout(Duration::from_secs(3))
        .with_temporality(Temporality::Delta)
        .build()?;

    Ok(Arc::new(
        SdkMeterProvider::builder()
            .with_periodic_exporter(exporter)
            .build(),
    ))
}
