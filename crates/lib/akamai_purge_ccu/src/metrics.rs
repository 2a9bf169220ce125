use akamai_purge_opentelemetry::AnyMeterProvider;
use opentelemetry::metrics::{Counter, MeterProvider as _};

#[derive(Debug)]
pub struct CcuMetrics {
    pub(crate) batch_purges: Counter<u64>,
    pub(crate) batch_purge_errors: Counter<u64>,
    pub(crate) purged_urls: Counter<u64>,
}

impl CcuMetrics {
    pub fn new(meter_provider: &AnyMeterProvider) -> Self {
        let meter = meter_provider.meter("ccu");
        const PREFIX: &str = "akamai.ccu";
        Self {
            batch_purges: meter
                .u64_counter(format!("{PREFIX}.batch_purges"))
                .with_unit("1")
                .build(),
            batch_purge_errors: meter
                .u64_counter(format!("{PREFIX}.batch_purge_errors"))
                .with_unit("1")
                .build(),
            purged_urls: meter
                .u64_counter(format!("{PREFIX}.purged_urls"))
                .with_unit("1")
                .build(),
        }
    }
}
