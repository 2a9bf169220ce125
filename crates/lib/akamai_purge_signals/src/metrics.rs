use akamai_purge_opentelemetry::AnyMeterProvider;
use opentelemetry::metrics::{Counter, MeterProvider as _};

#[derive(Debug)]
pub(crate) struct PurgeQueueMetrics {
    pub(crate) queued_tasks: Counter<u64>,
    pub(crate) completed_tasks: Counter<u64>,
    /// tasks that still failed after all retries.
    pub(crate) failed_tasks: Counter<u64>,
    pub(crate) retried_attempts: Counter<u64>,
}

impl PurgeQueueMetrics {
    pub(crate) fn new(meter_provider: &AnyMeterProvider) -> Self {
        let meter = meter_provider.meter("purge_queue");
        const PREFIX: &str = "akamai.purge_queue";
        Self {
            queued_tasks: meter
                .u64_counter(format!("{PREFIX}.queued_tasks"))
                .with_unit("1")
                .build(),
            completed_tasks: meter
                .u64_counter(format!("{PREFIX}.completed_tasks"))
                .with_unit("1")
                .build(),
            failed_tasks: meter
                .u64_counter(format!("{PREFIX}.failed_tasks"))
                .with_unit("1")
                .build(),
            retried_attempts: meter
                .u64_counter(format!("{PREFIX}.retried_attempts"))
                .with_unit("1")
                .build(),
        }
    }
}
