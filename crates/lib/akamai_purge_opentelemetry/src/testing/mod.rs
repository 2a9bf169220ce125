use crate::AnyMeterProvider;
use anyhow::{Result, anyhow};
use opentelemetry_sdk::metrics::{
    InMemoryMetricExporter, PeriodicReader, SdkMeterProvider,
    data::{AggregatedMetrics, MetricData, ResourceMetrics},
};
use std::sync::Arc;

/// Collects every metric recorded through [`TestMetrics::provider`] in memory.
pub struct TestMetrics {
    exporter: InMemoryMetricExporter,
    provider: AnyMeterProvider,
}

impl TestMetrics {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();

        Self {
            provider: Arc::new(
                SdkMeterProvider::builder()
                    .with_reader(PeriodicReader::builder(exporter.clone()).build())
                    .build(),
            ),
            exporter,
        }
    }

    pub fn provider(&self) -> &AnyMeterProvider {
        &self.provider
    }

    fn collect(&self) -> Result<Vec<ResourceMetrics>> {
        self.provider.force_flush()?;
        Ok(self.exporter.get_finished_metrics()?)
    }

    /// current value of an `u64` counter, summed over all attribute sets.
    pub fn u64_counter(&self, scope: &str, name: &str) -> Result<u64> {
        let collected = self.collect()?;

        let metric = collected
            .iter()
            .flat_map(|rm| rm.scope_metrics())
            .filter(|sm| sm.scope().name() == scope)
            .flat_map(|sm| sm.metrics())
            .filter(|m| m.name() == name)
            .last()
            .ok_or_else(|| anyhow!("metric '{name}' not found in scope '{scope}'"))?;

        let AggregatedMetrics::U64(MetricData::Sum(sum)) = metric.data() else {
            return Err(anyhow!("metric '{name}' is not an u64 counter"));
        };

        Ok(sum.data_points().map(|dp| dp.value()).sum())
    }
}

impl Default for TestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
