use crate::{
    CcuMetrics, Config, Credential, IncompletePurge, PurgeError, PurgeOutcome, PurgeRequest,
    ccu::CcuBehaviour,
};
use akamai_purge_opentelemetry::AnyMeterProvider;
use std::sync::Arc;
use tracing::instrument;

/// Builds a fresh [`PurgeRequest`] for every purge.
///
/// Credentials are resolved once, when the client is created.
#[derive(Debug)]
pub struct RealCcu {
    config: Config,
    credential: Credential,
    metrics: Arc<CcuMetrics>,
}

impl RealCcu {
    pub(crate) fn from_config(
        config: &Config,
        meter_provider: &AnyMeterProvider,
    ) -> Result<Self, PurgeError> {
        Ok(Self {
            credential: Credential::resolve(config)?,
            config: config.clone(),
            metrics: Arc::new(CcuMetrics::new(meter_provider)),
        })
    }

    pub fn request(&self) -> Result<PurgeRequest, PurgeError> {
        PurgeRequest::with_credential(&self.config, self.credential.clone(), self.metrics.clone())
    }
}

impl CcuBehaviour for RealCcu {
    #[instrument(skip_all, fields(host = %self.credential.host, urls = urls.len()))]
    async fn purge_urls(&self, urls: Vec<String>) -> Result<Vec<PurgeOutcome>, IncompletePurge> {
        let mut request = match self.request() {
            Ok(request) => request,
            Err(source) => {
                return Err(IncompletePurge {
                    pending: urls,
                    source,
                });
            }
        };
        request.extend(urls);

        let result = request.purge_all().await;
        result.map_err(|source| IncompletePurge {
            pending: request.pending().to_vec(),
            source,
        })
    }
}
