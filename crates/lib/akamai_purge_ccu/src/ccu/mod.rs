#[cfg(feature = "testing")]
pub mod mock;
pub mod real;

use crate::{Config, IncompletePurge, PurgeError, PurgeOutcome};
use akamai_purge_opentelemetry::AnyMeterProvider;

pub trait CcuBehaviour {
    /// Purge all `urls`, in order, returning one outcome per request sent.
    ///
    /// On failure the error holds the URLs that still need purging.
    fn purge_urls(
        &self,
        urls: Vec<String>,
    ) -> impl Future<Output = Result<Vec<PurgeOutcome>, IncompletePurge>> + Send;
}

#[derive(Debug)]
pub enum Ccu {
    Real(real::RealCcu),
    #[cfg(feature = "testing")]
    Mock(mock::MockCcu),
}

/// normal functionality
impl Ccu {
    pub fn from_config(config: &Config, meter_provider: &AnyMeterProvider) -> Result<Self, PurgeError> {
        Ok(Self::Real(real::RealCcu::from_config(
            config,
            meter_provider,
        )?))
    }
}

/// testing functionality
#[cfg(feature = "testing")]
impl Ccu {
    pub fn mock() -> Self {
        Self::Mock(mock::MockCcu::default())
    }

    /// fail the next `n` purges with a rejected request.
    pub async fn fail_next(&self, n: usize) -> anyhow::Result<()> {
        let Self::Mock(ccu) = self else {
            anyhow::bail!("found real CCU client, can't inject failures");
        };
        *ccu.failures_remaining.lock().await = n;
        Ok(())
    }

    pub async fn purged_urls(&self) -> anyhow::Result<Vec<String>> {
        let Self::Mock(ccu) = self else {
            anyhow::bail!("found real CCU client, no collected purges");
        };

        Ok(ccu.purged.lock().await.clone())
    }

    pub async fn purge_calls(&self) -> anyhow::Result<usize> {
        let Self::Mock(ccu) = self else {
            anyhow::bail!("found real CCU client, no collected purges");
        };

        Ok(*ccu.calls.lock().await)
    }
}

impl CcuBehaviour for Ccu {
    async fn purge_urls(&self, urls: Vec<String>) -> Result<Vec<PurgeOutcome>, IncompletePurge> {
        match self {
            Self::Real(real) => real.purge_urls(urls).await,
            #[cfg(feature = "testing")]
            Self::Mock(mock) => mock.purge_urls(urls).await,
        }
    }
}
