use akamai_purge_config::{AppConfig, env};
use std::time::Duration;

/// Retry behaviour of the background purge queue.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_secs(120),
        }
    }
}

impl AppConfig for Config {
    fn from_environment() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_retries: env("AKAMAI_PURGE_TASK_MAX_RETRIES", defaults.max_retries)?,
            retry_delay: Duration::from_secs(env::<u64>(
                "AKAMAI_PURGE_TASK_RETRY_DELAY",
                defaults.retry_delay.as_secs(),
            )?),
        })
    }

    #[cfg(any(test, feature = "testing"))]
    fn test_config() -> anyhow::Result<Self> {
        Ok(Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(10),
        })
    }
}
