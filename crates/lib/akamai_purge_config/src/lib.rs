use anyhow::{Context as _, Result, anyhow};
use std::{env::VarError, error::Error, str::FromStr};
use tracing::trace;

/// The config trait implemented by every library or binary config in this workspace.
pub trait AppConfig: Sized {
    fn from_environment() -> Result<Self>;

    #[cfg(feature = "testing")]
    fn test_config() -> Result<Self> {
        Self::from_environment()
    }
}

/// read & parse `var`, falling back to `default` when it is not set.
pub fn env<T>(var: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    Ok(maybe_env(var)?.unwrap_or(default))
}

pub fn require_env<T>(var: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    maybe_env(var)?.with_context(|| anyhow!("configuration variable {} is missing", var))
}

pub fn maybe_env<T>(var: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    parse_var(var, std::env::var(var))
}

fn parse_var<T>(var: &str, value: Result<String, VarError>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    match value {
        // `AKAMAI_CCU_HOST=` in a shell or compose file means "unset" for us.
        Ok(content) if content.trim().is_empty() => {
            trace!("configuration variable {} is set but empty", var);
            Ok(None)
        }
        Ok(content) => content
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("failed to parse configuration variable {var}")),
        Err(VarError::NotPresent) => {
            trace!("optional configuration variable {} is not set", var);
            Ok(None)
        }
        Err(VarError::NotUnicode(_)) => Err(anyhow!("configuration variable {} is not UTF-8", var)),
    }
}
