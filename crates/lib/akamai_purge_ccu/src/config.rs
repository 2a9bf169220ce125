use akamai_purge_config::{AppConfig, env, maybe_env};
use serde::Serialize;
use std::path::PathBuf;
use strum::{Display, EnumString};
use url::Url;

/// The CCU API accepts at most 200 objects per purge request.
pub const DEFAULT_MAX_URLS_PER_REQUEST: usize = 200;

/// Request bodies are limited to 50,000 bytes by the CCU API.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PurgeAction {
    /// mark cached content as stale, the edge revalidates with the origin.
    #[default]
    Invalidate,
    /// remove cached content, the edge has to fetch it again.
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PurgeObjectType {
    #[default]
    Url,
    Cpcode,
    Tag,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Production,
    Staging,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOptions {
    pub action: PurgeAction,
    pub object_type: PurgeObjectType,
    pub network: Network,
}

impl PurgeOptions {
    /// path of the CCU v3 endpoint for these options.
    pub fn endpoint_path(&self) -> String {
        format!(
            "/ccu/v3/{}/{}/{}",
            self.action, self.object_type, self.network
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// edgerc file used when no explicit credentials are configured
    pub edgerc_path: PathBuf,
    pub edgerc_section: String,

    /// explicit credentials, only used when all four are set
    pub client_secret: Option<String>,
    pub host: Option<String>,
    pub access_token: Option<String>,
    pub client_token: Option<String>,

    pub options: PurgeOptions,

    pub max_urls_per_request: usize,
    pub max_body_bytes: usize,
    /// how many chunks a single `purge()` call sends, `None` for all of them.
    pub max_requests_per_purge: Option<usize>,

    /// Scheme & host the requests are sent to instead of `https://{host}`,
    /// typically only overwritten for testing.
    pub api_base: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edgerc_path: default_edgerc_path(),
            edgerc_section: "default".into(),
            client_secret: None,
            host: None,
            access_token: None,
            client_token: None,
            options: PurgeOptions::default(),
            max_urls_per_request: DEFAULT_MAX_URLS_PER_REQUEST,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_requests_per_purge: None,
            api_base: None,
        }
    }
}

impl Config {
    /// names of the explicit credential values that are not set.
    pub(crate) fn missing_explicit_credentials(&self) -> Vec<&'static str> {
        [
            ("client_secret", &self.client_secret),
            ("host", &self.host),
            ("access_token", &self.access_token),
            ("client_token", &self.client_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

impl AppConfig for Config {
    fn from_environment() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            edgerc_path: env("AKAMAI_EDGERC", defaults.edgerc_path)?,
            edgerc_section: env("AKAMAI_EDGERC_SECTION", defaults.edgerc_section)?,
            client_secret: maybe_env("AKAMAI_CCU_CLIENT_SECRET")?,
            host: maybe_env("AKAMAI_CCU_HOST")?,
            access_token: maybe_env("AKAMAI_CCU_ACCESS_TOKEN")?,
            client_token: maybe_env("AKAMAI_CCU_CLIENT_TOKEN")?,
            options: PurgeOptions {
                action: env("AKAMAI_CCU_ACTION", PurgeAction::default())?,
                object_type: env("AKAMAI_CCU_OBJECT_TYPE", PurgeObjectType::default())?,
                network: env("AKAMAI_CCU_NETWORK", Network::default())?,
            },
            max_urls_per_request: env(
                "AKAMAI_CCU_MAX_URLS_PER_REQUEST",
                defaults.max_urls_per_request,
            )?,
            max_body_bytes: env("AKAMAI_CCU_MAX_BODY_BYTES", defaults.max_body_bytes)?,
            max_requests_per_purge: maybe_env("AKAMAI_CCU_MAX_REQUESTS_PER_PURGE")?,
            api_base: None,
        })
    }

    #[cfg(any(test, feature = "testing"))]
    fn test_config() -> anyhow::Result<Self> {
        Ok(Self {
            edgerc_path: PathBuf::from("/nonexistent/.edgerc"),
            client_secret: Some("test-secret".into()),
            host: Some("akab-test.purge.akamaiapis.net".into()),
            access_token: Some("akab-access-token".into()),
            client_token: Some("akab-client-token".into()),
            ..Self::default()
        })
    }
}

fn default_edgerc_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".edgerc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PurgeOptions::default(), "/ccu/v3/invalidate/url/production")]
    #[test_case(
        PurgeOptions {
            action: PurgeAction::Delete,
            object_type: PurgeObjectType::Cpcode,
            network: Network::Staging,
        },
        "/ccu/v3/delete/cpcode/staging"
    )]
    fn test_endpoint_path(options: PurgeOptions, expected: &str) {
        assert_eq!(options.endpoint_path(), expected);
    }

    #[test_case("invalidate", PurgeAction::Invalidate)]
    #[test_case("DELETE", PurgeAction::Delete)]
    fn test_parse_action(input: &str, expected: PurgeAction) {
        assert_eq!(input.parse::<PurgeAction>().unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid_network() {
        assert!("edge".parse::<Network>().is_err());
    }

    #[test]
    fn test_missing_explicit_credentials() {
        let config = Config {
            host: Some("akab-test.purge.akamaiapis.net".into()),
            ..Config::default()
        };
        assert_eq!(
            config.missing_explicit_credentials(),
            vec!["client_secret", "access_token", "client_token"]
        );
        assert!(
            Config::test_config()
                .unwrap()
                .missing_explicit_credentials()
                .is_empty()
        );
    }
}
