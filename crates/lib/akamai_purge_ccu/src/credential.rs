use crate::{
    Config, PurgeError,
    edgerc::{self, EdgercError, EdgercSection},
};
use std::fmt;
use tracing::debug;

/// Request bodies are only hashed up to this size when signing.
pub const DEFAULT_MAX_BODY: usize = 131_072;

/// EdgeGrid API client credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
    /// API host without scheme, e.g. `akab-xxxx.purge.akamaiapis.net`
    pub host: String,
    pub max_body: usize,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_token", &self.client_token)
            .field("client_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("host", &self.host)
            .field("max_body", &self.max_body)
            .finish()
    }
}

impl Credential {
    pub fn new(
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
        host: impl AsRef<str>,
    ) -> Self {
        Self {
            client_token: client_token.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            host: normalize_host(host.as_ref()),
            max_body: DEFAULT_MAX_BODY,
        }
    }

    /// Resolve the credentials for `config`.
    ///
    /// Explicitly configured values win when all four are set, otherwise the
    /// configured edgerc section is used. Nothing here touches the network.
    pub fn resolve(config: &Config) -> Result<Self, PurgeError> {
        if let (Some(client_token), Some(client_secret), Some(access_token), Some(host)) = (
            &config.client_token,
            &config.client_secret,
            &config.access_token,
            &config.host,
        ) {
            debug!("using explicitly configured CCU credentials");
            return Ok(Self::new(client_token, client_secret, access_token, host));
        }

        edgerc::read_section(&config.edgerc_path, &config.edgerc_section)
            .and_then(|section| Self::from_section(&section))
            .inspect(|_| {
                debug!(
                    path = %config.edgerc_path.display(),
                    section = config.edgerc_section,
                    "using CCU credentials from edgerc"
                )
            })
            .map_err(|source| PurgeError::MissingCredentials {
                missing: config.missing_explicit_credentials().join(", "),
                source,
            })
    }

    fn from_section(section: &EdgercSection) -> Result<Self, EdgercError> {
        let mut credential = Self::new(
            section.require("client_token")?,
            section.require("client_secret")?,
            section.require("access_token")?,
            section.require("host")?,
        );

        if let Some(max_body) = section.get("max_body") {
            credential.max_body = max_body.parse().map_err(|_| EdgercError::InvalidValue {
                section: section.name.clone(),
                key: "max_body",
                value: max_body.to_string(),
            })?;
        }

        Ok(credential)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use akamai_purge_config::AppConfig as _;
    use std::{io::Write as _, path::PathBuf};
    use test_case::test_case;

    fn edgerc_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test_case("akab-x.purge.akamaiapis.net", "akab-x.purge.akamaiapis.net")]
    #[test_case("https://akab-x.purge.akamaiapis.net/", "akab-x.purge.akamaiapis.net")]
    #[test_case(" akab-x.purge.akamaiapis.net/ ", "akab-x.purge.akamaiapis.net")]
    fn test_normalize_host(input: &str, expected: &str) {
        assert_eq!(normalize_host(input), expected);
    }

    #[test]
    fn test_explicit_credentials_win() -> anyhow::Result<()> {
        let file = edgerc_file(
            "[default]\nclient_secret=file\nhost=file-host\naccess_token=file\nclient_token=file\n",
        );
        let config = Config {
            edgerc_path: file.path().to_path_buf(),
            ..Config::test_config()?
        };

        let credential = Credential::resolve(&config)?;
        assert_eq!(credential.client_secret, "test-secret");
        assert_eq!(credential.host, "akab-test.purge.akamaiapis.net");
        assert_eq!(credential.max_body, DEFAULT_MAX_BODY);
        Ok(())
    }

    #[test]
    fn test_falls_back_to_edgerc_section() -> anyhow::Result<()> {
        let file = edgerc_file(
            "[default]\nclient_secret=nope\n\n[ccu]\nclient_secret=s\nhost=h.purge.akamaiapis.net\naccess_token=a\nclient_token=c\nmax-body=2048\n",
        );
        let config = Config {
            edgerc_path: file.path().to_path_buf(),
            edgerc_section: "ccu".into(),
            // partial explicit values are ignored
            client_secret: Some("explicit".into()),
            ..Config::default()
        };

        let credential = Credential::resolve(&config)?;
        assert_eq!(credential, Credential {
            client_token: "c".into(),
            client_secret: "s".into(),
            access_token: "a".into(),
            host: "h.purge.akamaiapis.net".into(),
            max_body: 2048,
        });
        Ok(())
    }

    #[test]
    fn test_missing_everything() {
        let config = Config {
            edgerc_path: PathBuf::from("/nonexistent/.edgerc"),
            ..Config::default()
        };

        let err = Credential::resolve(&config).unwrap_err();
        assert!(err.is_configuration_error());
        let PurgeError::MissingCredentials { missing, source } = err else {
            panic!("unexpected error");
        };
        assert_eq!(missing, "client_secret, host, access_token, client_token");
        assert!(matches!(source, EdgercError::NotFound(_)));
    }

    #[test]
    fn test_incomplete_section() {
        let file = edgerc_file("[default]\nclient_secret=s\nhost=h\n");
        let config = Config {
            edgerc_path: file.path().to_path_buf(),
            ..Config::default()
        };

        assert!(matches!(
            Credential::resolve(&config),
            Err(PurgeError::MissingCredentials {
                source: EdgercError::MissingKey { key: "client_token", .. },
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_max_body() {
        let file = edgerc_file(
            "[default]\nclient_secret=s\nhost=h\naccess_token=a\nclient_token=c\nmax_body=lots\n",
        );
        let config = Config {
            edgerc_path: file.path().to_path_buf(),
            ..Config::default()
        };

        assert!(matches!(
            Credential::resolve(&config),
            Err(PurgeError::MissingCredentials {
                source: EdgercError::InvalidValue { key: "max_body", .. },
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("c", "very-secret", "a", "h");
        assert!(!format!("{credential:?}").contains("very-secret"));
    }
}
