use crate::edgerc::EdgercError;
use http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("no Akamai credentials configured (explicit values missing: {missing})")]
    MissingCredentials {
        missing: String,
        #[source]
        source: EdgercError,
    },

    #[error("invalid purge configuration: {0}")]
    InvalidConfig(String),

    #[error("CCU API rejected the purge request with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("failed to send purge request to the CCU API")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode purge request body")]
    Encode(#[source] serde_json::Error),

    #[error("invalid purge object {0:?}, CP codes have to be numeric")]
    InvalidObject(String),
}

impl PurgeError {
    /// `true` when the failure happened before any request was sent.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. } | Self::InvalidConfig(_) | Self::InvalidObject(_)
        )
    }
}

/// A purge that stopped part way.
///
/// `pending` holds the URLs that were not accepted by the API, starting with
/// the chunk that failed. Sending them again won't repeat accepted chunks.
#[derive(Debug, thiserror::Error)]
#[error("purge stopped with {} URLs pending", .pending.len())]
pub struct IncompletePurge {
    pub pending: Vec<String>,
    #[source]
    pub source: PurgeError,
}

impl IncompletePurge {
    pub fn is_configuration_error(&self) -> bool {
        self.source.is_configuration_error()
    }
}
