use crate::{
    CcuMetrics, Config, Credential, PurgeError, PurgeObjectType,
    batch::{ChunkLimits, PurgeChunk, split_into_chunks},
    response::{PurgeOutcome, PurgeResponse},
    signing,
};
use akamai_purge_opentelemetry::AnyMeterProvider;
use chrono::Utc;
use http::{
    HeaderMap, HeaderValue, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
use opentelemetry::KeyValue;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use url::Url;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A batch of URLs to purge from the Akamai edge.
///
/// ```text,ignore
/// let mut request = PurgeRequest::new(&config, &meter_provider)?;
/// request.add("https://www.example.com/url-1.html");
/// request.add("https://www.example.com/url-2.html");
/// let outcomes = request.purge().await?;
/// assert!(request.pending().is_empty());
/// ```
///
/// URLs are only removed from the pending list once the chunk containing them
/// was accepted by the API. After a failed `purge()` the failed chunk and
/// everything after it is still pending and will be sent by the next call.
#[derive(Debug)]
pub struct PurgeRequest {
    client: reqwest::Client,
    credential: Credential,
    endpoint: Url,
    limits: ChunkLimits,
    object_type: PurgeObjectType,
    max_requests_per_purge: Option<usize>,
    pending: Vec<String>,
    metrics: Arc<CcuMetrics>,
    metric_attributes: Vec<KeyValue>,
}

impl PurgeRequest {
    /// Resolve the credentials and set up the HTTP client.
    ///
    /// Fails with a configuration error if no credentials can be found,
    /// without sending anything.
    pub fn new(config: &Config, meter_provider: &AnyMeterProvider) -> Result<Self, PurgeError> {
        let credential = Credential::resolve(config)?;
        Self::with_credential(
            config,
            credential,
            Arc::new(CcuMetrics::new(meter_provider)),
        )
    }

    pub(crate) fn with_credential(
        config: &Config,
        credential: Credential,
        metrics: Arc<CcuMetrics>,
    ) -> Result<Self, PurgeError> {
        if config.max_urls_per_request == 0 {
            return Err(PurgeError::InvalidConfig(
                "max_urls_per_request must be at least 1".into(),
            ));
        }
        if config.max_requests_per_purge == Some(0) {
            return Err(PurgeError::InvalidConfig(
                "max_requests_per_purge must be at least 1".into(),
            ));
        }

        let api_base = match config.api_base {
            Some(ref api_base) => api_base.clone(),
            None => Url::parse(&format!("https://{}/", credential.host)).map_err(|err| {
                PurgeError::InvalidConfig(format!("invalid API host {}: {err}", credential.host))
            })?,
        };
        let endpoint = api_base
            .join(&config.options.endpoint_path())
            .map_err(|err| PurgeError::InvalidConfig(format!("invalid API base URL: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()?,
            credential,
            endpoint,
            limits: ChunkLimits {
                max_urls: config.max_urls_per_request,
                max_body_bytes: config.max_body_bytes,
            },
            object_type: config.options.object_type,
            max_requests_per_purge: config.max_requests_per_purge,
            pending: Vec::new(),
            metrics,
            metric_attributes: vec![
                KeyValue::new("action", config.options.action.to_string()),
                KeyValue::new("network", config.options.network.to_string()),
            ],
        })
    }

    pub fn add(&mut self, url: impl Into<String>) {
        self.pending.push(url.into());
    }

    pub fn extend<I>(&mut self, urls: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.pending.extend(urls.into_iter().map(Into::into));
    }

    /// URLs that were not purged yet, in the order they were added.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the pending URLs, one request per chunk.
    ///
    /// With `max_requests_per_purge` set, only that many chunks are sent,
    /// the rest stays pending. Errors are returned for the first chunk the
    /// API didn't accept, no later chunk is sent then.
    #[instrument(skip(self), fields(endpoint = %self.endpoint, pending = self.pending.len()))]
    pub async fn purge(&mut self) -> Result<Vec<PurgeOutcome>, PurgeError> {
        let chunks: Vec<PurgeChunk> = split_into_chunks(&self.pending, self.limits)
            .take(self.max_requests_per_purge.unwrap_or(usize::MAX))
            .collect();

        let mut outcomes = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            match self.send_chunk(&chunk).await {
                Ok(response) => {
                    self.metrics.batch_purges.add(1, &self.metric_attributes);
                    self.metrics
                        .purged_urls
                        .add(chunk.len() as u64, &self.metric_attributes);

                    debug!(
                        urls = chunk.len(),
                        purge_id = response.purge_id.as_deref(),
                        estimated_seconds = response.estimated_seconds,
                        "CCU accepted purge request"
                    );

                    self.pending = self.pending.split_off(chunk.len());
                    outcomes.push(PurgeOutcome { chunk, response });
                }
                Err(err) => {
                    self.metrics
                        .batch_purge_errors
                        .add(1, &self.metric_attributes);
                    error!(
                        ?err,
                        urls = chunk.len(),
                        still_pending = self.pending.len(),
                        "failed to purge URLs through the CCU API"
                    );
                    return Err(err);
                }
            }
        }

        Ok(outcomes)
    }

    /// Call [`Self::purge`] until nothing is pending anymore.
    pub async fn purge_all(&mut self) -> Result<Vec<PurgeOutcome>, PurgeError> {
        let mut outcomes = Vec::new();
        while !self.pending.is_empty() {
            outcomes.extend(self.purge().await?);
        }
        Ok(outcomes)
    }

    async fn send_chunk(&self, chunk: &PurgeChunk) -> Result<PurgeResponse, PurgeError> {
        let body = chunk.to_body(self.object_type)?;

        let authorization = signing::authorization_header(
            &self.credential,
            &Method::POST,
            &self.endpoint,
            &body,
            &signing::timestamp(Utc::now()),
            &signing::nonce(),
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PurgeError::Rejected { status, body });
        }

        // the chunk is accepted at this point, a body we can't read doesn't change that.
        let content = response.bytes().await?;
        let mut purge_response: PurgeResponse = serde_json::from_slice(&content)
            .unwrap_or_else(|err| {
                warn!(?err, %status, "could not decode CCU API response");
                PurgeResponse::default()
            });
        purge_response.http_status.get_or_insert(status.as_u16());

        Ok(purge_response)
    }
}
