use crate::{
    ChunkLimits, IncompletePurge, PurgeError, PurgeOutcome, PurgeResponse, ccu::CcuBehaviour,
    config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_URLS_PER_REQUEST},
    split_into_chunks,
};
use http::StatusCode;
use serde_json::Map;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockCcu {
    pub purged: Mutex<Vec<String>>,
    pub calls: Mutex<usize>,
    pub failures_remaining: Mutex<usize>,
}

impl CcuBehaviour for MockCcu {
    async fn purge_urls(&self, urls: Vec<String>) -> Result<Vec<PurgeOutcome>, IncompletePurge> {
        *self.calls.lock().await += 1;

        {
            let mut failures = self.failures_remaining.lock().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(IncompletePurge {
                    pending: urls,
                    source: PurgeError::Rejected {
                        status: StatusCode::SERVICE_UNAVAILABLE,
                        body: "mock failure".into(),
                    },
                });
            }
        }

        let limits = ChunkLimits {
            max_urls: DEFAULT_MAX_URLS_PER_REQUEST,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        };

        let mut purged = self.purged.lock().await;
        let outcomes = split_into_chunks(&urls, limits)
            .map(|chunk| {
                purged.extend(chunk.urls().iter().cloned());
                PurgeOutcome {
                    chunk,
                    response: PurgeResponse {
                        http_status: Some(201),
                        detail: Some("Request accepted".into()),
                        support_id: None,
                        purge_id: Some(format!("mock-{}", purged.len())),
                        estimated_seconds: Some(5),
                        extra: Map::new(),
                    },
                }
            })
            .collect();

        Ok(outcomes)
    }
}
